use std::fmt;

#[derive(Debug)]
pub enum TlError {
    Config(String),
    Io(String),
    Script(String),
    Host(String),
}

impl fmt::Display for TlError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TlError::Config(msg) => write!(f, "Config error: {}", msg),
            TlError::Io(msg) => write!(f, "I/O error: {}", msg),
            TlError::Script(msg) => write!(f, "Script error: {}", msg),
            TlError::Host(msg) => write!(f, "Host error: {}", msg),
        }
    }
}

impl std::error::Error for TlError {}

pub type Result<T> = std::result::Result<T, TlError>;

// Conversion helpers
impl From<std::io::Error> for TlError {
    fn from(err: std::io::Error) -> Self {
        TlError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for TlError {
    fn from(err: serde_json::Error) -> Self {
        TlError::Script(err.to_string())
    }
}

impl From<anyhow::Error> for TlError {
    fn from(err: anyhow::Error) -> Self {
        TlError::Config(err.to_string())
    }
}
