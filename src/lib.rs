pub mod config;
pub mod constants;
pub mod error;
pub mod grid;
pub mod handlers;
pub mod host;
pub mod input;
pub mod memory_host;
pub mod navigation;
pub mod paths;
pub mod script;
pub mod timeline;

pub use config::Settings;
pub use error::{Result, TlError};
pub use host::{HostInterop, ObjectStore};
pub use input::{Dispatch, InteractionDispatcher};
pub use memory_host::MemoryHost;
