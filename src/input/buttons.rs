use serde::{Deserialize, Serialize};
use std::ops::BitOr;

/// A single physical mouse button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    X1,
    X2,
}

impl MouseButton {
    pub fn all() -> &'static [MouseButton] {
        &[
            MouseButton::Left,
            MouseButton::Right,
            MouseButton::Middle,
            MouseButton::X1,
            MouseButton::X2,
        ]
    }

    pub fn mask(self) -> Buttons {
        match self {
            MouseButton::Left => Buttons::LEFT,
            MouseButton::Right => Buttons::RIGHT,
            MouseButton::Middle => Buttons::MIDDLE,
            MouseButton::X1 => Buttons::X1,
            MouseButton::X2 => Buttons::X2,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            MouseButton::Left => "L",
            MouseButton::Right => "R",
            MouseButton::Middle => "M",
            MouseButton::X1 => "X1",
            MouseButton::X2 => "X2",
        }
    }
}

bitflags::bitflags! {
    /// Set of mouse buttons, also used to name the button (or chord) that
    /// started a gesture.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct Buttons: u8 {
        const LEFT = 1 << 0;
        const RIGHT = 1 << 1;
        const MIDDLE = 1 << 2;
        const X1 = 1 << 3;
        const X2 = 1 << 4;
        const LEFT_AND_RIGHT = Self::LEFT.bits() | Self::RIGHT.bits();
    }
}

impl Buttons {
    pub fn with(self, button: MouseButton) -> Buttons {
        self.union(button.mask())
    }

    pub fn without(self, button: MouseButton) -> Buttons {
        self.difference(button.mask())
    }

    pub fn count(self) -> u32 {
        self.bits().count_ones()
    }
}

impl From<MouseButton> for Buttons {
    fn from(b: MouseButton) -> Self {
        b.mask()
    }
}

/// Serializable modifier flags; eight combinations in total
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers::new(false, false, false);
    pub const CTRL: Modifiers = Modifiers::new(true, false, false);
    pub const SHIFT: Modifiers = Modifiers::new(false, true, false);
    pub const ALT: Modifiers = Modifiers::new(false, false, true);
    pub const CTRL_SHIFT: Modifiers = Modifiers::new(true, true, false);
    pub const CTRL_ALT: Modifiers = Modifiers::new(true, false, true);
    pub const SHIFT_ALT: Modifiers = Modifiers::new(false, true, true);
    pub const CTRL_SHIFT_ALT: Modifiers = Modifiers::new(true, true, true);

    pub const fn new(ctrl: bool, shift: bool, alt: bool) -> Self {
        Self { ctrl, shift, alt }
    }

    pub fn all() -> [Modifiers; 8] {
        [
            Modifiers::NONE,
            Modifiers::CTRL,
            Modifiers::SHIFT,
            Modifiers::ALT,
            Modifiers::CTRL_SHIFT,
            Modifiers::CTRL_ALT,
            Modifiers::SHIFT_ALT,
            Modifiers::CTRL_SHIFT_ALT,
        ]
    }

    pub fn is_none(self) -> bool {
        !(self.ctrl || self.shift || self.alt)
    }

    /// `true` when any key held in `self` is also in `keys`.
    pub fn has_any(self, keys: Modifiers) -> bool {
        (self.ctrl && keys.ctrl) || (self.shift && keys.shift) || (self.alt && keys.alt)
    }

    pub fn has_all(self, keys: Modifiers) -> bool {
        (self.ctrl || !keys.ctrl) && (self.shift || !keys.shift) && (self.alt || !keys.alt)
    }

    pub fn only_shift(self) -> Modifiers {
        Modifiers::new(false, self.shift, false)
    }

    pub fn without_shift(self) -> Modifiers {
        Modifiers::new(self.ctrl, false, self.alt)
    }

    /// Canonical suffix used in binding keys, e.g. `"ctrl_shift"`.
    pub fn name(&self) -> &'static str {
        match (self.ctrl, self.shift, self.alt) {
            (false, false, false) => "neutral",
            (true, false, false) => "ctrl",
            (false, true, false) => "shift",
            (false, false, true) => "alt",
            (true, true, false) => "ctrl_shift",
            (true, false, true) => "ctrl_alt",
            (false, true, true) => "shift_alt",
            (true, true, true) => "ctrl_shift_alt",
        }
    }
}

impl BitOr for Modifiers {
    type Output = Modifiers;
    fn bitor(self, rhs: Modifiers) -> Modifiers {
        Modifiers::new(self.ctrl || rhs.ctrl, self.shift || rhs.shift, self.alt || rhs.alt)
    }
}
