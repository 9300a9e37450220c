//! Per-modifier action tables.
//!
//! Each table maps the eight modifier combinations to an action value. Tables
//! are grouped per mouse button (drag/click) or per wheel mode, and each
//! screen region owns its own group with its own action type.

use serde::{Deserialize, Serialize};

use super::buttons::{Buttons, Modifiers};

/// One action per modifier combination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binding<T> {
    pub neutral: T,
    pub ctrl: T,
    pub shift: T,
    pub alt: T,
    pub ctrl_shift: T,
    pub ctrl_alt: T,
    pub shift_alt: T,
    pub ctrl_shift_alt: T,
}

impl<T: Copy> Binding<T> {
    pub const fn uniform(action: T) -> Self {
        Self {
            neutral: action,
            ctrl: action,
            shift: action,
            alt: action,
            ctrl_shift: action,
            ctrl_alt: action,
            shift_alt: action,
            ctrl_shift_alt: action,
        }
    }

    /// Uniform binding with a different action for a single combination.
    pub fn with(mut self, modifiers: Modifiers, action: T) -> Self {
        *self.slot_mut(modifiers) = action;
        self
    }

    pub fn get(&self, modifiers: Modifiers) -> T {
        match (modifiers.ctrl, modifiers.shift, modifiers.alt) {
            (false, false, false) => self.neutral,
            (true, false, false) => self.ctrl,
            (false, true, false) => self.shift,
            (false, false, true) => self.alt,
            (true, true, false) => self.ctrl_shift,
            (true, false, true) => self.ctrl_alt,
            (false, true, true) => self.shift_alt,
            (true, true, true) => self.ctrl_shift_alt,
        }
    }

    fn slot_mut(&mut self, modifiers: Modifiers) -> &mut T {
        match (modifiers.ctrl, modifiers.shift, modifiers.alt) {
            (false, false, false) => &mut self.neutral,
            (true, false, false) => &mut self.ctrl,
            (false, true, false) => &mut self.shift,
            (false, false, true) => &mut self.alt,
            (true, true, false) => &mut self.ctrl_shift,
            (true, false, true) => &mut self.ctrl_alt,
            (false, true, true) => &mut self.shift_alt,
            (true, true, true) => &mut self.ctrl_shift_alt,
        }
    }

    /// Replaces every entry rejected by `is_valid` with `fallback`.
    /// Returns the modifier combinations that were replaced.
    pub fn normalize(&mut self, is_valid: impl Fn(T) -> bool, fallback: T) -> Vec<Modifiers> {
        let mut replaced = Vec::new();
        for modifiers in Modifiers::all() {
            let slot = self.slot_mut(modifiers);
            if !is_valid(*slot) {
                *slot = fallback;
                replaced.push(modifiers);
            }
        }
        replaced
    }
}

/// Click tables, one binding per physical button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonBindings<T> {
    pub l: Binding<T>,
    pub r: Binding<T>,
    pub m: Binding<T>,
    pub x1: Binding<T>,
    pub x2: Binding<T>,
}

impl<T: Copy> ButtonBindings<T> {
    /// Table for `button`; unknown combinations read the left button's table.
    pub fn get(&self, button: Buttons) -> &Binding<T> {
        if button == Buttons::RIGHT {
            &self.r
        } else if button == Buttons::MIDDLE {
            &self.m
        } else if button == Buttons::X1 {
            &self.x1
        } else if button == Buttons::X2 {
            &self.x2
        } else {
            &self.l
        }
    }

    pub fn resolve(&self, button: Buttons, modifiers: Modifiers) -> T {
        self.get(button).get(modifiers)
    }

    pub fn normalize(&mut self, is_valid: impl Fn(T) -> bool + Copy, fallback: T) -> usize {
        [&mut self.l, &mut self.r, &mut self.m, &mut self.x1, &mut self.x2]
            .into_iter()
            .map(|b| b.normalize(is_valid, fallback).len())
            .sum()
    }
}

/// Drag tables, which additionally bind the left+right chord
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DragBindings<T> {
    pub l: Binding<T>,
    pub r: Binding<T>,
    pub m: Binding<T>,
    pub x1: Binding<T>,
    pub x2: Binding<T>,
    pub l_and_r: Binding<T>,
}

impl<T: Copy> DragBindings<T> {
    pub fn get(&self, button: Buttons) -> &Binding<T> {
        if button == Buttons::LEFT_AND_RIGHT {
            &self.l_and_r
        } else if button == Buttons::RIGHT {
            &self.r
        } else if button == Buttons::MIDDLE {
            &self.m
        } else if button == Buttons::X1 {
            &self.x1
        } else if button == Buttons::X2 {
            &self.x2
        } else {
            &self.l
        }
    }

    pub fn resolve(&self, button: Buttons, modifiers: Modifiers) -> T {
        self.get(button).get(modifiers)
    }

    pub fn normalize(&mut self, is_valid: impl Fn(T) -> bool + Copy, fallback: T) -> usize {
        [
            &mut self.l,
            &mut self.r,
            &mut self.m,
            &mut self.x1,
            &mut self.x2,
            &mut self.l_and_r,
        ]
        .into_iter()
        .map(|b| b.normalize(is_valid, fallback).len())
        .sum()
    }
}

/// Wheel tables: plain wheel and wheel while the right button is held
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WheelBindings<T> {
    pub normal: Binding<T>,
    pub r_button: Binding<T>,
}

impl<T: Copy> WheelBindings<T> {
    pub fn resolve(&self, r_button: bool, modifiers: Modifiers) -> T {
        if r_button {
            self.r_button.get(modifiers)
        } else {
            self.normal.get(modifiers)
        }
    }
}
