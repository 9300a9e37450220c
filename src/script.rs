//! Input scripts replayed against a [`MemoryHost`].
//!
//! A script describes one scene and a list of window messages. Messages the
//! dispatcher does not consume fall through to the host, the way the
//! timeline window procedure hands them on to the host's own.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Result, TlError};
use crate::grid::TempoInfo;
use crate::host::*;
use crate::input::buttons::{Buttons, Modifiers, MouseButton};
use crate::input::{Dispatch, InteractionDispatcher};
use crate::memory_host::MemoryHost;

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptObject {
    pub begin: i32,
    pub end: i32,
    pub layer: i32,
    #[serde(default = "default_active")]
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptLayer {
    pub layer: i32,
    #[serde(flatten)]
    pub setting: LayerSetting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScriptEvent {
    Down {
        button: MouseButton,
        x: i32,
        y: i32,
        #[serde(default)]
        mods: Modifiers,
    },
    Up {
        button: MouseButton,
        x: i32,
        y: i32,
        #[serde(default)]
        mods: Modifiers,
    },
    DoubleClick {
        button: MouseButton,
        x: i32,
        y: i32,
        #[serde(default)]
        mods: Modifiers,
    },
    Move {
        x: i32,
        y: i32,
        #[serde(default)]
        mods: Modifiers,
    },
    Wheel {
        x: i32,
        y: i32,
        delta: i32,
        #[serde(default)]
        mods: Modifiers,
    },
    Key {
        key: Key,
        down: bool,
    },
    /// Advances the clock and fires the auto-scroll timer if one is armed.
    Timer {
        #[serde(default)]
        advance_ms: u64,
    },
    CaptureLost,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Script {
    pub scene_len: i32,
    #[serde(default)]
    pub current_frame: i32,
    #[serde(default)]
    pub tempo: Option<TempoInfo>,
    #[serde(default)]
    pub objects: Vec<ScriptObject>,
    /// Mid-point chains as indices into `objects`, leader first.
    #[serde(default)]
    pub chains: Vec<Vec<usize>>,
    #[serde(default)]
    pub layers: Vec<ScriptLayer>,
    #[serde(default)]
    pub events: Vec<ScriptEvent>,
}

impl Script {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let script: Script = serde_json::from_str(&contents)?;
        if script.scene_len <= 0 {
            return Err(TlError::Script(format!(
                "scene_len must be positive, got {}",
                script.scene_len
            )));
        }
        Ok(script)
    }

    /// Builds the scene described by the script.
    pub fn build_host(&self) -> Result<MemoryHost> {
        let mut host = MemoryHost::new(self.scene_len);
        if let Some(tempo) = self.tempo {
            host.set_tempo(tempo);
        }
        let ids: Vec<ObjectId> = self
            .objects
            .iter()
            .map(|o| {
                host.push_object(TimelineObject {
                    begin: o.begin,
                    end: o.end,
                    layer: o.layer,
                    active: o.active,
                    leader: None,
                    next: None,
                })
            })
            .collect();
        for chain in &self.chains {
            let members = chain
                .iter()
                .map(|&i| {
                    ids.get(i)
                        .copied()
                        .ok_or_else(|| TlError::Script(format!("chain refers to missing object {}", i)))
                })
                .collect::<Result<Vec<_>>>()?;
            host.link_chain(&members);
        }
        for l in &self.layers {
            host.set_layer_setting(l.layer, l.setting.clone());
        }
        host.set_current_frame(self.current_frame);
        Ok(host)
    }
}

/// Feeds script events to a dispatcher, tracking held buttons.
pub struct Replay {
    pub dispatcher: InteractionDispatcher,
    pub host: MemoryHost,
    pressed: Buttons,
}

impl Replay {
    pub fn new(dispatcher: InteractionDispatcher, host: MemoryHost) -> Self {
        Self {
            dispatcher,
            host,
            pressed: Buttons::empty(),
        }
    }

    fn hold(&mut self, x: i32, y: i32, mods: Modifiers) -> Point {
        let point = Point::new(x, y);
        self.host.set_cursor_pos(point);
        self.host.set_key_state(Key::Ctrl, mods.ctrl);
        self.host.set_key_state(Key::Shift, mods.shift);
        self.host.set_key_state(Key::Alt, mods.alt);
        point
    }

    /// Delivers one event; unconsumed messages go on to the host.
    pub fn step(&mut self, event: ScriptEvent) -> Dispatch {
        let (dispatch, fallthrough) = match event {
            ScriptEvent::Down { button, x, y, mods } => {
                let point = self.hold(x, y, mods);
                self.pressed = self.pressed.with(button);
                let d = self
                    .dispatcher
                    .on_button_down(&mut self.host, button, self.pressed, point, mods);
                (d, Some(self.message(MessageKind::ButtonDown(button), point, mods)))
            }
            ScriptEvent::Up { button, x, y, mods } => {
                let point = self.hold(x, y, mods);
                self.pressed = self.pressed.without(button);
                let d = self
                    .dispatcher
                    .on_button_up(&mut self.host, button, self.pressed, point, mods);
                (d, Some(self.message(MessageKind::ButtonUp(button), point, mods)))
            }
            ScriptEvent::DoubleClick { button, x, y, mods } => {
                let point = self.hold(x, y, mods);
                self.pressed = self.pressed.with(button);
                let d = self
                    .dispatcher
                    .on_double_click(&mut self.host, button, self.pressed, point, mods);
                (d, Some(self.message(MessageKind::DoubleClick(button), point, mods)))
            }
            ScriptEvent::Move { x, y, mods } => {
                let point = self.hold(x, y, mods);
                let d = self.dispatcher.on_mouse_move(&mut self.host, point, mods);
                (d, Some(self.message(MessageKind::Move, point, mods)))
            }
            ScriptEvent::Wheel { x, y, delta, mods } => {
                let point = self.hold(x, y, mods);
                let d = self
                    .dispatcher
                    .on_wheel(&mut self.host, point, delta, self.pressed, mods);
                (d, Some(self.message(MessageKind::Wheel(delta), point, mods)))
            }
            ScriptEvent::Key { key, down } => {
                self.host.set_key_state(key, down);
                let d = self.dispatcher.on_key(
                    &mut self.host,
                    KeyEvent {
                        key,
                        down,
                        repeat: false,
                    },
                );
                let up = (!down).then(|| SyntheticMessage::key_up(key));
                (d, up)
            }
            ScriptEvent::Timer { advance_ms } => {
                self.host.advance_clock(advance_ms);
                if self.host.pending_timer().is_none() {
                    return Dispatch::PASS;
                }
                (self.dispatcher.on_timer(&mut self.host), None)
            }
            ScriptEvent::CaptureLost => {
                self.host.release_capture();
                (self.dispatcher.on_capture_changed(&mut self.host), None)
            }
        };
        if !dispatch.consumed
            && let Some(message) = fallthrough
        {
            self.host.dispatch_synthetic(message);
        }
        dispatch
    }

    fn message(&self, kind: MessageKind, point: Point, mods: Modifiers) -> SyntheticMessage {
        SyntheticMessage::new(kind, point, self.pressed, mods)
    }

    /// Runs every event of `script`, returning the dispatch results in order.
    pub fn run(&mut self, script: &Script) -> Vec<Dispatch> {
        script.events.iter().map(|&e| self.step(e)).collect()
    }
}
