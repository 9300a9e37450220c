//! Drives single handlers through a [`DragMachine`] against a [`MemoryHost`].

use crate::config::Settings;
use crate::handlers::Handler;
use crate::host::{HostInterop, ObjectId, Point, TimelineObject};
use crate::input::auto_scroll::ScrollTimer;
use crate::input::buttons::{Buttons, Modifiers};
use crate::input::drag::{DragMachine, Env, Memo};
use crate::memory_host::MemoryHost;

/// Client y inside `layer` at the default layout.
pub fn layer_y(layer: i32) -> i32 {
    42 + 32 * layer + 10
}

pub struct Rig {
    pub host: MemoryHost,
    pub settings: Settings,
    pub timer: ScrollTimer,
    pub memo: Memo,
    pub machine: DragMachine,
}

impl Rig {
    pub fn new(scene_len: i32) -> Self {
        Self {
            host: MemoryHost::new(scene_len),
            settings: Settings::default(),
            timer: ScrollTimer::new(),
            memo: Memo::default(),
            machine: DragMachine::new(),
        }
    }

    pub fn add(&mut self, begin: i32, end: i32, layer: i32) -> ObjectId {
        self.host.push_object(TimelineObject {
            begin,
            end,
            layer,
            active: true,
            leader: None,
            next: None,
        })
    }

    pub fn down(&mut self, handler: Handler, x: i32, y: i32) -> bool {
        self.down_with(handler, x, y, Modifiers::NONE)
    }

    pub fn down_with(&mut self, handler: Handler, x: i32, y: i32, modifiers: Modifiers) -> bool {
        let window = self.host.window();
        let mut env = Env::new(&mut self.host, &self.settings, &mut self.timer, &mut self.memo);
        self.machine
            .on_mouse_down(&mut env, handler, window, Point::new(x, y), Buttons::LEFT, modifiers)
    }

    pub fn moved(&mut self, x: i32, y: i32) -> bool {
        let mut env = Env::new(&mut self.host, &self.settings, &mut self.timer, &mut self.memo);
        self.machine.on_mouse_move(&mut env, Point::new(x, y), Modifiers::NONE)
    }

    pub fn up(&mut self, x: i32, y: i32) -> bool {
        let mut env = Env::new(&mut self.host, &self.settings, &mut self.timer, &mut self.memo);
        self.machine.on_mouse_up_all(&mut env, Point::new(x, y), Modifiers::NONE)
    }

    pub fn cancel(&mut self) -> bool {
        let mut env = Env::new(&mut self.host, &self.settings, &mut self.timer, &mut self.memo);
        self.machine.cancel(&mut env, true)
    }
}
