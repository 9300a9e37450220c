//! Lifecycle of the single active drag.
//!
//! `idle -> entering -> moving -> idle`. A drag stays `entering` until the
//! pointer leaves the handler's tolerance box, so releasing it early is a click.
//! Every exit goes through `on_mouse_up_all` or `cancel`, and the handler's
//! cancel hook undoes whatever the drag changed.

use crate::config::Settings;
use crate::handlers::{Down, DragHandler, Handler, HandlerKind, NoAction};
use crate::host::{self, HostInterop, Key, KeyEvent, KeyOverride, ObjectId, Point, SyntheticMessage, WindowId};
use crate::input::auto_scroll::ScrollTimer;
use crate::input::Dispatch;
use crate::input::buttons::{Buttons, Modifiers};
use crate::timeline::Mapper;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DragStatus {
    #[default]
    Idle,
    /// Button is down but the pointer has not left the tolerance box.
    Entering,
    Moving,
}

/// How the previous interaction ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LastOutcome {
    #[default]
    Clicked,
    Dragged,
    Canceled,
}

/// Pointer positions tracked during a drag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DragPoints {
    pub start: Point,
    pub prev: Point,
    pub curr: Point,
    /// Button, or the left+right chord, that started the drag.
    pub button: Buttons,
}

impl DragPoints {
    pub fn at(point: Point, button: Buttons) -> Self {
        Self {
            start: point,
            prev: point,
            curr: point,
            button,
        }
    }
}

/// State that outlives a single drag
#[derive(Debug, Clone, Default)]
pub struct Memo {
    /// Selection origin before the last object drag replaced it.
    pub selection_origin: Option<ObjectId>,
}

/// Collaborators shared by every entry point.
pub struct Env<'a> {
    pub host: &'a mut dyn HostInterop,
    pub settings: &'a Settings,
    pub timer: &'a mut ScrollTimer,
    pub memo: &'a mut Memo,
}

impl<'a> Env<'a> {
    pub fn new(
        host: &'a mut dyn HostInterop,
        settings: &'a Settings,
        timer: &'a mut ScrollTimer,
        memo: &'a mut Memo,
    ) -> Self {
        Self {
            host,
            settings,
            timer,
            memo,
        }
    }

    pub fn mapper(&self) -> Mapper {
        Mapper::new(self.settings.layout, self.host.view())
    }
}

/// What a handler hook sees.
pub struct DragCtx<'a> {
    pub host: &'a mut dyn HostInterop,
    pub settings: &'a Settings,
    pub timer: &'a mut ScrollTimer,
    pub memo: &'a mut Memo,
    pub points: DragPoints,
    /// Modifiers reported with the current message.
    pub modifiers: Modifiers,
    /// Identifies the drag; changes whenever the slot is refilled.
    pub generation: u64,
}

impl DragCtx<'_> {
    pub fn mapper(&self) -> Mapper {
        Mapper::new(self.settings.layout, self.host.view())
    }

    /// Replays `message` into the host with `overrides` held.
    pub fn forward(&mut self, message: SyntheticMessage, overrides: &[KeyOverride]) -> bool {
        host::forward(&mut *self.host, message, overrides)
    }
}

#[derive(Default)]
pub struct DragMachine {
    slot: Option<Handler>,
    status: DragStatus,
    last: LastOutcome,
    points: DragPoints,
    window: Option<WindowId>,
    changing: bool,
    generation: u64,
}

impl DragMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.slot.is_some()
    }

    pub fn is_changing(&self) -> bool {
        self.changing
    }

    pub fn status(&self) -> DragStatus {
        self.status
    }

    pub fn last_outcome(&self) -> LastOutcome {
        self.last
    }

    pub fn points(&self) -> DragPoints {
        self.points
    }

    pub fn active_kind(&self) -> Option<HandlerKind> {
        self.slot.as_ref().map(|h| h.kind())
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn ctx<'c>(&self, env: &'c mut Env<'_>, modifiers: Modifiers) -> DragCtx<'c> {
        DragCtx {
            host: &mut *env.host,
            settings: env.settings,
            timer: &mut *env.timer,
            memo: &mut *env.memo,
            points: self.points,
            modifiers,
            generation: self.generation,
        }
    }

    /// Starts `handler` for a button press.
    ///
    /// A different drag already in progress is canceled first. If it had
    /// already moved, or belongs to another window, the slot is handed to a
    /// placeholder that swallows input until the buttons are released.
    pub fn on_mouse_down(
        &mut self,
        env: &mut Env<'_>,
        handler: Handler,
        window: WindowId,
        point: Point,
        button: Buttons,
        modifiers: Modifiers,
    ) -> bool {
        if self.changing {
            return false;
        }
        {
            let mut check = self.ctx(env, modifiers);
            check.points = DragPoints::at(point, button);
            if !handler.can_continue(&check) {
                return false;
            }
        }
        self.changing = true;
        let ret = self.begin(env, handler, window, point, button, modifiers);
        self.changing = false;
        ret
    }

    fn begin(
        &mut self,
        env: &mut Env<'_>,
        mut handler: Handler,
        window: WindowId,
        point: Point,
        button: Buttons,
        modifiers: Modifiers,
    ) -> bool {
        let mut ret = false;
        if let Some(mut active) = self.slot.take() {
            if active.kind() == handler.kind() {
                self.slot = Some(active);
                return false;
            }
            let mut cx = self.ctx(env, modifiers);
            ret = active.on_cancel(&mut cx, false);
            log::debug!("{:?} interrupted by {:?}", active.kind(), handler.kind());

            if self.status != DragStatus::Entering || self.window != Some(window) {
                let mut placeholder = Handler::from(NoAction);
                if let Down::Done(r) = placeholder.on_down(&mut cx) {
                    ret |= r;
                }
                self.slot = Some(placeholder);
                self.points.button = button;
                self.status = DragStatus::Moving;
                self.generation += 1;
                return ret;
            }
        }

        self.window = Some(window);
        self.points = DragPoints::at(point, button);
        self.generation += 1;
        let mut cx = self.ctx(env, modifiers);
        loop {
            match handler.on_down(&mut cx) {
                Down::Done(r) => {
                    ret |= r;
                    break;
                }
                Down::Fallback(kind) => {
                    log::debug!("{:?} falls back to {:?}", handler.kind(), kind);
                    handler = kind.create();
                }
            }
        }
        log::debug!("drag #{} {:?} entering at {:?}", self.generation, handler.kind(), point);
        self.slot = Some(handler);
        self.status = DragStatus::Entering;
        ret
    }

    pub fn on_mouse_move(&mut self, env: &mut Env<'_>, point: Point, modifiers: Modifiers) -> bool {
        if self.changing || self.slot.is_none() {
            return false;
        }
        let Some(mut handler) = self.slot.take() else {
            return false;
        };
        if !handler.can_continue(&self.ctx(env, modifiers)) {
            self.slot = Some(handler);
            return self.cancel(env, true);
        }
        self.changing = true;

        self.points.prev = self.points.curr;
        self.points.curr = point;
        let mut ret = false;
        let mut confirmed = true;
        if self.status == DragStatus::Entering {
            let (tol_x, tol_y) = handler.tolerance(&self.ctx(env, modifiers));
            let dx = (point.x - self.points.start.x).abs();
            let dy = (point.y - self.points.start.y).abs();
            if dx <= tol_x && dy <= tol_y {
                confirmed = false;
            } else {
                self.status = DragStatus::Moving;
                log::debug!("drag #{} {:?} moving", self.generation, handler.kind());
            }
        }
        if confirmed {
            ret = handler.on_move(&mut self.ctx(env, modifiers));
        }

        self.slot = Some(handler);
        self.changing = false;
        ret
    }

    /// Cancels the active drag; a no-op when idle.
    pub fn cancel(&mut self, env: &mut Env<'_>, release: bool) -> bool {
        if self.changing {
            return false;
        }
        let Some(mut handler) = self.slot.take() else {
            return false;
        };
        self.changing = true;
        let ret = handler.on_cancel(&mut self.ctx(env, Modifiers::NONE), release);
        log::debug!("drag #{} {:?} canceled", self.generation, handler.kind());
        self.window = None;
        self.status = DragStatus::Idle;
        self.last = LastOutcome::Canceled;
        self.changing = false;
        ret
    }

    /// Ends the drag once every participating button is released.
    pub fn on_mouse_up_all(&mut self, env: &mut Env<'_>, point: Point, modifiers: Modifiers) -> bool {
        if self.changing {
            return false;
        }
        let Some(mut handler) = self.slot.take() else {
            self.status = DragStatus::Idle;
            return false;
        };
        if !handler.can_continue(&self.ctx(env, modifiers)) {
            self.slot = Some(handler);
            return self.cancel(env, true);
        }
        self.changing = true;

        self.points.prev = self.points.curr;
        self.points.curr = point;
        self.last = match self.status {
            DragStatus::Entering if self.points.button == Buttons::LEFT_AND_RIGHT => {
                LastOutcome::Canceled
            }
            DragStatus::Entering => LastOutcome::Clicked,
            DragStatus::Moving | DragStatus::Idle => LastOutcome::Dragged,
        };
        let ret = handler.on_up(&mut self.ctx(env, modifiers));
        log::debug!(
            "drag #{} {:?} finished as {:?}",
            self.generation,
            handler.kind(),
            self.last
        );

        self.window = None;
        self.status = DragStatus::Idle;
        self.changing = false;
        ret
    }

    pub fn unmark_canceled(&mut self) {
        self.last = LastOutcome::Clicked;
    }

    /// Makes the pending release of an entering drag count as a drag.
    pub fn invalidate_click(&mut self) {
        if self.slot.is_some() && self.status == DragStatus::Entering {
            self.status = DragStatus::Moving;
        }
    }

    /// Starts a placeholder drag outside the normal down path.
    pub fn begin_placeholder(
        &mut self,
        env: &mut Env<'_>,
        window: WindowId,
        point: Point,
        button: Buttons,
    ) -> bool {
        self.on_mouse_down(env, Handler::from(NoAction), window, point, button, Modifiers::NONE)
    }

    /// Routes a key message to the active drag. Escape cancels it.
    pub fn handle_key(&mut self, env: &mut Env<'_>, key: KeyEvent) -> Dispatch {
        if self.changing || self.slot.is_none() {
            return Dispatch::PASS;
        }
        if key.down && key.key == Key::Escape {
            return Dispatch::handled(self.cancel(env, true));
        }
        let Some(mut handler) = self.slot.take() else {
            return Dispatch::PASS;
        };
        let modifiers = env.host.modifiers();
        if !handler.can_continue(&self.ctx(env, modifiers)) {
            self.slot = Some(handler);
            return Dispatch::handled(self.cancel(env, true));
        }
        let consumed = handler.handle_key(&mut self.ctx(env, modifiers), key);
        self.slot = Some(handler);
        Dispatch {
            consumed,
            refresh: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory_host::MemoryHost;

    struct Rig {
        host: MemoryHost,
        settings: Settings,
        timer: ScrollTimer,
        memo: Memo,
        machine: DragMachine,
    }

    impl Rig {
        fn new() -> Self {
            Self {
                host: MemoryHost::new(1000),
                settings: Settings::default(),
                timer: ScrollTimer::new(),
                memo: Memo::default(),
                machine: DragMachine::new(),
            }
        }

        fn down(&mut self, kind: HandlerKind, x: i32, y: i32, button: Buttons) -> bool {
            let window = self.host.window();
            let mut env = Env::new(&mut self.host, &self.settings, &mut self.timer, &mut self.memo);
            self.machine
                .on_mouse_down(&mut env, kind.create(), window, Point::new(x, y), button, Modifiers::NONE)
        }

        fn moved(&mut self, x: i32, y: i32) -> bool {
            let mut env = Env::new(&mut self.host, &self.settings, &mut self.timer, &mut self.memo);
            self.machine.on_mouse_move(&mut env, Point::new(x, y), Modifiers::NONE)
        }

        fn up(&mut self, x: i32, y: i32) -> bool {
            let mut env = Env::new(&mut self.host, &self.settings, &mut self.timer, &mut self.memo);
            self.machine.on_mouse_up_all(&mut env, Point::new(x, y), Modifiers::NONE)
        }

        fn cancel(&mut self, release: bool) -> bool {
            let mut env = Env::new(&mut self.host, &self.settings, &mut self.timer, &mut self.memo);
            self.machine.cancel(&mut env, release)
        }
    }

    #[test]
    fn small_moves_stay_a_click() {
        let mut rig = Rig::new();
        rig.down(HandlerKind::StepBound, 300, 60, Buttons::LEFT);
        assert_eq!(rig.machine.status(), DragStatus::Entering);
        rig.moved(303, 62);
        rig.moved(296, 57);
        assert_eq!(rig.machine.status(), DragStatus::Entering);
        rig.up(299, 60);
        assert_eq!(rig.machine.last_outcome(), LastOutcome::Clicked);
        assert!(!rig.machine.is_active());
    }

    #[test]
    fn leaving_tolerance_box_makes_a_drag() {
        let mut rig = Rig::new();
        rig.down(HandlerKind::StepBound, 300, 60, Buttons::LEFT);
        rig.moved(305, 60);
        assert_eq!(rig.machine.status(), DragStatus::Moving);
        rig.up(305, 60);
        assert_eq!(rig.machine.last_outcome(), LastOutcome::Dragged);
    }

    #[test]
    fn chord_release_counts_as_canceled() {
        let mut rig = Rig::new();
        rig.down(HandlerKind::NoAction, 300, 60, Buttons::LEFT_AND_RIGHT);
        rig.up(300, 60);
        assert_eq!(rig.machine.last_outcome(), LastOutcome::Canceled);
    }

    #[test]
    fn second_drag_after_move_falls_back_to_placeholder() {
        let mut rig = Rig::new();
        rig.down(HandlerKind::StepBound, 300, 60, Buttons::LEFT);
        rig.moved(340, 60);
        let generation = rig.machine.generation();
        rig.down(HandlerKind::ZoomBi, 340, 60, Buttons::RIGHT);
        assert_eq!(rig.machine.active_kind(), Some(HandlerKind::NoAction));
        assert_eq!(rig.machine.status(), DragStatus::Moving);
        assert_eq!(rig.machine.points().button, Buttons::RIGHT);
        assert_ne!(rig.machine.generation(), generation);
        assert!(rig.host.has_capture());
    }

    #[test]
    fn second_drag_while_entering_overwrites() {
        let mut rig = Rig::new();
        rig.down(HandlerKind::StepBound, 300, 60, Buttons::LEFT);
        rig.down(HandlerKind::ZoomBi, 300, 60, Buttons::RIGHT);
        assert_eq!(rig.machine.active_kind(), Some(HandlerKind::ZoomBi));
        assert_eq!(rig.machine.status(), DragStatus::Entering);
    }

    #[test]
    fn same_kind_keeps_current_drag() {
        let mut rig = Rig::new();
        rig.down(HandlerKind::StepBound, 300, 60, Buttons::LEFT);
        assert!(!rig.down(HandlerKind::StepBound, 400, 60, Buttons::RIGHT));
        assert_eq!(rig.machine.points().button, Buttons::LEFT);
    }

    #[test]
    fn cancel_is_idempotent() {
        let mut rig = Rig::new();
        assert!(!rig.cancel(true));
        rig.down(HandlerKind::StepBound, 300, 60, Buttons::LEFT);
        rig.cancel(true);
        assert_eq!(rig.machine.last_outcome(), LastOutcome::Canceled);
        assert!(!rig.machine.is_active());
        assert!(!rig.cancel(true));
        assert_eq!(rig.machine.status(), DragStatus::Idle);
    }

    #[test]
    fn reentrant_calls_are_ignored() {
        let mut rig = Rig::new();
        rig.down(HandlerKind::StepBound, 300, 60, Buttons::LEFT);
        rig.machine.changing = true;
        assert!(!rig.moved(400, 60));
        assert!(!rig.cancel(true));
        assert!(!rig.down(HandlerKind::ZoomBi, 300, 60, Buttons::RIGHT));
        assert!(!rig.up(400, 60));
        rig.machine.changing = false;
        assert_eq!(rig.machine.active_kind(), Some(HandlerKind::StepBound));
        assert_eq!(rig.machine.status(), DragStatus::Entering);
    }

    #[test]
    fn invalidated_click_becomes_drag() {
        let mut rig = Rig::new();
        rig.down(HandlerKind::NoAction, 300, 60, Buttons::LEFT);
        rig.machine.invalidate_click();
        rig.up(300, 60);
        assert_eq!(rig.machine.last_outcome(), LastOutcome::Dragged);
    }
}
