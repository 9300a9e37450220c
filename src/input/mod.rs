pub mod actions;
pub mod auto_scroll;
pub mod bindings;
pub mod buttons;
pub mod drag;

use actions::{LayerClick, LayerDrag, TimelineClick, TimelineDrag, WheelAction, ZoomCenter};
use auto_scroll::ScrollTimer;
use buttons::{Buttons, Modifiers, MouseButton};
use drag::{DragMachine, Env, LastOutcome, Memo};

use crate::config::Settings;
use crate::handlers::{HandlerKind, ObjectMode, clicks, layers, wheels};
use crate::host::{HostInterop, KeyEvent, LayerCommand, Point};
use crate::timeline::{Mapper, ObjectDetection, Region};

/// What the timeline window procedure should do with a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Dispatch {
    /// The message was handled here and must not reach the host.
    pub consumed: bool,
    /// The main window needs a redraw.
    pub refresh: bool,
}

impl Dispatch {
    pub const PASS: Dispatch = Dispatch {
        consumed: false,
        refresh: false,
    };

    pub fn handled(refresh: bool) -> Self {
        Self {
            consumed: true,
            refresh,
        }
    }
}

/// Click action picked for a region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ClickTarget {
    Timeline(TimelineClick),
    Layer(LayerClick),
}

/// Routes timeline window input to drags, clicks and wheel actions.
///
/// Owns the single drag slot; every entry point receives the host for the
/// duration of one message.
pub struct InteractionDispatcher {
    settings: Settings,
    machine: DragMachine,
    timer: ScrollTimer,
    memo: Memo,
}

macro_rules! env {
    ($self:ident, $host:expr) => {
        Env::new($host, &$self.settings, &mut $self.timer, &mut $self.memo)
    };
}

impl InteractionDispatcher {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            machine: DragMachine::new(),
            timer: ScrollTimer::new(),
            memo: Memo::default(),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Swaps in reloaded settings; an active drag is canceled first.
    pub fn set_settings(&mut self, host: &mut dyn HostInterop, settings: Settings) {
        self.machine.cancel(&mut env!(self, host), true);
        self.settings = settings;
    }

    pub fn machine(&self) -> &DragMachine {
        &self.machine
    }

    fn mapper(&self, host: &dyn HostInterop) -> Mapper {
        Mapper::new(self.settings.layout, host.view())
    }

    fn region(&self, host: &dyn HostInterop, point: Point) -> Region {
        self.mapper(host)
            .classify(host, point.x, point.y, ObjectDetection::Nearby)
    }

    /// Lifts the canceled mark once at most one button is held.
    fn unmark_canceled_on_down(&mut self, pressed: Buttons) {
        if self.machine.last_outcome() == LastOutcome::Canceled && pressed.count() <= 1 {
            self.machine.unmark_canceled();
        }
    }

    /// `pressed` includes `button`.
    pub fn on_button_down(
        &mut self,
        host: &mut dyn HostInterop,
        button: MouseButton,
        pressed: Buttons,
        point: Point,
        modifiers: Modifiers,
    ) -> Dispatch {
        self.unmark_canceled_on_down(pressed);

        let gesture = match button {
            MouseButton::Left | MouseButton::Right if pressed == Buttons::LEFT_AND_RIGHT => {
                Buttons::LEFT_AND_RIGHT
            }
            _ => button.mask(),
        };
        let Some(kind) = self.map_drag(host, gesture, point, modifiers) else {
            return Dispatch::PASS;
        };
        let window = host.window();
        let refresh = self.machine.on_mouse_down(
            &mut env!(self, host),
            kind.create(),
            window,
            point,
            gesture,
            modifiers,
        );
        Dispatch::handled(refresh)
    }

    /// `pressed` no longer includes `button`.
    pub fn on_button_up(
        &mut self,
        host: &mut dyn HostInterop,
        button: MouseButton,
        pressed: Buttons,
        point: Point,
        modifiers: Modifiers,
    ) -> Dispatch {
        let released = button.mask();
        let drag_button = self.machine.points().button;
        let mut refresh = false;

        if self.machine.is_active() && drag_button.contains(released) {
            // keep the drag while another participating button is held
            if pressed.intersects(drag_button) {
                return Dispatch::handled(false);
            }
            refresh |= self
                .machine
                .on_mouse_up_all(&mut env!(self, host), point, modifiers);
            if self.machine.last_outcome() != LastOutcome::Clicked {
                return Dispatch::handled(refresh);
            }
            self.machine.unmark_canceled();
        } else if self.machine.last_outcome() == LastOutcome::Canceled
            && drag_button.contains(released)
        {
            // a button of the canceled drag; swallow its click
            if !pressed.intersects(drag_button) {
                self.machine.unmark_canceled();
            }
            return Dispatch::handled(false);
        } else if !self.machine.is_active() && host.has_capture() {
            // someone else's drag
            return Dispatch::PASS;
        }

        let Some(target) = self.map_click(host, released, false, point, modifiers) else {
            return Dispatch {
                consumed: false,
                refresh,
            };
        };
        refresh |= self.run_click(host, target, point, modifiers);
        Dispatch::handled(refresh)
    }

    pub fn on_double_click(
        &mut self,
        host: &mut dyn HostInterop,
        button: MouseButton,
        pressed: Buttons,
        point: Point,
        modifiers: Modifiers,
    ) -> Dispatch {
        self.unmark_canceled_on_down(pressed);

        let Some(target) = self.map_click(host, button.mask(), true, point, modifiers) else {
            return Dispatch::PASS;
        };
        let refresh = self.run_click(host, target, point, modifiers);

        // placeholder drag eats the release that follows
        let window = host.window();
        self.machine
            .begin_placeholder(&mut env!(self, host), window, point, button.mask());
        self.machine.invalidate_click();
        Dispatch::handled(refresh)
    }

    pub fn on_mouse_move(
        &mut self,
        host: &mut dyn HostInterop,
        point: Point,
        modifiers: Modifiers,
    ) -> Dispatch {
        if !self.machine.is_active() {
            return Dispatch::PASS;
        }
        let refresh = self
            .machine
            .on_mouse_move(&mut env!(self, host), point, modifiers);
        Dispatch::handled(refresh)
    }

    /// Capture went elsewhere; the drag ends without releasing it.
    pub fn on_capture_changed(&mut self, host: &mut dyn HostInterop) -> Dispatch {
        if !self.machine.is_active() {
            return Dispatch::PASS;
        }
        let refresh = self.machine.cancel(&mut env!(self, host), false);
        Dispatch::handled(refresh)
    }

    /// `point` is in client coordinates; `pressed` is the held buttons.
    pub fn on_wheel(
        &mut self,
        host: &mut dyn HostInterop,
        point: Point,
        delta: i32,
        pressed: Buttons,
        modifiers: Modifiers,
    ) -> Dispatch {
        // right button + wheel must not end in a right click
        self.machine.invalidate_click();

        let r_button = pressed.contains(Buttons::RIGHT);
        let Some((action, center)) = self.map_wheel(host, r_button, point, modifiers) else {
            return Dispatch::PASS;
        };
        log::trace!("wheel {:?} delta {} at {:?}", action, delta, point);
        match wheels::perform(action, &mut env!(self, host), point, delta, modifiers, center) {
            Some(refresh) => Dispatch::handled(refresh),
            None => Dispatch::PASS,
        }
    }

    pub fn on_key(&mut self, host: &mut dyn HostInterop, key: KeyEvent) -> Dispatch {
        if !self.machine.is_active() {
            return Dispatch::PASS;
        }
        self.machine.handle_key(&mut env!(self, host), key)
    }

    /// Auto-scroll timer fired. Replays the last pointer position into the
    /// drag that armed it.
    pub fn on_timer(&mut self, host: &mut dyn HostInterop) -> Dispatch {
        let owner = self.timer.owner();
        self.timer.kill(host);
        if owner != Some(self.machine.generation()) || !self.machine.is_active() {
            log::trace!("stale auto-scroll timer for drag {:?}", owner);
            return Dispatch::handled(false);
        }
        let (point, modifiers) = (host.cursor_pos(), host.modifiers());
        let refresh = self
            .machine
            .on_mouse_move(&mut env!(self, host), point, modifiers);
        Dispatch::handled(refresh)
    }

    fn map_drag(
        &self,
        host: &dyn HostInterop,
        gesture: Buttons,
        point: Point,
        modifiers: Modifiers,
    ) -> Option<HandlerKind> {
        let s = &self.settings;
        match self.region(host, point) {
            region @ (Region::Object | Region::Blank | Region::Ruler) => {
                if !s.timeline.enabled {
                    return None;
                }
                let table = if region == Region::Object {
                    &s.timeline.drag_obj
                } else {
                    &s.timeline.drag
                };
                let kind = match table.resolve(gesture, modifiers) {
                    TimelineDrag::None => HandlerKind::NoAction,
                    TimelineDrag::L => HandlerKind::Plain,
                    TimelineDrag::ObjL => HandlerKind::Object(ObjectMode::Plain),
                    TimelineDrag::ObjCtrlL => HandlerKind::Object(ObjectMode::Ctrl),
                    TimelineDrag::ObjShiftL => HandlerKind::Object(ObjectMode::Shift),
                    TimelineDrag::BkL => HandlerKind::Background,
                    TimelineDrag::BkCtrlL => HandlerKind::BackgroundCtrl,
                    TimelineDrag::AltL => HandlerKind::Alt,
                    TimelineDrag::ZoomBi => HandlerKind::ZoomBi,
                    TimelineDrag::StepBound => HandlerKind::StepBound,
                    TimelineDrag::StepBpm => HandlerKind::StepBpm,
                    TimelineDrag::Bypass => return None,
                };
                Some(kind)
            }
            Region::Layer => {
                if !s.layer.enabled {
                    return None;
                }
                let kind = match s.layer.drag.resolve(gesture, modifiers) {
                    LayerDrag::None => HandlerKind::NoAction,
                    LayerDrag::ShowHide => HandlerKind::ShowHide,
                    LayerDrag::LockUnlock => HandlerKind::LockUnlock,
                    LayerDrag::LinkCoord => HandlerKind::LinkCoord,
                    LayerDrag::MaskAbove => HandlerKind::MaskAbove,
                    LayerDrag::SelectAll => HandlerKind::LayerSelectAll,
                    LayerDrag::DragMove => HandlerKind::LayerDragMove,
                    LayerDrag::Bypass => return None,
                };
                Some(kind)
            }
            Region::SceneButton if s.scene_button.enabled && gesture == Buttons::RIGHT => {
                Some(HandlerKind::NoAction)
            }
            Region::ZoomGauge if s.zoom_gauge.enabled && gesture == Buttons::RIGHT => {
                Some(HandlerKind::NoAction)
            }
            _ => None,
        }
    }

    fn map_click(
        &self,
        host: &dyn HostInterop,
        button: Buttons,
        double: bool,
        point: Point,
        modifiers: Modifiers,
    ) -> Option<ClickTarget> {
        let s = &self.settings;
        let tl = &s.timeline;
        let target = match self.region(host, point) {
            region @ (Region::Object | Region::Blank | Region::Ruler) => {
                if !tl.enabled {
                    return None;
                }
                let table = match (region == Region::Object, double) {
                    (true, true) => &tl.dbl_click_obj,
                    (true, false) => &tl.click_obj,
                    (false, true) => &tl.dbl_click,
                    (false, false) => &tl.click,
                };
                ClickTarget::Timeline(table.resolve(button, modifiers))
            }
            Region::Layer => {
                if !s.layer.enabled {
                    return None;
                }
                let table = if double { &s.layer.dbl_click } else { &s.layer.click };
                ClickTarget::Layer(table.resolve(button, modifiers))
            }
            Region::SceneButton if s.scene_button.enabled && !double && button == Buttons::RIGHT => {
                ClickTarget::Timeline(TimelineClick::Rclick)
            }
            Region::ZoomGauge if s.zoom_gauge.enabled && !double && button == Buttons::RIGHT => {
                ClickTarget::Timeline(TimelineClick::Rclick)
            }
            _ => return None,
        };
        match target {
            ClickTarget::Timeline(TimelineClick::Bypass) | ClickTarget::Layer(LayerClick::Bypass) => {
                None
            }
            _ => Some(target),
        }
    }

    fn map_wheel(
        &self,
        host: &dyn HostInterop,
        r_button: bool,
        point: Point,
        modifiers: Modifiers,
    ) -> Option<(WheelAction, ZoomCenter)> {
        let s = &self.settings;
        // outside the object area there is no pointer frame to zoom around
        let off_area = |center: ZoomCenter| match center {
            ZoomCenter::Mouse => ZoomCenter::CurrFrame,
            c => c,
        };
        let direction = |wheel: i32, positive: WheelAction, negative: WheelAction| match wheel {
            0 => None,
            w if w < 0 => Some(negative),
            _ => Some(positive),
        };
        match self.region(host, point) {
            Region::Object | Region::Blank | Region::Ruler if s.timeline.enabled => Some((
                s.timeline.wheel.resolve(r_button, modifiers),
                s.timeline.zoom_center_wheel,
            )),
            Region::Layer if s.layer.enabled => Some((
                s.layer.wheel.resolve(r_button, modifiers),
                off_area(s.layer.zoom_center_wheel),
            )),
            Region::SceneButton if s.scene_button.enabled => {
                let action = direction(
                    s.scene_button.wheel,
                    WheelAction::ChangeSceneP,
                    WheelAction::ChangeSceneN,
                )?;
                Some((action, ZoomCenter::CurrFrame))
            }
            Region::ZoomGauge if s.zoom_gauge.enabled => {
                let action =
                    direction(s.zoom_gauge.wheel, WheelAction::ZoomHP, WheelAction::ZoomHN)?;
                Some((action, off_area(s.zoom_gauge.zoom_center)))
            }
            Region::VScrollbar if s.timeline.enabled && s.timeline.wheel_vertical_scrollbar => {
                Some((WheelAction::ScrollVP, ZoomCenter::CurrFrame))
            }
            _ => None,
        }
    }

    fn run_click(
        &mut self,
        host: &mut dyn HostInterop,
        target: ClickTarget,
        point: Point,
        modifiers: Modifiers,
    ) -> bool {
        log::debug!("click {:?} at {:?}", target, point);
        let command = match target {
            ClickTarget::Timeline(action) => {
                return clicks::perform(action, &mut env!(self, host), point, modifiers);
            }
            ClickTarget::Layer(LayerClick::None | LayerClick::Bypass) => return false,
            ClickTarget::Layer(LayerClick::Rclick) => {
                return clicks::rclick(host, point, modifiers);
            }
            ClickTarget::Layer(LayerClick::Rename) => LayerCommand::Rename,
            ClickTarget::Layer(LayerClick::ToggleOthers) => LayerCommand::ToggleOthers,
            ClickTarget::Layer(LayerClick::Insert) => LayerCommand::Insert,
            ClickTarget::Layer(LayerClick::Remove) => LayerCommand::Remove,
        };
        let mapper = self.mapper(host);
        layers::layer_command(host, &mapper, point.y, command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::bindings::Binding;
    use crate::memory_host::MemoryHost;

    const BLANK: Point = Point::new(500, 300);
    const LAYER: Point = Point::new(20, 42 + 32 * 2 + 5);

    #[test]
    fn bypass_and_none_differ() {
        let mut settings = Settings::default();
        settings.timeline.drag.m = Binding::uniform(TimelineDrag::Bypass);
        let mut tl = InteractionDispatcher::new(settings);
        let mut host = MemoryHost::new(1000);

        let d = tl.on_button_down(&mut host, MouseButton::Middle, Buttons::MIDDLE, BLANK, Modifiers::NONE);
        assert_eq!(d, Dispatch::PASS);
        assert!(!tl.machine().is_active());

        // right drag on blank is `none`: consumed, placeholder holds capture
        let d = tl.on_button_down(&mut host, MouseButton::Right, Buttons::RIGHT, BLANK, Modifiers::NONE);
        assert!(d.consumed);
        assert_eq!(tl.machine().active_kind(), Some(HandlerKind::NoAction));
    }

    #[test]
    fn chord_maps_to_left_and_right_table() {
        let mut settings = Settings::default();
        settings.timeline.drag.l_and_r = Binding::uniform(TimelineDrag::ZoomBi);
        let mut tl = InteractionDispatcher::new(settings);
        let mut host = MemoryHost::new(1000);

        tl.on_button_down(&mut host, MouseButton::Left, Buttons::LEFT, BLANK, Modifiers::NONE);
        assert_eq!(tl.machine().active_kind(), Some(HandlerKind::Plain));
        tl.on_button_down(&mut host, MouseButton::Right, Buttons::LEFT_AND_RIGHT, BLANK, Modifiers::NONE);
        assert_eq!(tl.machine().active_kind(), Some(HandlerKind::ZoomBi));
        assert_eq!(tl.machine().points().button, Buttons::LEFT_AND_RIGHT);
    }

    #[test]
    fn wheel_in_scene_button_follows_direction() {
        let mut settings = Settings::default();
        settings.scene_button.wheel = -1;
        let mut tl = InteractionDispatcher::new(settings);
        let mut host = MemoryHost::new(1000);

        let d = tl.on_wheel(&mut host, Point::new(10, 10), -120, Buttons::empty(), Modifiers::NONE);
        assert!(d.consumed);
        assert_eq!(host.current_scene(), 0);
        tl.on_wheel(&mut host, Point::new(10, 10), 120, Buttons::empty(), Modifiers::NONE);
        assert_eq!(host.current_scene(), 1);

        let mut tl = InteractionDispatcher::new(Settings::default());
        let d = tl.on_wheel(&mut host, Point::new(10, 10), 120, Buttons::empty(), Modifiers::NONE);
        assert_eq!(d, Dispatch::PASS);
    }

    #[test]
    fn layer_middle_click_renames_visible_row() {
        let mut tl = InteractionDispatcher::new(Settings::default());
        let mut host = MemoryHost::new(1000);
        tl.on_button_down(&mut host, MouseButton::Middle, Buttons::MIDDLE, LAYER, Modifiers::NONE);
        let d = tl.on_button_up(&mut host, MouseButton::Middle, Buttons::empty(), LAYER, Modifiers::NONE);
        assert!(d.consumed);
        assert_eq!(host.layer_commands().last(), Some(&(LayerCommand::Rename, 2)));
    }

    #[test]
    fn foreign_capture_passes_release_through() {
        let mut tl = InteractionDispatcher::new(Settings::default());
        let mut host = MemoryHost::new(1000);
        host.set_capture();
        let d = tl.on_button_up(&mut host, MouseButton::Right, Buttons::empty(), BLANK, Modifiers::NONE);
        assert_eq!(d, Dispatch::PASS);
    }

    #[test]
    fn stale_timer_is_ignored() {
        let mut tl = InteractionDispatcher::new(Settings::default());
        let mut host = MemoryHost::new(1000);
        let d = tl.on_timer(&mut host);
        assert!(d.consumed && !d.refresh);
        assert_eq!(host.pending_timer(), None);
    }
}
