//! Drags replayed into the host under controlled modifier keys.

use crate::constants::EDGE_GRAB_THRESHOLD;
use crate::handlers::{Down, DragHandler, HandlerKind};
use crate::host::{
    CursorShape, DragKind, Key, KeyEvent, KeyOverride, MessageKind, Point, SyntheticMessage, keys,
};
use crate::input::buttons::{Buttons, Modifiers, MouseButton};
use crate::input::drag::DragCtx;
use crate::navigation;

fn down_msg(point: Point, modifiers: Modifiers) -> SyntheticMessage {
    SyntheticMessage::new(
        MessageKind::ButtonDown(MouseButton::Left),
        point,
        Buttons::LEFT,
        modifiers,
    )
}

fn move_msg(point: Point, modifiers: Modifiers) -> SyntheticMessage {
    SyntheticMessage::new(MessageKind::Move, point, Buttons::LEFT, modifiers)
}

fn up_msg(point: Point, modifiers: Modifiers) -> SyntheticMessage {
    SyntheticMessage::new(
        MessageKind::ButtonUp(MouseButton::Left),
        point,
        Buttons::empty(),
        modifiers,
    )
}

/// Shift transitions reach the host so its snapping toggles; the rest is swallowed.
fn pass_shift_only(key: KeyEvent) -> bool {
    !(key.key == Key::Shift && !key.repeat)
}

/// Puts the scroll back so that the start point shows `frame` and `layer` again.
fn restore_scroll(cx: &mut DragCtx<'_>, frame: i32, layer: i32) {
    let mapper = cx.mapper();
    let start = cx.points.start;
    let view = mapper.view;
    cx.host
        .set_frame_scroll(view.frame_scroll + frame - mapper.point_to_frame(start.x));
    cx.host
        .set_layer_scroll(view.layer_scroll + layer - mapper.point_to_layer(start.y));
}

fn is_obj_edge_nearby(cx: &DragCtx<'_>, point: Point) -> bool {
    let Some(obj) = cx
        .host
        .object_at_point(point.x, point.y)
        .and_then(|id| cx.host.object(id))
    else {
        return false;
    };
    let mapper = cx.mapper();
    (mapper.frame_to_point(obj.begin) - point.x).abs() < EDGE_GRAB_THRESHOLD
        || (mapper.frame_to_point(obj.end) - point.x).abs() < EDGE_GRAB_THRESHOLD
}

/// The host's own left drag, whatever it turns out to be
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainDrag {
    prev_frame: i32,
    prev_layer: i32,
}

impl DragHandler for PlainDrag {
    fn kind(&self) -> HandlerKind {
        HandlerKind::Plain
    }

    fn on_down(&mut self, cx: &mut DragCtx<'_>) -> Down {
        cx.memo.selection_origin = cx.host.selection_origin();
        let frame_before = cx.host.current_frame();

        let start = cx.points.start;
        // ctrl+shift on an object would deselect instead of starting a move
        let suppress_shift =
            cx.modifiers.ctrl && cx.host.object_at_point(start.x, start.y).is_some();
        let modifiers = if suppress_shift {
            cx.modifiers.without_shift()
        } else {
            cx.modifiers
        };
        let ret = cx.forward(
            down_msg(start, modifiers),
            &[KeyOverride::suppress(Key::Shift, suppress_shift)],
        );

        match cx.host.drag_kind() {
            DragKind::MoveFrame => self.prev_frame = frame_before,
            DragKind::Scroll => {
                let mapper = cx.mapper();
                self.prev_frame = mapper.point_to_frame(start.x);
                self.prev_layer = mapper.point_to_layer(start.y);
                if cx.settings.timeline.change_cursor {
                    cx.host.set_cursor(CursorShape::SizeAll);
                }
            }
            _ => {}
        }
        Down::Done(ret)
    }

    fn on_move(&mut self, cx: &mut DragCtx<'_>) -> bool {
        let msg = move_msg(cx.points.curr, cx.modifiers);
        cx.forward(msg, &[])
    }

    fn on_up(&mut self, cx: &mut DragCtx<'_>) -> bool {
        let msg = up_msg(cx.points.curr, cx.modifiers);
        cx.forward(msg, &[])
    }

    fn on_cancel(&mut self, cx: &mut DragCtx<'_>, release: bool) -> bool {
        match cx.host.drag_kind() {
            // releasing ctrl aborts the host's object move
            kind if kind.moves_objects() => {
                cx.forward(SyntheticMessage::key_up(Key::Ctrl), &[]);
            }
            DragKind::MoveFrame => {
                cx.host.set_current_frame(self.prev_frame);
            }
            DragKind::Scroll => restore_scroll(cx, self.prev_frame, self.prev_layer),
            _ => {}
        }
        cx.host.set_drag_kind(DragKind::None);
        if release {
            cx.host.release_capture();
        }
        false
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectMode {
    /// Move the clicked object alone.
    Plain,
    /// Move with ctrl held, i.e. the whole selection.
    Ctrl,
    /// Resize from the nearest edge.
    Shift,
}

/// Object move or resize with forced modifiers
#[derive(Debug, Clone, Copy)]
pub struct ObjectDrag {
    mode: ObjectMode,
}

impl ObjectDrag {
    pub fn new(mode: ObjectMode) -> Self {
        Self { mode }
    }

    fn overrides(&self) -> [KeyOverride; 2] {
        match self.mode {
            ObjectMode::Plain => [KeyOverride::off(Key::Ctrl), KeyOverride::off(Key::Alt)],
            ObjectMode::Ctrl => [KeyOverride::on(Key::Ctrl), KeyOverride::off(Key::Alt)],
            ObjectMode::Shift => [KeyOverride::on(Key::Shift), KeyOverride::off(Key::Alt)],
        }
    }

    fn message_modifiers(&self, held: Modifiers) -> Modifiers {
        match self.mode {
            ObjectMode::Plain => held.only_shift(),
            ObjectMode::Ctrl => held.only_shift() | Modifiers::CTRL,
            ObjectMode::Shift => Modifiers::SHIFT,
        }
    }
}

impl DragHandler for ObjectDrag {
    fn kind(&self) -> HandlerKind {
        HandlerKind::Object(self.mode)
    }

    fn can_continue(&self, cx: &DragCtx<'_>) -> bool {
        cx.host.is_editing()
    }

    fn on_down(&mut self, cx: &mut DragCtx<'_>) -> Down {
        cx.memo.selection_origin = cx.host.selection_origin();

        let start = cx.points.start;
        let (modifiers, overrides) = match self.mode {
            ObjectMode::Plain => (Modifiers::NONE, keys::PLAIN),
            ObjectMode::Ctrl => (Modifiers::CTRL, keys::CTRL),
            ObjectMode::Shift => {
                if !is_obj_edge_nearby(cx, start) {
                    return Down::Fallback(HandlerKind::Object(ObjectMode::Plain));
                }
                (Modifiers::SHIFT, keys::SHIFT)
            }
        };
        Down::Done(cx.forward(down_msg(start, modifiers), &overrides))
    }

    fn on_move(&mut self, cx: &mut DragCtx<'_>) -> bool {
        let msg = move_msg(cx.points.curr, self.message_modifiers(cx.modifiers));
        cx.forward(msg, &self.overrides())
    }

    fn on_up(&mut self, cx: &mut DragCtx<'_>) -> bool {
        let msg = up_msg(cx.points.curr, self.message_modifiers(cx.modifiers));
        cx.forward(msg, &self.overrides())
    }

    fn on_cancel(&mut self, cx: &mut DragCtx<'_>, release: bool) -> bool {
        if cx.host.drag_kind().moves_objects() {
            cx.forward(SyntheticMessage::key_up(Key::Ctrl), &[]);
        }
        cx.host.set_drag_kind(DragKind::None);
        if release {
            cx.host.release_capture();
        }
        false
    }

    fn handle_key(&mut self, _cx: &mut DragCtx<'_>, key: KeyEvent) -> bool {
        match self.mode {
            ObjectMode::Plain | ObjectMode::Ctrl => pass_shift_only(key),
            ObjectMode::Shift => true,
        }
    }
}

/// Drags the current frame, also when started on an object
#[derive(Debug, Clone, Copy, Default)]
pub struct BackgroundDrag {
    prev_frame: i32,
    prev_scene: Option<i32>,
}

impl DragHandler for BackgroundDrag {
    fn kind(&self) -> HandlerKind {
        HandlerKind::Background
    }

    fn can_continue(&self, cx: &DragCtx<'_>) -> bool {
        cx.host.is_editing() && self.prev_scene.is_none_or(|s| s == cx.host.current_scene())
    }

    fn on_down(&mut self, cx: &mut DragCtx<'_>) -> Down {
        self.prev_frame = cx.host.current_frame();
        self.prev_scene = Some(cx.host.current_scene());
        let start = cx.points.start;

        if cx.host.object_at_point(start.x, start.y).is_none() {
            return Down::Done(cx.forward(down_msg(start, Modifiers::NONE), &keys::PLAIN));
        }

        // An alt press registers the click position with the host; the drag
        // then turns into a frame move.
        cx.forward(down_msg(start, Modifiers::NONE), &[KeyOverride::on(Key::Alt)]);
        let frame = cx.mapper().point_to_frame(start.x);
        cx.host.set_current_frame(frame);
        cx.host.set_drag_kind(DragKind::MoveFrame);
        Down::Done(true)
    }

    fn on_move(&mut self, cx: &mut DragCtx<'_>) -> bool {
        let msg = move_msg(cx.points.curr, cx.modifiers);
        cx.forward(msg, &[])
    }

    fn on_up(&mut self, cx: &mut DragCtx<'_>) -> bool {
        let msg = up_msg(cx.points.curr, cx.modifiers);
        cx.forward(msg, &[])
    }

    fn on_cancel(&mut self, cx: &mut DragCtx<'_>, release: bool) -> bool {
        cx.host.set_drag_kind(DragKind::None);
        if release {
            cx.host.release_capture();
        }
        self.prev_scene == Some(cx.host.current_scene())
            && navigation::move_frame(&mut *cx.host, &cx.settings.walk, self.prev_frame)
    }

    fn handle_key(&mut self, _cx: &mut DragCtx<'_>, key: KeyEvent) -> bool {
        pass_shift_only(key)
    }
}

/// Range selection, also when started on an object
#[derive(Debug, Clone, Copy, Default)]
pub struct BackgroundCtrlDrag {
    prev_scene: Option<i32>,
}

impl DragHandler for BackgroundCtrlDrag {
    fn kind(&self) -> HandlerKind {
        HandlerKind::BackgroundCtrl
    }

    fn can_continue(&self, cx: &DragCtx<'_>) -> bool {
        cx.host.is_editing() && self.prev_scene.is_none_or(|s| s == cx.host.current_scene())
    }

    fn on_down(&mut self, cx: &mut DragCtx<'_>) -> Down {
        self.prev_scene = Some(cx.host.current_scene());
        let start = cx.points.start;

        if cx.host.object_at_point(start.x, start.y).is_none() {
            return Down::Done(cx.forward(down_msg(start, Modifiers::CTRL), &keys::CTRL));
        }

        cx.forward(down_msg(start, Modifiers::NONE), &[KeyOverride::on(Key::Alt)]);
        cx.host.begin_range_selection(start);
        cx.host.set_drag_kind(DragKind::RangeSelect);
        Down::Done(false)
    }

    fn on_move(&mut self, cx: &mut DragCtx<'_>) -> bool {
        let msg = move_msg(cx.points.curr, Modifiers::CTRL);
        cx.forward(msg, &keys::CTRL)
    }

    fn on_up(&mut self, cx: &mut DragCtx<'_>) -> bool {
        let msg = up_msg(cx.points.curr, Modifiers::CTRL);
        cx.forward(msg, &keys::CTRL)
    }

    fn on_cancel(&mut self, cx: &mut DragCtx<'_>, release: bool) -> bool {
        // releasing ctrl aborts the range selection
        cx.forward(SyntheticMessage::key_up(Key::Ctrl), &[]);
        if release {
            cx.host.release_capture();
        }
        false
    }

    fn handle_key(&mut self, _cx: &mut DragCtx<'_>, _key: KeyEvent) -> bool {
        true
    }
}

/// The host's alt drag, which scrolls the view
#[derive(Debug, Clone, Copy, Default)]
pub struct AltDrag {
    prev_frame: i32,
    prev_layer: i32,
    prev_scene: i32,
}

impl DragHandler for AltDrag {
    fn kind(&self) -> HandlerKind {
        HandlerKind::Alt
    }

    fn on_down(&mut self, cx: &mut DragCtx<'_>) -> Down {
        let mapper = cx.mapper();
        let start = cx.points.start;
        self.prev_frame = mapper.point_to_frame(start.x);
        self.prev_layer = mapper.point_to_layer(start.y);
        self.prev_scene = cx.host.current_scene();

        if cx.settings.timeline.change_cursor {
            cx.host.set_cursor(CursorShape::SizeAll);
        }
        Down::Done(cx.forward(down_msg(start, Modifiers::NONE), &keys::ALT))
    }

    fn on_move(&mut self, cx: &mut DragCtx<'_>) -> bool {
        let msg = move_msg(cx.points.curr, cx.modifiers);
        cx.forward(msg, &[])
    }

    fn on_up(&mut self, cx: &mut DragCtx<'_>) -> bool {
        let msg = up_msg(cx.points.curr, cx.modifiers);
        cx.forward(msg, &[])
    }

    fn on_cancel(&mut self, cx: &mut DragCtx<'_>, release: bool) -> bool {
        cx.host.set_drag_kind(DragKind::None);
        if release {
            cx.host.release_capture();
        }
        if self.prev_scene == cx.host.current_scene() {
            restore_scroll(cx, self.prev_frame, self.prev_layer);
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::rig::Rig;
    use crate::host::{HostInterop, ObjectStore};
    use std::collections::BTreeSet;

    #[test]
    fn background_drag_on_object_moves_frame() {
        let mut rig = Rig::new(1000);
        let id = rig.add(100, 199, 0);
        rig.host.set_current_frame(10);

        rig.down(BackgroundDrag::default().into(), 64 + 150, 50);
        assert_eq!(rig.host.current_frame(), 150);
        assert_eq!(rig.host.drag_kind(), DragKind::MoveFrame);
        rig.moved(64 + 300, 50);
        assert_eq!(rig.host.current_frame(), 300);
        assert_eq!(rig.host.object(id).map(|o| o.begin), Some(100));

        rig.cancel();
        assert_eq!(rig.host.current_frame(), 10);
        assert!(!rig.host.has_capture());
    }

    #[test]
    fn shift_drag_needs_an_edge() {
        let mut rig = Rig::new(1000);
        rig.add(100, 199, 0);
        rig.down(ObjectDrag::new(ObjectMode::Shift).into(), 64 + 150, 50);
        assert_eq!(rig.machine.active_kind(), Some(HandlerKind::Object(ObjectMode::Plain)));
        assert_eq!(rig.host.drag_kind(), DragKind::MoveObject);

        let mut rig = Rig::new(1000);
        let id = rig.add(100, 199, 0);
        rig.down(ObjectDrag::new(ObjectMode::Shift).into(), 64 + 198, 50);
        assert_eq!(rig.machine.active_kind(), Some(HandlerKind::Object(ObjectMode::Shift)));
        assert_eq!(rig.host.drag_kind(), DragKind::MoveObjectRight);
        rig.moved(64 + 240, 50);
        assert_eq!(rig.host.object(id).map(|o| o.end), Some(241));
        rig.cancel();
        assert_eq!(rig.host.object(id).map(|o| o.end), Some(199));
    }

    #[test]
    fn ctrl_background_drag_selects_range_from_object() {
        let mut rig = Rig::new(1000);
        let a = rig.add(100, 199, 0);
        let b = rig.add(300, 399, 1);

        rig.down(BackgroundCtrlDrag::default().into(), 64 + 150, 50);
        assert_eq!(rig.host.drag_kind(), DragKind::RangeSelect);
        rig.moved(64 + 350, 84);
        rig.up(64 + 350, 84);
        assert_eq!(rig.host.selection(), BTreeSet::from([a, b]));
        assert!(!rig.host.has_capture());
    }

    #[test]
    fn alt_drag_cancel_puts_scroll_back() {
        let mut rig = Rig::new(10_000);
        rig.host.set_frame_scroll(500);

        rig.down(AltDrag::default().into(), 400, 300);
        assert_eq!(rig.host.cursor(), CursorShape::SizeAll);
        rig.moved(300, 300);
        assert_eq!(rig.host.view().frame_scroll, 600);

        rig.cancel();
        assert_eq!(rig.host.view().frame_scroll, 500);
        assert_eq!(rig.host.view().layer_scroll, 0);
    }
}
