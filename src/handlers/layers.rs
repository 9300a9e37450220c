//! Drags and clicks on the layer header column.
//!
//! Paint drags decide their direction on the first layer and then apply that
//! same state, not a toggle, to every layer the pointer crosses. Pointing
//! beyond the visible rows scrolls by one layer per timer tick.

use std::collections::BTreeSet;

use crate::constants::NUM_LAYERS;
use crate::handlers::{Down, DragHandler, HandlerKind};
use crate::host::{
    CursorShape, HostInterop, LayerCommand, LayerFlags, LayerSetting, ObjectId, UndoTarget,
};
use crate::input::drag::DragCtx;
use crate::timeline::Mapper;

/// Layer under the pointer, limited to the visible rows. Scrolls one row
/// toward the pointer when it is outside and the cooldown has passed.
fn find_layer_and_scroll(cx: &mut DragCtx<'_>) -> i32 {
    let mapper = cx.mapper();
    let layer = mapper.point_to_layer(cx.points.curr.y);
    let (top, bottom) = mapper.visible_layers();
    let (layer, delta) = if layer < top {
        (top, -1)
    } else if layer > bottom {
        (bottom, 1)
    } else {
        return layer;
    };

    let scrolled = (top + delta).clamp(0, NUM_LAYERS - 1);
    if scrolled != top && cx.timer.ready(cx.host.now_ms()) {
        cx.host.set_layer_scroll(scrolled);
        cx.timer
            .arm(&mut *cx.host, cx.generation, cx.settings.layer.auto_scroll_delay_ms);
        log::trace!("auto-scroll to layer {}", scrolled);
        return (layer + delta).clamp(0, NUM_LAYERS - 1);
    }
    layer
}

/// Layers newly covered when the pointer goes from `prev` to `curr`.
fn entered_layers(prev: i32, curr: i32) -> std::ops::Range<i32> {
    if prev < curr { prev + 1..curr + 1 } else { curr..prev }
}

/// Undo id and scene a layer drag started under
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Session {
    undo_id: u32,
    scene: i32,
}

impl Session {
    fn capture(host: &dyn HostInterop) -> Self {
        Self {
            undo_id: host.undo_id(),
            scene: host.current_scene(),
        }
    }

    fn is_current(self, host: &dyn HostInterop) -> bool {
        self.undo_id == host.undo_id() && self.scene == host.current_scene()
    }
}

fn session_alive(session: Option<Session>, cx: &DragCtx<'_>) -> bool {
    cx.host.is_editing() && session.is_none_or(|s| s.is_current(&*cx.host))
}

/// Paints one layer flag across the dragged layers
#[derive(Debug, Clone)]
pub struct LayerFlagDrag {
    flag: LayerFlags,
    /// State every crossed layer ends up in.
    value: bool,
    prev_layer: i32,
    session: Option<Session>,
    /// Settings of every changed layer before the drag touched it.
    changed: Vec<(i32, LayerSetting)>,
}

impl LayerFlagDrag {
    pub fn new(flag: LayerFlags) -> Self {
        Self {
            flag,
            value: false,
            prev_layer: 0,
            session: None,
            changed: Vec::new(),
        }
    }

    /// Visibility and clipping change the rendered frame.
    fn redraws(&self) -> bool {
        self.flag == LayerFlags::HIDDEN || self.flag == LayerFlags::CLIP
    }

    fn paint(&mut self, host: &mut dyn HostInterop, layer: i32) -> bool {
        let before = host.layer_setting(layer);
        if before.flags.contains(self.flag) == self.value {
            return false;
        }
        host.record_undo(UndoTarget::Layer(layer));
        let mut after = before.clone();
        after.flags.set(self.flag, self.value);
        host.set_layer_setting(layer, after);
        self.changed.push((layer, before));
        true
    }
}

impl DragHandler for LayerFlagDrag {
    fn kind(&self) -> HandlerKind {
        if self.flag == LayerFlags::HIDDEN {
            HandlerKind::ShowHide
        } else if self.flag == LayerFlags::LOCKED {
            HandlerKind::LockUnlock
        } else if self.flag == LayerFlags::COORD_LINK {
            HandlerKind::LinkCoord
        } else {
            HandlerKind::MaskAbove
        }
    }

    fn can_continue(&self, cx: &DragCtx<'_>) -> bool {
        session_alive(self.session, cx)
    }

    fn on_down(&mut self, cx: &mut DragCtx<'_>) -> Down {
        let layer = cx.mapper().point_to_layer(cx.points.start.y);
        self.prev_layer = layer;
        self.value = !cx.host.layer_setting(layer).flags.contains(self.flag);
        self.changed.clear();

        cx.host.next_undo();
        self.paint(&mut *cx.host, layer);
        self.session = Some(Session::capture(&*cx.host));

        cx.timer.kill(&mut *cx.host);
        cx.host.set_capture();
        cx.host.invalidate();
        Down::Done(self.redraws())
    }

    fn on_move(&mut self, cx: &mut DragCtx<'_>) -> bool {
        let layer = find_layer_and_scroll(cx);
        if layer == self.prev_layer {
            return false;
        }
        let range = entered_layers(self.prev_layer, layer);
        self.prev_layer = layer;

        let mut modified = false;
        for l in range {
            modified |= self.paint(&mut *cx.host, l);
        }
        if modified {
            cx.host.invalidate();
        }
        modified && self.redraws()
    }

    fn on_up(&mut self, cx: &mut DragCtx<'_>) -> bool {
        cx.timer.kill(&mut *cx.host);
        cx.host.release_capture();
        false
    }

    fn on_cancel(&mut self, cx: &mut DragCtx<'_>, release: bool) -> bool {
        cx.timer.kill(&mut *cx.host);
        if release {
            cx.host.release_capture();
        }
        if self.changed.is_empty() || self.session.is_none_or(|s| s.scene != cx.host.current_scene()) {
            return false;
        }
        for (layer, setting) in self.changed.drain(..).rev() {
            cx.host.set_layer_setting(layer, setting);
        }
        cx.host.invalidate();
        self.redraws()
    }
}

/// Adds the objects of `layer` to `selection`; locked layers are skipped.
fn add_layer(host: &dyn HostInterop, layer: i32, selection: &mut BTreeSet<ObjectId>) -> bool {
    if host.layer_setting(layer).is_locked() {
        return false;
    }
    let mut added = false;
    for &id in host.layer_objects(layer) {
        added |= selection.insert(id);
    }
    added
}

fn remove_layer(host: &dyn HostInterop, layer: i32, selection: &mut BTreeSet<ObjectId>) -> bool {
    let mut removed = false;
    for id in host.layer_objects(layer) {
        removed |= selection.remove(id);
    }
    removed
}

/// Selects or deselects every object of the dragged layers
#[derive(Debug, Clone, Default)]
pub struct LayerSelectDrag {
    selecting: bool,
    prev_layer: i32,
    session: Option<Session>,
    prev_selection: BTreeSet<ObjectId>,
}

impl LayerSelectDrag {
    fn apply(&self, host: &mut dyn HostInterop, layers: std::ops::Range<i32>) -> bool {
        let mut selection = host.selection();
        let mut modified = false;
        for l in layers {
            modified |= if self.selecting {
                add_layer(&*host, l, &mut selection)
            } else {
                remove_layer(&*host, l, &mut selection)
            };
        }
        if modified {
            host.set_selection(selection);
            host.invalidate();
        }
        modified
    }
}

impl DragHandler for LayerSelectDrag {
    fn kind(&self) -> HandlerKind {
        HandlerKind::LayerSelectAll
    }

    fn can_continue(&self, cx: &DragCtx<'_>) -> bool {
        session_alive(self.session, cx)
    }

    fn on_down(&mut self, cx: &mut DragCtx<'_>) -> Down {
        let layer = cx.mapper().point_to_layer(cx.points.start.y);
        self.prev_layer = layer;
        self.prev_selection = cx.host.selection();

        // an empty layer starts in selecting mode
        let objects = cx.host.layer_objects(layer);
        self.selecting = objects.is_empty() || objects.iter().any(|id| !self.prev_selection.contains(id));
        self.session = Some(Session::capture(&*cx.host));

        self.apply(&mut *cx.host, layer..layer + 1);
        cx.timer.kill(&mut *cx.host);
        cx.host.set_capture();
        Down::Done(false)
    }

    fn on_move(&mut self, cx: &mut DragCtx<'_>) -> bool {
        let layer = find_layer_and_scroll(cx);
        if layer == self.prev_layer {
            return false;
        }
        let range = entered_layers(self.prev_layer, layer);
        self.prev_layer = layer;
        self.apply(&mut *cx.host, range);
        false
    }

    fn on_up(&mut self, cx: &mut DragCtx<'_>) -> bool {
        cx.timer.kill(&mut *cx.host);
        cx.host.release_capture();
        false
    }

    fn on_cancel(&mut self, cx: &mut DragCtx<'_>, release: bool) -> bool {
        cx.timer.kill(&mut *cx.host);
        if release {
            cx.host.release_capture();
        }
        if self.session.is_some_and(|s| s.scene == cx.host.current_scene())
            && cx.host.selection() != self.prev_selection
        {
            cx.host.set_selection(std::mem::take(&mut self.prev_selection));
            cx.host.invalidate();
        }
        false
    }
}

/// Moves layer `from` to `to`, shifting the layers in between by one toward
/// `from`. Objects follow their layer. Returns whether any object moved.
pub fn shift_layers(host: &mut dyn HostInterop, from: i32, to: i32) -> bool {
    if from == to {
        return false;
    }
    let delta = if from < to { 1 } else { -1 };
    // snapshot first, the host tables are stale until rebuilt
    let mut moves: Vec<(ObjectId, i32)> = Vec::new();
    let mut settings: Vec<(i32, LayerSetting)> = Vec::new();

    moves.extend(host.layer_objects(from).iter().map(|&id| (id, to)));
    settings.push((to, host.layer_setting(from)));
    let mut l = from + delta;
    while l != to + delta {
        moves.extend(host.layer_objects(l).iter().map(|&id| (id, l - delta)));
        settings.push((l - delta, host.layer_setting(l)));
        l += delta;
    }

    for (layer, setting) in settings {
        host.set_layer_setting(layer, setting);
    }
    let modified = !moves.is_empty();
    for (id, layer) in moves {
        host.set_object_layer(id, layer);
    }
    if modified {
        host.rebuild_tables();
    }
    modified
}

/// Reorders layers by dragging one along the column
#[derive(Debug, Clone, Copy, Default)]
pub struct LayerMoveDrag {
    start_layer: i32,
    prev_layer: i32,
    session: Option<Session>,
    /// Layers already recorded in the undo journal, once anything moved.
    recorded: Option<(i32, i32)>,
}

impl LayerMoveDrag {
    fn record_undo(&mut self, host: &mut dyn HostInterop, from: i32, to: i32) {
        let (lo, hi) = (from.min(to), from.max(to));
        if self.recorded.is_none() {
            host.next_undo();
            if let Some(s) = self.session.as_mut() {
                s.undo_id = host.undo_id();
            }
        }
        for l in lo..=hi {
            if self.recorded.is_some_and(|(top, btm)| (top..=btm).contains(&l)) {
                continue;
            }
            let objects = host.layer_objects(l).to_vec();
            for id in objects {
                host.record_undo(UndoTarget::ObjectPlacement(id));
            }
            host.record_undo(UndoTarget::Layer(l));
        }
        self.recorded = Some(match self.recorded {
            Some((top, btm)) => (top.min(lo), btm.max(hi)),
            None => (lo, hi),
        });
    }
}

impl DragHandler for LayerMoveDrag {
    fn kind(&self) -> HandlerKind {
        HandlerKind::LayerDragMove
    }

    fn can_continue(&self, cx: &DragCtx<'_>) -> bool {
        session_alive(self.session, cx)
    }

    fn on_down(&mut self, cx: &mut DragCtx<'_>) -> Down {
        let layer = cx.mapper().point_to_layer(cx.points.start.y);
        self.start_layer = layer;
        self.prev_layer = layer;
        self.recorded = None;
        self.session = Some(Session::capture(&*cx.host));

        cx.timer.kill(&mut *cx.host);
        cx.host.set_capture();
        cx.host.set_cursor(CursorShape::SizeNs);
        Down::Done(false)
    }

    fn on_move(&mut self, cx: &mut DragCtx<'_>) -> bool {
        let layer = find_layer_and_scroll(cx);
        if layer == self.prev_layer {
            return false;
        }
        self.record_undo(&mut *cx.host, self.prev_layer, layer);
        shift_layers(&mut *cx.host, self.prev_layer, layer);
        self.prev_layer = layer;
        cx.host.invalidate();
        false
    }

    fn on_up(&mut self, cx: &mut DragCtx<'_>) -> bool {
        cx.timer.kill(&mut *cx.host);
        cx.host.release_capture();
        true
    }

    fn on_cancel(&mut self, cx: &mut DragCtx<'_>, release: bool) -> bool {
        cx.timer.kill(&mut *cx.host);
        if release {
            cx.host.release_capture();
        }
        if self.session.is_some_and(|s| s.scene == cx.host.current_scene())
            && self.prev_layer != self.start_layer
        {
            shift_layers(&mut *cx.host, self.prev_layer, self.start_layer);
            self.prev_layer = self.start_layer;
            cx.host.invalidate();
        }
        true
    }
}

/// Runs a host layer command on the layer at `y`, if that row is visible.
pub fn layer_command(host: &mut dyn HostInterop, mapper: &Mapper, y: i32, command: LayerCommand) -> bool {
    let layer = mapper.point_to_layer(y);
    if !mapper.is_layer_visible(layer) {
        return false;
    }
    log::debug!("layer command {:?} on layer {}", command, layer);
    host.layer_command(command, layer)
}
