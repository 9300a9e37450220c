//! In-memory host for tests and the replay tool.
//!
//! Keeps one scene's objects, layers and view, and emulates the built-in
//! drags the real host runs when it receives button messages: moving objects,
//! resizing them from an edge, moving the current frame, scrolling and range
//! selection.

use std::collections::{BTreeSet, HashSet};

use crate::constants::*;
use crate::grid::TempoInfo;
use crate::host::*;
use crate::input::buttons::{Modifiers, MouseButton};
use crate::timeline::{Mapper, TimelineLayout, TimelineView};

/// Pixels around an object that still hit it.
const HIT_TOLERANCE: i32 = 2;

/// A synthetic message together with the key state the host saw
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchRecord {
    pub message: SyntheticMessage,
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
}

/// State of the drag the emulated host is running
#[derive(Debug, Clone, Default)]
struct HostDrag {
    anchor: Point,
    anchor_view: TimelineView,
    anchor_frame: i32,
    /// Objects being moved, as they were when the drag started.
    snapshot: Vec<(ObjectId, TimelineObject)>,
    range_end: Point,
}

pub struct MemoryHost {
    layout: TimelineLayout,
    view: TimelineView,
    zoom_lengths: Vec<i32>,
    window: WindowId,
    editing: bool,
    scene_len: i32,
    scene: i32,
    frame: i32,
    tempo: TempoInfo,

    objects: Vec<Option<TimelineObject>>,
    tables: Vec<Vec<ObjectId>>,
    layers: Vec<LayerSetting>,

    selection: BTreeSet<ObjectId>,
    selection_origin: Option<ObjectId>,
    dialog: Option<ObjectId>,
    dialog_refreshes: u32,

    undo_id: u32,
    undo_log: Vec<(u32, UndoTarget)>,

    drag_kind: DragKind,
    drag: HostDrag,
    keys: HashSet<Key>,
    capture: bool,
    cursor: CursorShape,
    cursor_pos: Point,
    drag_threshold: (i32, i32),
    invalidations: u32,

    now_ms: u64,
    timer: Option<u32>,

    dispatched: Vec<DispatchRecord>,
    frame_log: Vec<(i32, Modifiers)>,
    layer_commands: Vec<(LayerCommand, i32)>,
}

impl MemoryHost {
    pub fn new(scene_len: i32) -> Self {
        Self {
            layout: TimelineLayout::default(),
            view: TimelineView::default(),
            zoom_lengths: DEFAULT_ZOOM_LENGTHS.to_vec(),
            window: WindowId(1),
            editing: true,
            scene_len: scene_len.max(1),
            scene: 0,
            frame: 0,
            tempo: TempoInfo::default(),
            objects: Vec::new(),
            tables: vec![Vec::new(); NUM_LAYERS as usize],
            layers: vec![LayerSetting::default(); NUM_LAYERS as usize],
            selection: BTreeSet::new(),
            selection_origin: None,
            dialog: None,
            dialog_refreshes: 0,
            undo_id: 0,
            undo_log: Vec::new(),
            drag_kind: DragKind::None,
            drag: HostDrag::default(),
            keys: HashSet::new(),
            capture: false,
            cursor: CursorShape::Arrow,
            cursor_pos: Point::default(),
            drag_threshold: DEFAULT_DRAG_THRESHOLD,
            invalidations: 0,
            now_ms: 0,
            timer: None,
            dispatched: Vec::new(),
            frame_log: Vec::new(),
            layer_commands: Vec::new(),
        }
    }

    fn mapper(&self) -> Mapper {
        Mapper::new(self.layout, self.view)
    }

    fn table_mut(&mut self, layer: i32) -> Option<&mut Vec<ObjectId>> {
        usize::try_from(layer).ok().and_then(|l| self.tables.get_mut(l))
    }

    fn sort_table(&mut self, layer: i32) {
        let objects = std::mem::take(&mut self.objects);
        if let Some(table) = self.table_mut(layer) {
            table.sort_by_key(|id| (objects[id.0].map_or(i32::MAX, |o| o.begin), *id));
        }
        self.objects = objects;
    }

    fn object_mut(&mut self, id: ObjectId) -> Option<&mut TimelineObject> {
        self.objects.get_mut(id.0).and_then(|o| o.as_mut())
    }

    // ===== Scene setup =====

    /// Adds an object and returns its id.
    pub fn push_object(&mut self, object: TimelineObject) -> ObjectId {
        let id = ObjectId(self.objects.len());
        self.objects.push(Some(object));
        if let Some(table) = self.table_mut(object.layer) {
            table.push(id);
        }
        self.sort_table(object.layer);
        id
    }

    /// Links `ids` into one mid-point chain led by the first.
    pub fn link_chain(&mut self, ids: &[ObjectId]) {
        let Some(&leader) = ids.first() else {
            return;
        };
        for (i, &id) in ids.iter().enumerate() {
            let next = ids.get(i + 1).copied();
            if let Some(obj) = self.object_mut(id) {
                obj.leader = Some(leader);
                obj.next = next;
            }
        }
    }

    pub fn set_tempo(&mut self, tempo: TempoInfo) {
        self.tempo = tempo;
    }

    pub fn set_editing(&mut self, editing: bool) {
        self.editing = editing;
    }

    pub fn set_cursor_pos(&mut self, point: Point) {
        self.cursor_pos = point;
    }

    pub fn advance_clock(&mut self, ms: u64) {
        self.now_ms += ms;
    }

    // ===== Inspection =====

    pub fn dispatched(&self) -> &[DispatchRecord] {
        &self.dispatched
    }

    /// Every frame the current frame was set to, with the keys held then.
    pub fn frame_log(&self) -> &[(i32, Modifiers)] {
        &self.frame_log
    }

    pub fn layer_commands(&self) -> &[(LayerCommand, i32)] {
        &self.layer_commands
    }

    pub fn undo_log(&self) -> &[(u32, UndoTarget)] {
        &self.undo_log
    }

    pub fn pending_timer(&self) -> Option<u32> {
        self.timer
    }

    pub fn cursor(&self) -> CursorShape {
        self.cursor
    }

    pub fn invalidations(&self) -> u32 {
        self.invalidations
    }

    pub fn dialog_refreshes(&self) -> u32 {
        self.dialog_refreshes
    }

    pub fn live_objects(&self) -> impl Iterator<Item = (ObjectId, &TimelineObject)> {
        self.objects
            .iter()
            .enumerate()
            .filter_map(|(i, o)| o.as_ref().map(|o| (ObjectId(i), o)))
    }

    // ===== Host drag emulation =====

    fn on_button_down(&mut self, message: SyntheticMessage) {
        let point = message.point;
        let mods = message.modifiers;
        let mapper = self.mapper();
        self.capture = true;
        self.drag = HostDrag {
            anchor: point,
            anchor_view: self.view,
            anchor_frame: mapper.point_to_frame(point.x),
            snapshot: Vec::new(),
            range_end: point,
        };

        if self.key_state(Key::Alt) {
            self.drag_kind = DragKind::Scroll;
            return;
        }
        let Some(id) = self.object_at_point(point.x, point.y) else {
            if mods.ctrl {
                self.drag_kind = DragKind::RangeSelect;
            } else {
                self.drag_kind = DragKind::MoveFrame;
                self.selection.clear();
                let frame = mapper.point_to_frame(point.x);
                self.set_current_frame(frame);
            }
            return;
        };
        let Some(obj) = self.object(id).copied() else {
            return;
        };
        if mods.ctrl && mods.shift {
            // deselect click, no drag
            self.drag_kind = DragKind::None;
            return;
        }

        self.drag_kind = DragKind::MoveObject;
        if mods.shift {
            let to_begin = (mapper.frame_to_point(obj.begin) - point.x).abs();
            let to_end = (mapper.frame_to_point(obj.end + 1) - point.x).abs();
            if to_begin.min(to_end) < EDGE_GRAB_THRESHOLD {
                self.drag_kind = if to_begin <= to_end {
                    DragKind::MoveObjectLeft
                } else {
                    DragKind::MoveObjectRight
                };
            }
        }
        if mods.ctrl {
            self.selection.insert(id);
        } else if !self.selection.contains(&id) {
            self.selection = BTreeSet::from([id]);
        }
        self.selection_origin = Some(id);
        self.dialog = Some(id);

        let moved: Vec<ObjectId> = if self.drag_kind == DragKind::MoveObject {
            self.selection.iter().copied().collect()
        } else {
            vec![id]
        };
        self.drag.snapshot = moved
            .into_iter()
            .filter_map(|id| self.object(id).map(|o| (id, *o)))
            .collect();
    }

    fn on_move(&mut self, point: Point) {
        let mapper = self.mapper();
        match self.drag_kind {
            DragKind::MoveFrame => {
                let frame = mapper.point_to_frame(point.x);
                if frame != self.frame {
                    self.set_current_frame(frame);
                }
            }
            DragKind::Scroll => {
                let anchor = self.drag.anchor;
                let view = self.drag.anchor_view;
                let dx = (point.x - anchor.x) as i64 * ZOOM_SCALE_DENOM / view.zoom_len.max(1) as i64;
                let dy = (point.y - anchor.y) / view.layer_height.max(1);
                self.set_frame_scroll(view.frame_scroll - dx as i32);
                self.set_layer_scroll(view.layer_scroll - dy);
            }
            kind if kind.moves_objects() => {
                let mut delta = mapper.point_to_frame(point.x) - self.drag.anchor_frame;
                let snapshot = std::mem::take(&mut self.drag.snapshot);
                if kind == DragKind::MoveObject {
                    let min_begin = snapshot.iter().map(|(_, o)| o.begin).min().unwrap_or(0);
                    delta = delta.max(-min_begin);
                }
                for &(id, o) in &snapshot {
                    let (begin, end) = match kind {
                        DragKind::MoveObjectLeft => ((o.begin + delta).clamp(0, o.end), o.end),
                        DragKind::MoveObjectRight => (o.begin, (o.end + delta).max(o.begin)),
                        _ => (o.begin + delta, o.end + delta),
                    };
                    self.set_object_frames(id, begin, end);
                }
                self.drag.snapshot = snapshot;
            }
            DragKind::RangeSelect => self.drag.range_end = point,
            _ => {}
        }
    }

    fn on_button_up(&mut self) {
        if self.drag_kind == DragKind::RangeSelect {
            let mapper = self.mapper();
            let (a, b) = (self.drag.anchor, self.drag.range_end);
            let (f0, f1) = (
                mapper.point_to_frame(a.x.min(b.x)),
                mapper.point_to_frame(a.x.max(b.x)),
            );
            let (l0, l1) = (
                mapper.point_to_layer(a.y.min(b.y)),
                mapper.point_to_layer(a.y.max(b.y)),
            );
            let hits: Vec<ObjectId> = (l0..=l1)
                .flat_map(|l| self.layer_objects(l).iter().copied())
                .filter(|&id| self.object(id).is_some_and(|o| o.begin <= f1 && f0 <= o.end))
                .collect();
            self.selection.extend(hits);
        }
        self.drag_kind = DragKind::None;
        self.capture = false;
    }

    /// Releasing ctrl mid-drag aborts moves and range selections.
    fn on_ctrl_up(&mut self) {
        if self.drag_kind.moves_objects() {
            let snapshot = std::mem::take(&mut self.drag.snapshot);
            for (id, o) in snapshot {
                self.set_object_frames(id, o.begin, o.end);
            }
        } else if self.drag_kind != DragKind::RangeSelect {
            return;
        }
        self.drag_kind = DragKind::None;
        self.capture = false;
    }

    fn on_wheel(&mut self, delta: i32) {
        let step = if delta > 0 { -1 } else { 1 };
        if self.key_state(Key::Alt) {
            self.set_layer_scroll(self.view.layer_scroll + step);
        } else {
            let size = self.mapper().horiz_scroll_size();
            self.set_frame_scroll(self.view.frame_scroll + step * size);
        }
    }
}

impl ObjectStore for MemoryHost {
    fn scene_len(&self) -> i32 {
        self.scene_len
    }

    fn layer_objects(&self, layer: i32) -> &[ObjectId] {
        usize::try_from(layer)
            .ok()
            .and_then(|l| self.tables.get(l))
            .map_or(&[], |t| t.as_slice())
    }

    fn object(&self, id: ObjectId) -> Option<&TimelineObject> {
        self.objects.get(id.0).and_then(|o| o.as_ref())
    }

    fn object_at_point(&self, x: i32, y: i32) -> Option<ObjectId> {
        if x < self.layout.layer_area_width || y < self.layout.layer_area_top {
            return None;
        }
        let mapper = self.mapper();
        let layer = mapper.point_to_layer(y);
        let frame = mapper.point_to_frame(x);
        let table = self.layer_objects(layer);
        let exact = table
            .iter()
            .copied()
            .find(|&id| self.object(id).is_some_and(|o| o.begin <= frame && frame <= o.end));
        exact.or_else(|| {
            table.iter().copied().find(|&id| {
                self.object(id).is_some_and(|o| {
                    mapper.frame_to_point(o.begin) - HIT_TOLERANCE <= x
                        && x < mapper.frame_to_point(o.end + 1) + HIT_TOLERANCE
                })
            })
        })
    }
}

impl HostInterop for MemoryHost {
    fn is_editing(&self) -> bool {
        self.editing
    }

    fn window(&self) -> WindowId {
        self.window
    }

    fn current_scene(&self) -> i32 {
        self.scene
    }

    fn change_scene(&mut self, scene: i32) {
        self.scene = scene.clamp(0, NUM_SCENES - 1);
        self.drag_kind = DragKind::None;
        self.selection.clear();
    }

    fn current_frame(&self) -> i32 {
        self.frame
    }

    fn set_current_frame(&mut self, frame: i32) -> i32 {
        self.frame = frame.clamp(0, self.scene_len - 1);
        let modifiers = self.modifiers();
        self.frame_log.push((self.frame, modifiers));
        self.frame
    }

    fn tempo(&self) -> TempoInfo {
        self.tempo
    }

    fn view(&self) -> TimelineView {
        self.view
    }

    fn set_frame_scroll(&mut self, frame: i32) {
        self.view.frame_scroll = frame.clamp(0, self.scene_len);
    }

    fn set_layer_scroll(&mut self, layer: i32) {
        self.view.layer_scroll = layer.clamp(0, NUM_LAYERS - 1);
    }

    fn zoom_lengths(&self) -> &[i32] {
        &self.zoom_lengths
    }

    fn apply_zoom(&mut self, level: i32, zoom_len: i32, center_frame: i32) {
        let x = self.mapper().frame_to_point(center_frame);
        self.view.zoom_level = level.clamp(0, self.zoom_lengths.len() as i32 - 1);
        self.view.zoom_len = zoom_len.max(1);
        let dx = (x - self.layout.layer_area_width) as i64 * ZOOM_SCALE_DENOM;
        let frames = dx.div_euclid(self.view.zoom_len as i64) as i32;
        self.set_frame_scroll(center_frame - frames);
    }

    fn set_layer_height(&mut self, height: i32) {
        self.view.layer_height = height.clamp(MIN_LAYER_HEIGHT, MAX_LAYER_HEIGHT);
    }

    fn drag_threshold(&self) -> (i32, i32) {
        self.drag_threshold
    }

    fn layer_setting(&self, layer: i32) -> LayerSetting {
        usize::try_from(layer)
            .ok()
            .and_then(|l| self.layers.get(l))
            .cloned()
            .unwrap_or_default()
    }

    fn set_layer_setting(&mut self, layer: i32, setting: LayerSetting) {
        if let Some(slot) = usize::try_from(layer).ok().and_then(|l| self.layers.get_mut(l)) {
            *slot = setting;
        }
    }

    fn layer_command(&mut self, command: LayerCommand, layer: i32) -> bool {
        self.layer_commands.push((command, layer));
        true
    }

    fn set_object_frames(&mut self, id: ObjectId, begin: i32, end: i32) {
        let Some(obj) = self.object_mut(id) else {
            return;
        };
        obj.begin = begin;
        obj.end = end;
        let layer = obj.layer;
        self.sort_table(layer);
    }

    fn set_object_active(&mut self, id: ObjectId, active: bool) {
        if let Some(obj) = self.object_mut(id) {
            obj.active = active;
        }
    }

    fn set_object_layer(&mut self, id: ObjectId, layer: i32) {
        if let Some(obj) = self.object_mut(id) {
            obj.layer = layer;
        }
    }

    fn rebuild_tables(&mut self) {
        for table in &mut self.tables {
            table.clear();
        }
        for i in 0..self.objects.len() {
            let Some(layer) = self.objects[i].map(|o| o.layer) else {
                continue;
            };
            if let Some(table) = self.table_mut(layer) {
                table.push(ObjectId(i));
            }
        }
        for layer in 0..NUM_LAYERS {
            self.sort_table(layer);
        }
    }

    fn find_nearby_frame(&self, frame: i32, layer: i32) -> i32 {
        let edges = self
            .layer_objects(layer)
            .iter()
            .filter_map(|&id| self.object(id))
            .flat_map(|o| [o.begin, o.end + 1]);
        std::iter::once(self.frame)
            .chain(edges)
            .min_by_key(|f| (f - frame).abs())
            .unwrap_or(frame)
    }

    fn add_midpoint(&mut self, id: ObjectId, frame: i32) -> Option<ObjectId> {
        let obj = *self.object(id)?;
        if !(obj.begin < frame && frame <= obj.end) {
            return None;
        }
        let leader = obj.leader.unwrap_or(id);
        let added = self.push_object(TimelineObject {
            begin: frame,
            end: obj.end,
            layer: obj.layer,
            active: obj.active,
            leader: Some(leader),
            next: obj.next,
        });
        let obj = self.object_mut(id)?;
        obj.end = frame - 1;
        obj.leader = Some(leader);
        obj.next = Some(added);
        Some(added)
    }

    fn delete_midpoint(&mut self, id: ObjectId, frame: i32) -> Option<ObjectId> {
        let obj = *self.object(id)?;
        let leader = obj.leader?;
        if obj.begin != frame || leader == id {
            return None;
        }
        let mut prev = leader;
        while let Some(next) = self.object(prev)?.next {
            if next == id {
                break;
            }
            prev = next;
        }
        {
            let p = self.object_mut(prev)?;
            p.end = obj.end;
            p.next = obj.next;
        }
        self.objects[id.0] = None;
        if let Some(table) = self.table_mut(obj.layer) {
            table.retain(|&o| o != id);
        }
        if self.object(leader).is_some_and(|l| l.next.is_none())
            && let Some(l) = self.object_mut(leader)
        {
            l.leader = None;
        }
        if self.dialog == Some(id) {
            self.dialog = Some(prev);
        }
        Some(id)
    }

    fn selection(&self) -> BTreeSet<ObjectId> {
        self.selection.clone()
    }

    fn set_selection(&mut self, selection: BTreeSet<ObjectId>) {
        self.selection = selection;
    }

    fn selection_origin(&self) -> Option<ObjectId> {
        self.selection_origin
    }

    fn set_selection_origin(&mut self, origin: Option<ObjectId>) {
        self.selection_origin = origin;
    }

    fn dialog_object(&self) -> Option<ObjectId> {
        self.dialog
    }

    fn set_dialog_object(&mut self, id: Option<ObjectId>) {
        self.dialog = id;
    }

    fn refresh_dialog(&mut self) {
        self.dialog_refreshes += 1;
    }

    fn begin_range_selection(&mut self, point: Point) {
        self.drag.anchor = point;
        self.drag.range_end = point;
        self.capture = true;
    }

    fn next_undo(&mut self) {
        self.undo_id += 1;
    }

    fn undo_id(&self) -> u32 {
        self.undo_id
    }

    fn record_undo(&mut self, target: UndoTarget) {
        self.undo_log.push((self.undo_id, target));
    }

    fn drag_kind(&self) -> DragKind {
        self.drag_kind
    }

    fn set_drag_kind(&mut self, kind: DragKind) {
        self.drag_kind = kind;
    }

    fn dispatch_synthetic(&mut self, message: SyntheticMessage) -> bool {
        self.dispatched.push(DispatchRecord {
            message,
            ctrl: self.key_state(Key::Ctrl),
            shift: self.key_state(Key::Shift),
            alt: self.key_state(Key::Alt),
        });
        match message.kind {
            MessageKind::ButtonDown(MouseButton::Left) => self.on_button_down(message),
            MessageKind::Move => self.on_move(message.point),
            MessageKind::ButtonUp(MouseButton::Left) => self.on_button_up(),
            MessageKind::KeyUp(Key::Ctrl) => self.on_ctrl_up(),
            MessageKind::Wheel(delta) => self.on_wheel(delta),
            MessageKind::DoubleClick(MouseButton::Left) => {
                let p = message.point;
                if let Some(id) = self.object_at_point(p.x, p.y) {
                    self.dialog = Some(id);
                }
            }
            _ => {}
        }
        true
    }

    fn key_state(&self, key: Key) -> bool {
        self.keys.contains(&key)
    }

    fn set_key_state(&mut self, key: Key, down: bool) {
        if down {
            self.keys.insert(key);
        } else {
            self.keys.remove(&key);
        }
    }

    fn cursor_pos(&self) -> Point {
        self.cursor_pos
    }

    fn set_capture(&mut self) {
        self.capture = true;
    }

    fn release_capture(&mut self) {
        self.capture = false;
    }

    fn has_capture(&self) -> bool {
        self.capture
    }

    fn set_cursor(&mut self, shape: CursorShape) {
        self.cursor = shape;
    }

    fn invalidate(&mut self) {
        self.invalidations += 1;
    }

    fn now_ms(&self) -> u64 {
        self.now_ms
    }

    fn set_timer(&mut self, delay_ms: u32) {
        self.timer = Some(delay_ms);
    }

    fn kill_timer(&mut self) {
        self.timer = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::buttons::Buttons;

    fn obj(begin: i32, end: i32, layer: i32) -> TimelineObject {
        TimelineObject {
            begin,
            end,
            layer,
            active: true,
            leader: None,
            next: None,
        }
    }

    fn left(kind: MessageKind, x: i32, y: i32, modifiers: Modifiers) -> SyntheticMessage {
        SyntheticMessage::new(kind, Point::new(x, y), Buttons::LEFT, modifiers)
    }

    #[test]
    fn tables_stay_sorted() {
        let mut host = MemoryHost::new(1000);
        let b = host.push_object(obj(200, 299, 0));
        let a = host.push_object(obj(0, 99, 0));
        assert_eq!(host.layer_objects(0), &[a, b]);
        host.set_object_frames(a, 400, 499);
        assert_eq!(host.layer_objects(0), &[b, a]);
        assert!(host.layer_objects(-1).is_empty());
        assert!(host.layer_objects(NUM_LAYERS).is_empty());
    }

    #[test]
    fn object_moves_abort_on_ctrl_release() {
        let mut host = MemoryHost::new(1000);
        let a = host.push_object(obj(100, 199, 0));
        let y = 50;
        host.dispatch_synthetic(left(MessageKind::ButtonDown(MouseButton::Left), 64 + 150, y, Modifiers::NONE));
        assert_eq!(host.drag_kind(), DragKind::MoveObject);
        host.dispatch_synthetic(left(MessageKind::Move, 64 + 180, y, Modifiers::NONE));
        assert_eq!(host.object(a).map(|o| o.begin), Some(130));
        host.dispatch_synthetic(SyntheticMessage::key_up(Key::Ctrl));
        assert_eq!(host.object(a).map(|o| o.begin), Some(100));
        assert_eq!(host.drag_kind(), DragKind::None);
    }

    #[test]
    fn shift_near_edge_resizes() {
        let mut host = MemoryHost::new(1000);
        let a = host.push_object(obj(100, 199, 0));
        host.dispatch_synthetic(left(MessageKind::ButtonDown(MouseButton::Left), 64 + 198, 50, Modifiers::SHIFT));
        assert_eq!(host.drag_kind(), DragKind::MoveObjectRight);
        host.dispatch_synthetic(left(MessageKind::Move, 64 + 250, 50, Modifiers::SHIFT));
        assert_eq!(host.object(a).map(|o| (o.begin, o.end)), Some((100, 251)));
    }

    #[test]
    fn blank_press_moves_frame_and_ctrl_starts_range() {
        let mut host = MemoryHost::new(1000);
        host.dispatch_synthetic(left(MessageKind::ButtonDown(MouseButton::Left), 64 + 40, 300, Modifiers::NONE));
        assert_eq!(host.drag_kind(), DragKind::MoveFrame);
        assert_eq!(host.current_frame(), 40);
        host.dispatch_synthetic(left(MessageKind::ButtonUp(MouseButton::Left), 64 + 40, 300, Modifiers::NONE));

        let a = host.push_object(obj(100, 199, 1));
        host.dispatch_synthetic(left(MessageKind::ButtonDown(MouseButton::Left), 64 + 50, 45, Modifiers::CTRL));
        assert_eq!(host.drag_kind(), DragKind::RangeSelect);
        host.dispatch_synthetic(left(MessageKind::Move, 64 + 150, 42 + 40, Modifiers::CTRL));
        host.dispatch_synthetic(left(MessageKind::ButtonUp(MouseButton::Left), 64 + 150, 42 + 40, Modifiers::CTRL));
        assert_eq!(host.selection(), BTreeSet::from([a]));
    }

    #[test]
    fn midpoints_split_and_merge() {
        let mut host = MemoryHost::new(1000);
        let a = host.push_object(obj(0, 99, 0));
        let b = host.add_midpoint(a, 40).unwrap();
        let c = host.add_midpoint(b, 70).unwrap();
        assert_eq!(host.layer_objects(0), &[a, b, c]);
        assert_eq!(host.object(c).and_then(|o| o.leader), Some(a));
        assert_eq!(host.add_midpoint(a, 0), None);

        assert_eq!(host.delete_midpoint(b, 40), Some(b));
        assert_eq!(host.object(a).map(|o| (o.end, o.next)), Some((69, Some(c))));
        assert_eq!(host.delete_midpoint(a, 0), None);
        host.delete_midpoint(c, 70);
        assert_eq!(host.object(a).copied(), Some(obj(0, 99, 0)));
        assert_eq!(host.layer_objects(0), &[a]);
    }

    #[test]
    fn zoom_keeps_center_pixel() {
        let mut host = MemoryHost::new(10_000);
        host.set_frame_scroll(1_000);
        let x = host.mapper().frame_to_point(1_200);
        host.apply_zoom(24, DEFAULT_ZOOM_LENGTHS[24], 1_200);
        assert_eq!(host.view().zoom_level, 24);
        assert_eq!(host.mapper().point_to_frame(x), 1_200);
    }
}
