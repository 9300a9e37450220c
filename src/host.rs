//! Boundary to the host editor.
//!
//! The host owns every piece of timeline data. The interaction core reads and
//! writes it only through [`ObjectStore`] and [`HostInterop`], and replays
//! input into the host's own window procedure with
//! [`HostInterop::dispatch_synthetic`] while [`ForcedKeys`] pins the keyboard
//! state the host observes.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::BTreeSet;
use std::ops::{Deref, DerefMut};

use crate::grid::TempoInfo;
use crate::input::buttons::{Buttons, Modifiers, MouseButton};
use crate::timeline::TimelineView;

/// Index of an object in the host's object array
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObjectId(pub usize);

/// Client-area pixel coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct WindowId(pub u64);

/// One timeline object, possibly a segment of a mid-point chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineObject {
    /// First frame, inclusive.
    pub begin: i32,
    /// Last frame, inclusive.
    pub end: i32,
    pub layer: i32,
    /// Active flag of the first filter. Only the chain leader's flag counts.
    pub active: bool,
    /// First segment of the chain, `None` for objects without mid-points.
    pub leader: Option<ObjectId>,
    /// Following segment of the chain.
    pub next: Option<ObjectId>,
}

bitflags::bitflags! {
    /// Layer flag bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct LayerFlags: u8 {
        const HIDDEN = 0x01;
        const LOCKED = 0x02;
        const COORD_LINK = 0x10;
        const CLIP = 0x20;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LayerSetting {
    pub flags: LayerFlags,
    pub name: Option<String>,
}

impl LayerSetting {
    pub fn is_visible(&self) -> bool {
        !self.flags.contains(LayerFlags::HIDDEN)
    }

    pub fn is_locked(&self) -> bool {
        self.flags.contains(LayerFlags::LOCKED)
    }
}

/// The host's own notion of the drag it is performing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DragKind {
    #[default]
    None,
    MoveObject,
    MoveObjectLeft,
    MoveObjectRight,
    MoveFrame,
    Scroll,
    RangeSelect,
    Other,
}

impl DragKind {
    pub fn moves_objects(self) -> bool {
        matches!(
            self,
            DragKind::MoveObject | DragKind::MoveObjectLeft | DragKind::MoveObjectRight
        )
    }
}

/// What an undo record covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UndoTarget {
    /// Filter status flags of an object.
    ObjectStatus(ObjectId),
    /// Frames and layer of an object.
    ObjectPlacement(ObjectId),
    /// Layer setting of a layer.
    Layer(i32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Ctrl,
    Shift,
    Alt,
    Escape,
    Other(u32),
}

/// Key message seen by the timeline window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyEvent {
    pub key: Key,
    pub down: bool,
    /// Auto-repeat of a held key.
    #[serde(default)]
    pub repeat: bool,
}

/// Forced state for one key while a synthetic message is dispatched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyMap {
    Identity,
    Off,
    On,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyOverride {
    pub key: Key,
    pub map: KeyMap,
}

impl KeyOverride {
    pub const fn on(key: Key) -> Self {
        Self { key, map: KeyMap::On }
    }

    pub const fn off(key: Key) -> Self {
        Self { key, map: KeyMap::Off }
    }

    pub const fn when(key: Key, on: bool) -> Self {
        Self {
            key,
            map: if on { KeyMap::On } else { KeyMap::Off },
        }
    }

    /// Forces the key off when `suppress`, leaves it alone otherwise.
    pub const fn suppress(key: Key, suppress: bool) -> Self {
        Self {
            key,
            map: if suppress { KeyMap::Off } else { KeyMap::Identity },
        }
    }
}

/// Common override sets
pub mod keys {
    use super::{Key, KeyOverride};

    pub const PLAIN: [KeyOverride; 3] = [
        KeyOverride::off(Key::Ctrl),
        KeyOverride::off(Key::Shift),
        KeyOverride::off(Key::Alt),
    ];
    pub const CTRL: [KeyOverride; 3] = [
        KeyOverride::on(Key::Ctrl),
        KeyOverride::off(Key::Shift),
        KeyOverride::off(Key::Alt),
    ];
    pub const SHIFT: [KeyOverride; 3] = [
        KeyOverride::off(Key::Ctrl),
        KeyOverride::on(Key::Shift),
        KeyOverride::off(Key::Alt),
    ];
    pub const ALT: [KeyOverride; 3] = [
        KeyOverride::off(Key::Ctrl),
        KeyOverride::off(Key::Shift),
        KeyOverride::on(Key::Alt),
    ];
    pub const CTRL_SHIFT: [KeyOverride; 3] = [
        KeyOverride::on(Key::Ctrl),
        KeyOverride::on(Key::Shift),
        KeyOverride::off(Key::Alt),
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageKind {
    ButtonDown(MouseButton),
    ButtonUp(MouseButton),
    DoubleClick(MouseButton),
    Move,
    Wheel(i32),
    KeyUp(Key),
}

/// Input message replayed into the host's window procedure.
///
/// `modifiers` carries the ctrl/shift flags the message reports; the host
/// reads alt from the live key state, as it does for real input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SyntheticMessage {
    pub kind: MessageKind,
    pub point: Point,
    pub buttons: Buttons,
    pub modifiers: Modifiers,
}

impl SyntheticMessage {
    pub fn new(kind: MessageKind, point: Point, buttons: Buttons, modifiers: Modifiers) -> Self {
        Self {
            kind,
            point,
            buttons,
            modifiers,
        }
    }

    pub fn key_up(key: Key) -> Self {
        Self::new(MessageKind::KeyUp(key), Point::default(), Buttons::empty(), Modifiers::NONE)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CursorShape {
    Arrow,
    SizeAll,
    SizeNs,
    Cross,
    UpArrow,
}

/// Layer menu commands of the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LayerCommand {
    Rename,
    ToggleOthers,
    Insert,
    Remove,
}

/// Read-only access to the object tables of the current scene.
pub trait ObjectStore {
    fn scene_len(&self) -> i32;

    /// Objects on `layer`, sorted by begin frame. Out-of-range layers are empty.
    fn layer_objects(&self, layer: i32) -> &[ObjectId];

    fn object(&self, id: ObjectId) -> Option<&TimelineObject>;

    /// Host hit test with its own small tolerance around object edges.
    fn object_at_point(&self, x: i32, y: i32) -> Option<ObjectId>;
}

/// Everything else the interaction core reads from or does to the host.
pub trait HostInterop: ObjectStore {
    // ===== Session =====
    fn is_editing(&self) -> bool;
    fn window(&self) -> WindowId;
    fn current_scene(&self) -> i32;
    fn change_scene(&mut self, scene: i32);
    fn current_frame(&self) -> i32;
    /// Moves the current frame; returns the frame the host settled on.
    fn set_current_frame(&mut self, frame: i32) -> i32;
    fn tempo(&self) -> TempoInfo;

    // ===== View =====
    fn view(&self) -> TimelineView;
    fn set_frame_scroll(&mut self, frame: i32);
    fn set_layer_scroll(&mut self, layer: i32);
    fn zoom_lengths(&self) -> &[i32];
    /// Applies `zoom_len` under `level`, keeping `center_frame` at the same
    /// client x coordinate.
    fn apply_zoom(&mut self, level: i32, zoom_len: i32, center_frame: i32);
    fn set_layer_height(&mut self, height: i32);
    /// System drag threshold in pixels.
    fn drag_threshold(&self) -> (i32, i32);

    // ===== Layers =====
    fn layer_setting(&self, layer: i32) -> LayerSetting;
    fn set_layer_setting(&mut self, layer: i32, setting: LayerSetting);
    fn layer_command(&mut self, command: LayerCommand, layer: i32) -> bool;

    // ===== Objects =====
    fn set_object_frames(&mut self, id: ObjectId, begin: i32, end: i32);
    fn set_object_active(&mut self, id: ObjectId, active: bool);
    fn set_object_layer(&mut self, id: ObjectId, layer: i32);
    /// Re-sorts the per-layer tables after placement changes.
    fn rebuild_tables(&mut self);
    /// Nearest frame of interest the host snaps to around `frame`.
    fn find_nearby_frame(&self, frame: i32, layer: i32) -> i32;
    /// Splits `id` at `frame`; returns the new segment.
    fn add_midpoint(&mut self, id: ObjectId, frame: i32) -> Option<ObjectId>;
    /// Removes the mid-point at `frame` starting `id`; returns the removed segment.
    fn delete_midpoint(&mut self, id: ObjectId, frame: i32) -> Option<ObjectId>;

    // ===== Selection =====
    fn selection(&self) -> BTreeSet<ObjectId>;
    fn set_selection(&mut self, selection: BTreeSet<ObjectId>);
    fn selection_origin(&self) -> Option<ObjectId>;
    fn set_selection_origin(&mut self, origin: Option<ObjectId>);
    fn dialog_object(&self) -> Option<ObjectId>;
    fn set_dialog_object(&mut self, id: Option<ObjectId>);
    fn refresh_dialog(&mut self);
    fn begin_range_selection(&mut self, point: Point);

    // ===== Undo =====
    fn next_undo(&mut self);
    fn undo_id(&self) -> u32;
    fn record_undo(&mut self, target: UndoTarget);

    // ===== Host drag and input =====
    fn drag_kind(&self) -> DragKind;
    fn set_drag_kind(&mut self, kind: DragKind);
    /// Runs `message` through the host's window procedure; `true` if consumed.
    fn dispatch_synthetic(&mut self, message: SyntheticMessage) -> bool;
    fn key_state(&self, key: Key) -> bool;
    fn set_key_state(&mut self, key: Key, down: bool);
    fn cursor_pos(&self) -> Point;
    fn set_capture(&mut self);
    fn release_capture(&mut self);
    fn has_capture(&self) -> bool;
    fn set_cursor(&mut self, shape: CursorShape);
    fn invalidate(&mut self);

    // ===== Timer =====
    fn now_ms(&self) -> u64;
    fn set_timer(&mut self, delay_ms: u32);
    fn kill_timer(&mut self);

    /// Live modifier state.
    fn modifiers(&self) -> Modifiers {
        Modifiers::new(
            self.key_state(Key::Ctrl),
            self.key_state(Key::Shift),
            self.key_state(Key::Alt),
        )
    }
}

/// Holds key overrides on a host and restores the previous states on drop.
pub struct ForcedKeys<'h, H: HostInterop + ?Sized> {
    host: &'h mut H,
    saved: SmallVec<[(Key, bool); 3]>,
}

impl<'h, H: HostInterop + ?Sized> ForcedKeys<'h, H> {
    pub fn new(host: &'h mut H, overrides: &[KeyOverride]) -> Self {
        let mut saved = SmallVec::new();
        for o in overrides {
            let forced = match o.map {
                KeyMap::Identity => continue,
                KeyMap::Off => false,
                KeyMap::On => true,
            };
            saved.push((o.key, host.key_state(o.key)));
            host.set_key_state(o.key, forced);
        }
        Self { host, saved }
    }
}

impl<H: HostInterop + ?Sized> Deref for ForcedKeys<'_, H> {
    type Target = H;
    fn deref(&self) -> &H {
        self.host
    }
}

impl<H: HostInterop + ?Sized> DerefMut for ForcedKeys<'_, H> {
    fn deref_mut(&mut self) -> &mut H {
        self.host
    }
}

impl<H: HostInterop + ?Sized> Drop for ForcedKeys<'_, H> {
    fn drop(&mut self) {
        while let Some((key, state)) = self.saved.pop() {
            self.host.set_key_state(key, state);
        }
    }
}

/// Dispatches `message` to the host with `overrides` held for the duration.
pub fn forward<H: HostInterop + ?Sized>(
    host: &mut H,
    message: SyntheticMessage,
    overrides: &[KeyOverride],
) -> bool {
    let mut keys = ForcedKeys::new(host, overrides);
    keys.dispatch_synthetic(message)
}
