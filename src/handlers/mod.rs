//! Drag, click and wheel behaviours.
//!
//! Drags implement [`DragHandler`] and live in the closed [`Handler`] sum
//! type the drag machine owns. Clicks and wheels are plain functions picked
//! by the dispatcher.

pub mod clicks;
pub mod layers;
pub mod objects;
pub mod snap;
pub mod wheels;
pub mod zoom;

#[cfg(test)]
mod rig;

use enum_dispatch::enum_dispatch;

use crate::constants::PLACEHOLDER_TOLERANCE;
use crate::host::{KeyEvent, LayerFlags};
use crate::input::drag::DragCtx;

pub use layers::{LayerFlagDrag, LayerMoveDrag, LayerSelectDrag};
pub use objects::{AltDrag, BackgroundCtrlDrag, BackgroundDrag, ObjectDrag, ObjectMode, PlainDrag};
pub use snap::{SnapDrag, SnapTarget};
pub use zoom::ZoomDrag;

/// Result of a drag's button-down hook
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Down {
    /// Started; the flag asks for a redraw of the main window.
    Done(bool),
    /// Hand the drag over to another handler before it starts.
    Fallback(HandlerKind),
}

#[enum_dispatch]
pub trait DragHandler {
    fn kind(&self) -> HandlerKind;

    fn on_down(&mut self, cx: &mut DragCtx<'_>) -> Down;

    /// Runs once the drag has left its tolerance box.
    fn on_move(&mut self, cx: &mut DragCtx<'_>) -> bool;

    fn on_up(&mut self, cx: &mut DragCtx<'_>) -> bool;

    /// Must restore everything the drag has changed so far.
    fn on_cancel(&mut self, cx: &mut DragCtx<'_>, release: bool) -> bool;

    fn can_continue(&self, _cx: &DragCtx<'_>) -> bool {
        true
    }

    /// Key message while this drag is active; `true` keeps it from the host.
    fn handle_key(&mut self, _cx: &mut DragCtx<'_>, _key: KeyEvent) -> bool {
        false
    }

    /// Pixels the pointer may travel before a press becomes a drag.
    fn tolerance(&self, cx: &DragCtx<'_>) -> (i32, i32) {
        cx.host.drag_threshold()
    }
}

#[enum_dispatch(DragHandler)]
pub enum Handler {
    NoAction,
    PlainDrag,
    ObjectDrag,
    BackgroundDrag,
    BackgroundCtrlDrag,
    AltDrag,
    ZoomDrag,
    SnapDrag,
    LayerFlagDrag,
    LayerSelectDrag,
    LayerMoveDrag,
}

/// Identity of a drag behaviour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandlerKind {
    NoAction,
    Plain,
    Object(ObjectMode),
    Background,
    BackgroundCtrl,
    Alt,
    ZoomBi,
    StepBound,
    StepBpm,
    ShowHide,
    LockUnlock,
    LinkCoord,
    MaskAbove,
    LayerSelectAll,
    LayerDragMove,
}

impl HandlerKind {
    pub fn create(self) -> Handler {
        match self {
            HandlerKind::NoAction => NoAction.into(),
            HandlerKind::Plain => PlainDrag::default().into(),
            HandlerKind::Object(mode) => ObjectDrag::new(mode).into(),
            HandlerKind::Background => BackgroundDrag::default().into(),
            HandlerKind::BackgroundCtrl => BackgroundCtrlDrag::default().into(),
            HandlerKind::Alt => AltDrag::default().into(),
            HandlerKind::ZoomBi => ZoomDrag::default().into(),
            HandlerKind::StepBound => SnapDrag::new(SnapTarget::Boundary).into(),
            HandlerKind::StepBpm => SnapDrag::new(SnapTarget::Bpm).into(),
            HandlerKind::ShowHide => LayerFlagDrag::new(LayerFlags::HIDDEN).into(),
            HandlerKind::LockUnlock => LayerFlagDrag::new(LayerFlags::LOCKED).into(),
            HandlerKind::LinkCoord => LayerFlagDrag::new(LayerFlags::COORD_LINK).into(),
            HandlerKind::MaskAbove => LayerFlagDrag::new(LayerFlags::CLIP).into(),
            HandlerKind::LayerSelectAll => LayerSelectDrag::default().into(),
            HandlerKind::LayerDragMove => LayerMoveDrag::default().into(),
        }
    }
}

/// Placeholder drag: holds the capture and swallows input until release.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAction;

impl DragHandler for NoAction {
    fn kind(&self) -> HandlerKind {
        HandlerKind::NoAction
    }

    fn on_down(&mut self, cx: &mut DragCtx<'_>) -> Down {
        cx.host.set_capture();
        Down::Done(false)
    }

    fn on_move(&mut self, _cx: &mut DragCtx<'_>) -> bool {
        false
    }

    fn on_up(&mut self, cx: &mut DragCtx<'_>) -> bool {
        cx.host.release_capture();
        false
    }

    fn on_cancel(&mut self, cx: &mut DragCtx<'_>, release: bool) -> bool {
        if release {
            cx.host.release_capture();
        }
        false
    }

    fn tolerance(&self, _cx: &DragCtx<'_>) -> (i32, i32) {
        (PLACEHOLDER_TOLERANCE, PLACEHOLDER_TOLERANCE)
    }
}
