use crate::constants::SNAP_THRESHOLD;
use crate::grid::BpmGrid;
use crate::handlers::{Down, DragHandler, HandlerKind};
use crate::host::CursorShape;
use crate::input::drag::DragCtx;
use crate::navigation;
use crate::timeline::ObjectSearch;

/// What the current frame snaps to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SnapTarget {
    /// Object and mid-point boundaries on the pointed layer.
    Boundary,
    /// Lines of the BPM grid picked by the held modifiers.
    Bpm,
}

/// Moves the current frame to the nearest snap point under the pointer
#[derive(Debug, Clone, Copy)]
pub struct SnapDrag {
    target: SnapTarget,
    prev_frame: i32,
}

impl SnapDrag {
    pub fn new(target: SnapTarget) -> Self {
        Self {
            target,
            prev_frame: 0,
        }
    }

    /// Snap points enclosing the pointer, or `None` when there is no grid.
    fn interval(&self, cx: &DragCtx<'_>) -> Option<(i32, i32)> {
        let mapper = cx.mapper();
        let curr = cx.points.curr;
        let frame = mapper.point_to_frame(curr.x);
        match self.target {
            SnapTarget::Boundary => {
                let tl = &cx.settings.timeline;
                let layer = mapper.point_to_layer(curr.y);
                let (l, r) = ObjectSearch::new(&*cx.host, layer)
                    .skip_midpoints(tl.skip_midpoints(cx.modifiers))
                    .skip_inactives(tl.skip_inactives(cx.modifiers))
                    .find_interval(frame);
                Some((l, r.resolve(cx.host.scene_len())))
            }
            SnapTarget::Bpm => {
                let step = cx.settings.timeline.bpm.get(cx.modifiers);
                let grid = BpmGrid::new(&cx.host.tempo(), step.division())?;
                Some(grid.lines_around(frame))
            }
        }
    }

    fn snap(&self, cx: &mut DragCtx<'_>) -> bool {
        let Some((l, r)) = self.interval(cx) else {
            return false;
        };
        let mapper = cx.mapper();
        let x = cx.points.curr.x;
        let (l_x, r_x) = (mapper.frame_to_point(l), mapper.frame_to_point(r));
        let (dest, dist) = if 2 * x <= l_x + r_x {
            (l, x - l_x)
        } else {
            (r, r_x - x)
        };
        dist <= SNAP_THRESHOLD
            && dest != cx.host.current_frame()
            && navigation::move_frame(&mut *cx.host, &cx.settings.walk, dest)
    }
}

impl DragHandler for SnapDrag {
    fn kind(&self) -> HandlerKind {
        match self.target {
            SnapTarget::Boundary => HandlerKind::StepBound,
            SnapTarget::Bpm => HandlerKind::StepBpm,
        }
    }

    fn on_down(&mut self, cx: &mut DragCtx<'_>) -> Down {
        self.prev_frame = cx.host.current_frame();
        cx.host.set_capture();
        cx.host.set_cursor(CursorShape::UpArrow);
        Down::Done(self.snap(cx))
    }

    fn on_move(&mut self, cx: &mut DragCtx<'_>) -> bool {
        self.snap(cx)
    }

    fn on_up(&mut self, cx: &mut DragCtx<'_>) -> bool {
        cx.host.release_capture();
        false
    }

    fn on_cancel(&mut self, cx: &mut DragCtx<'_>, release: bool) -> bool {
        if release {
            cx.host.release_capture();
        }
        navigation::move_frame(&mut *cx.host, &cx.settings.walk, self.prev_frame)
    }
}
