//! Two-axis zoom drag and the refined horizontal zoom model it uses.

use crate::constants::{MAX_LAYER_HEIGHT, MIN_LAYER_HEIGHT, ZOOM_SCALE_DENOM};
use crate::handlers::{Down, DragHandler, HandlerKind};
use crate::host::{CursorShape, HostInterop};
use crate::input::actions::ZoomCenter;
use crate::input::drag::DragCtx;
use crate::timeline::{Mapper, TimelineView};

/// Frame the horizontal zoom pivots around.
pub fn zoom_center_frame(host: &dyn HostInterop, mapper: &Mapper, center: ZoomCenter, x: i32) -> i32 {
    let view = &mapper.view;
    let width = mapper.object_area_right() - mapper.layout.layer_area_width;
    let width_frames =
        (width.max(0) as i64 * ZOOM_SCALE_DENOM / view.zoom_len.max(1) as i64) as i32;
    match center {
        ZoomCenter::CurrFrame => host.current_frame(),
        ZoomCenter::WindowLeft => view.frame_scroll,
        ZoomCenter::WindowCenter => view.frame_scroll + width_frames / 2,
        ZoomCenter::WindowRight => {
            (view.frame_scroll + width_frames - mapper.horiz_scroll_margin()).max(0)
        }
        ZoomCenter::Mouse => mapper.point_to_frame(x),
    }
}

/// Zoom levels split into `divs` sub-steps each.
///
/// A refined level `m * divs + f` sits `f / divs` of the way from the zoom
/// length of level `m` to that of level `m + 1`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SmoothZoom {
    center_frame: i32,
    center_point: i32,
}

impl SmoothZoom {
    /// Remembers where `frame` is drawn so later rescaling can put it back.
    pub fn pivot(mapper: &Mapper, frame: i32) -> Self {
        Self {
            center_frame: frame,
            center_point: mapper.frame_to_point(frame),
        }
    }

    /// Refined level closest to the current zoom length.
    pub fn level(host: &dyn HostInterop, divs: i32) -> i32 {
        let lengths = host.zoom_lengths();
        let Some(last) = lengths.len().checked_sub(1) else {
            return 0;
        };
        let len = host.view().zoom_len;

        // largest level whose length does not exceed `len`
        let m = lengths[1..].partition_point(|&l| len >= l);
        if m >= last {
            return divs * last as i32;
        }
        let dlen = lengths[m + 1] - lengths[m];
        let dlev = ((len - lengths[m]) * divs + (dlen >> 1)) / dlen.max(1);
        m as i32 * divs + dlev.clamp(0, divs)
    }

    /// Applies refined `level`, keeping the pivot frame under its pixel.
    pub fn apply(&self, host: &mut dyn HostInterop, mapper: &Mapper, level: i32, divs: i32) {
        let lengths = host.zoom_lengths();
        let Some(last) = lengths.len().checked_sub(1) else {
            return;
        };
        let divs = divs.max(1);
        let (m, len) = if level <= 0 {
            (0, lengths[0])
        } else if level >= divs * last as i32 {
            (last, lengths[last])
        } else {
            let m = (level / divs) as usize;
            let f = level % divs;
            let dlen = lengths[m + 1] - lengths[m];
            let len = lengths[m] + dlen * f / divs;
            // report the nearest discrete level
            (if 2 * f >= divs { m + 1 } else { m }, len)
        };
        if mapper.view.zoom_len == len {
            return;
        }

        // Rescaling rounds; scroll back so the pivot stays put.
        let drift = self.center_frame - mapper.point_to_frame(self.center_point);
        host.set_frame_scroll(mapper.view.frame_scroll + drift);
        host.apply_zoom(m as i32, len, self.center_frame);
    }
}

/// Zooms horizontally with x movement and changes layer height with y movement
#[derive(Debug, Clone, Copy, Default)]
pub struct ZoomDrag {
    prev_view: TimelineView,
    prev_level: i32,
    prev_scene: Option<i32>,
    zoom: SmoothZoom,
}

impl DragHandler for ZoomDrag {
    fn kind(&self) -> HandlerKind {
        HandlerKind::ZoomBi
    }

    fn can_continue(&self, cx: &DragCtx<'_>) -> bool {
        self.prev_scene.is_none_or(|s| s == cx.host.current_scene())
    }

    fn on_down(&mut self, cx: &mut DragCtx<'_>) -> Down {
        let tl = &cx.settings.timeline;
        let mapper = cx.mapper();
        self.prev_view = mapper.view;
        self.prev_level = SmoothZoom::level(&*cx.host, tl.zoom_drag_refine_x);
        let center = zoom_center_frame(&*cx.host, &mapper, tl.zoom_center_drag, cx.points.start.x);
        self.zoom = SmoothZoom::pivot(&mapper, center);
        self.prev_scene = Some(cx.host.current_scene());

        cx.host.set_capture();
        cx.host.set_cursor(CursorShape::Cross);
        Down::Done(false)
    }

    fn on_move(&mut self, cx: &mut DragCtx<'_>) -> bool {
        let tl = &cx.settings.timeline;
        let (start, curr) = (cx.points.start, cx.points.curr);
        let delta_h = if tl.zoom_drag_length_x == 0 {
            0
        } else {
            (curr.x - start.x) * tl.zoom_drag_refine_x / tl.zoom_drag_length_x
        };
        let delta_v = if tl.zoom_drag_length_y == 0 {
            0
        } else {
            (curr.y - start.y) / tl.zoom_drag_length_y
        };

        // layer height first, the horizontal pivot does not depend on it
        let height =
            (self.prev_view.layer_height + delta_v).clamp(MIN_LAYER_HEIGHT, MAX_LAYER_HEIGHT);
        if height != cx.host.view().layer_height {
            cx.host.set_layer_height(height);
        }
        let mapper = cx.mapper();
        self.zoom
            .apply(&mut *cx.host, &mapper, self.prev_level + delta_h, tl.zoom_drag_refine_x);
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
        if self.prev_scene == Some(cx.host.current_scene()) {
            let prev = self.prev_view;
            cx.host.set_layer_height(prev.layer_height);
            if cx.host.view().zoom_len != prev.zoom_len {
                cx.host
                    .apply_zoom(prev.zoom_level, prev.zoom_len, prev.frame_scroll);
            }
            cx.host.set_frame_scroll(prev.frame_scroll);
        }
        false
    }
}
