//! Pixel <-> timeline mapping and region classification.

pub mod search;

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::host::{ObjectId, ObjectStore};

pub use search::{Boundary, ObjectSearch};

/// Pixel layout of the host's timeline window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineLayout {
    /// Bottom of the scene button strip.
    pub zoom_gauge_top: i32,
    /// Top of the first layer row, bottom of the ruler.
    pub layer_area_top: i32,
    /// Width of the layer header column.
    pub layer_area_width: i32,
    pub scrollbar_thickness: i32,
}

impl Default for TimelineLayout {
    fn default() -> Self {
        Self {
            zoom_gauge_top: ZOOM_GAUGE_TOP,
            layer_area_top: LAYER_AREA_TOP,
            layer_area_width: LAYER_AREA_WIDTH,
            scrollbar_thickness: SCROLLBAR_THICKNESS,
        }
    }
}

/// Snapshot of the host's scroll, zoom and window size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineView {
    /// Frame at the left edge of the object area.
    pub frame_scroll: i32,
    /// Layer at the top of the layer area.
    pub layer_scroll: i32,
    pub zoom_level: i32,
    /// Pixels per frame times `ZOOM_SCALE_DENOM`.
    pub zoom_len: i32,
    pub layer_height: i32,
    pub client_width: i32,
    pub client_height: i32,
}

impl Default for TimelineView {
    fn default() -> Self {
        Self {
            frame_scroll: 0,
            layer_scroll: 0,
            zoom_level: 20,
            zoom_len: DEFAULT_ZOOM_LENGTHS[20],
            layer_height: DEFAULT_LAYER_HEIGHT,
            client_width: 1024,
            client_height: 600,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Region {
    Object,
    Blank,
    Ruler,
    Layer,
    ZoomGauge,
    SceneButton,
    HScrollbar,
    VScrollbar,
}

impl Region {
    pub fn name(&self) -> &'static str {
        match self {
            Region::Object => "Object",
            Region::Blank => "Blank",
            Region::Ruler => "Ruler",
            Region::Layer => "Layer",
            Region::ZoomGauge => "Zoom Gauge",
            Region::SceneButton => "Scene Button",
            Region::HScrollbar => "Horizontal Scrollbar",
            Region::VScrollbar => "Vertical Scrollbar",
        }
    }
}

/// How the object area tells objects from blank space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectDetection {
    /// Every point in the object area is blank.
    No,
    /// The point's frame must lie inside an object.
    Exact,
    /// Host hit test with its edge tolerance.
    Nearby,
}

fn floor_div(n: i64, d: i64) -> i64 {
    n.div_euclid(d)
}

fn to_i32(v: i64) -> i32 {
    v.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

/// Coordinate conversions for one view snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mapper {
    pub layout: TimelineLayout,
    pub view: TimelineView,
}

impl Mapper {
    pub fn new(layout: TimelineLayout, view: TimelineView) -> Self {
        Self { layout, view }
    }

    fn zoom_len(&self) -> i64 {
        self.view.zoom_len.max(1) as i64
    }

    fn layer_height(&self) -> i32 {
        self.view.layer_height.max(1)
    }

    /// Frame under client x, never negative; may exceed the scene length.
    pub fn point_to_frame(&self, x: i32) -> i32 {
        let dx = (x - self.layout.layer_area_width) as i64;
        let frames = floor_div(dx * ZOOM_SCALE_DENOM, self.zoom_len());
        to_i32(frames + self.view.frame_scroll as i64).max(0)
    }

    /// Client x of a frame's left edge; may lie outside the window.
    pub fn frame_to_point(&self, frame: i32) -> i32 {
        let df = frame as i64 - self.view.frame_scroll as i64;
        let px = floor_div(df * self.view.zoom_len as i64, ZOOM_SCALE_DENOM);
        to_i32(px + self.layout.layer_area_width as i64)
    }

    pub fn point_to_layer(&self, y: i32) -> i32 {
        let rows = (y - self.layout.layer_area_top).div_euclid(self.layer_height());
        (rows + self.view.layer_scroll).clamp(0, NUM_LAYERS - 1)
    }

    pub fn layer_to_point(&self, layer: i32) -> i32 {
        (layer - self.view.layer_scroll) * self.view.layer_height + self.layout.layer_area_top
    }

    /// Frames scrolled by one scroll step.
    pub fn horiz_scroll_size(&self) -> i32 {
        to_i32(SCROLL_STEP_NUMER as i64 / self.zoom_len())
    }

    pub fn horiz_scroll_margin(&self) -> i32 {
        to_i32(SCROLL_MARGIN_NUMER as i64 / self.zoom_len())
    }

    /// Right edge of the object area.
    pub fn object_area_right(&self) -> i32 {
        self.view.client_width - self.layout.scrollbar_thickness
    }

    /// First and last layer rows intersecting the window.
    pub fn visible_layers(&self) -> (i32, i32) {
        let top = self.view.layer_scroll.clamp(0, NUM_LAYERS - 1);
        let bottom = self.point_to_layer(self.view.client_height - 1).max(top);
        (top, bottom)
    }

    pub fn is_layer_visible(&self, layer: i32) -> bool {
        let (top, bottom) = self.visible_layers();
        (top..=bottom).contains(&layer)
    }

    pub fn classify<S: ObjectStore + ?Sized>(
        &self,
        store: &S,
        x: i32,
        y: i32,
        detection: ObjectDetection,
    ) -> Region {
        let layout = &self.layout;
        if x < layout.layer_area_width {
            return if y < layout.zoom_gauge_top {
                Region::SceneButton
            } else if y < layout.layer_area_top {
                Region::ZoomGauge
            } else {
                Region::Layer
            };
        }
        if y < layout.scrollbar_thickness {
            return Region::HScrollbar;
        }
        if x < self.object_area_right() {
            if y < layout.layer_area_top {
                return Region::Ruler;
            }
            let hit = match detection {
                ObjectDetection::No => false,
                ObjectDetection::Exact => self.object_at_point(store, x, y).is_some(),
                ObjectDetection::Nearby => store.object_at_point(x, y).is_some(),
            };
            return if hit { Region::Object } else { Region::Blank };
        }
        Region::VScrollbar
    }

    /// Object whose frame range contains the point's frame.
    pub fn object_at_point<S: ObjectStore + ?Sized>(
        &self,
        store: &S,
        x: i32,
        y: i32,
    ) -> Option<ObjectId> {
        let layer = self.point_to_layer(y);
        ObjectSearch::new(store, layer).object_at_frame(self.point_to_frame(x))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::TimelineObject;
    use crate::memory_host::MemoryHost;

    fn mapper(zoom_len: i32, frame_scroll: i32) -> Mapper {
        Mapper::new(
            TimelineLayout::default(),
            TimelineView {
                zoom_len,
                frame_scroll,
                ..TimelineView::default()
            },
        )
    }

    #[test]
    fn frame_mapping_floors_and_clamps() {
        let m = mapper(10_000, 0);
        assert_eq!(m.point_to_frame(64), 0);
        assert_eq!(m.point_to_frame(74), 10);
        assert_eq!(m.point_to_frame(10), 0);
        assert_eq!(m.frame_to_point(10), 74);

        // 2.5 px per frame
        let m = mapper(25_000, 100);
        assert_eq!(m.point_to_frame(64), 100);
        assert_eq!(m.point_to_frame(66), 100);
        assert_eq!(m.point_to_frame(67), 101);
        assert_eq!(m.point_to_frame(63), 99);
        assert_eq!(m.frame_to_point(99), 61);
    }

    #[test]
    fn frame_to_point_survives_large_values() {
        let m = mapper(40_000, 0);
        assert_eq!(m.frame_to_point(i32::MAX), i32::MAX);
        let m = mapper(40_000, i32::MAX);
        assert!(m.frame_to_point(0) < 0);
    }

    #[test]
    fn layer_mapping_clamps_forward_only() {
        let m = mapper(10_000, 0);
        assert_eq!(m.point_to_layer(42), 0);
        assert_eq!(m.point_to_layer(41), 0);
        assert_eq!(m.point_to_layer(42 + 32 * 3 + 5), 3);
        assert_eq!(m.point_to_layer(1_000_000), NUM_LAYERS - 1);
        assert_eq!(m.layer_to_point(3), 42 + 96);
        assert_eq!(m.layer_to_point(-1), 10);
    }

    #[test]
    fn scroll_sizes_follow_zoom() {
        let m = mapper(10_000, 0);
        assert_eq!(m.horiz_scroll_size(), 100);
        assert_eq!(m.horiz_scroll_margin(), 96);
    }

    #[test]
    fn classify_regions() {
        let mut host = MemoryHost::new(1000);
        host.push_object(TimelineObject {
            begin: 0,
            end: 99,
            layer: 0,
            active: true,
            leader: None,
            next: None,
        });
        let m = mapper(10_000, 0);
        let exact = ObjectDetection::Exact;
        assert_eq!(m.classify(&host, 10, 10, exact), Region::SceneButton);
        assert_eq!(m.classify(&host, 10, 30, exact), Region::ZoomGauge);
        assert_eq!(m.classify(&host, 10, 100, exact), Region::Layer);
        assert_eq!(m.classify(&host, 200, 5, exact), Region::HScrollbar);
        assert_eq!(m.classify(&host, 200, 30, exact), Region::Ruler);
        assert_eq!(m.classify(&host, 100, 50, exact), Region::Object);
        assert_eq!(m.classify(&host, 100, 50, ObjectDetection::No), Region::Blank);
        assert_eq!(m.classify(&host, 500, 50, exact), Region::Blank);
        assert_eq!(m.classify(&host, 1020, 300, exact), Region::VScrollbar);
    }
}
