// Timeline Layout Constants (client pixels)
pub const ZOOM_GAUGE_TOP: i32 = 22;
pub const LAYER_AREA_TOP: i32 = 42;
pub const LAYER_AREA_WIDTH: i32 = 64;
pub const SCROLLBAR_THICKNESS: i32 = 13;

// Timeline Structure
pub const NUM_LAYERS: i32 = 100;
pub const NUM_SCENES: i32 = 50;
pub const NUM_ZOOM_LEVELS: usize = 27;

// Zoom lengths are pixels-per-frame scaled by this denominator
pub const ZOOM_SCALE_DENOM: i64 = 10_000;
pub const SCROLL_STEP_NUMER: i32 = 1_000_000;
pub const SCROLL_MARGIN_NUMER: i32 = 960_000;

/// Default zoom-length table, one entry per zoom level, strictly increasing.
pub const DEFAULT_ZOOM_LENGTHS: [i32; NUM_ZOOM_LEVELS] = [
    100, 125, 160, 200, 250, 320, 400, 500, 640, 800, 1_000, 1_250, 1_600, 2_000, 2_500, 3_200,
    4_000, 5_000, 6_400, 8_000, 10_000, 12_500, 16_000, 20_000, 25_000, 32_000, 40_000,
];

// Tempo
pub const TEMPO_SCALE: i64 = 10_000; // tempo values are BPM * TEMPO_SCALE
pub const ONE_MINUTE_TEMPO: i64 = 60 * TEMPO_SCALE;

// Interaction Thresholds (pixels)
pub const SNAP_THRESHOLD: i32 = 16;
pub const EDGE_GRAB_THRESHOLD: i32 = 16;
pub const MIDPOINT_PICK_THRESHOLD: i32 = 16;
pub const MIDPOINT_SNAP_THRESHOLD: i32 = 8;
pub const PLACEHOLDER_TOLERANCE: i32 = 1 << 16;
pub const DEFAULT_DRAG_THRESHOLD: (i32, i32) = (4, 4);

// Layer Heights
pub const MIN_LAYER_HEIGHT: i32 = 15;
pub const MAX_LAYER_HEIGHT: i32 = 50;
pub const DEFAULT_LAYER_HEIGHT: i32 = 32;

// Settings Ranges
pub const ZOOM_DRAG_REFINE_RANGE: (i32, i32) = (1, 200);
pub const ZOOM_DRAG_LENGTH_RANGE: (i32, i32) = (-200, 200);
pub const AUTO_SCROLL_DELAY_RANGE: (u32, u32) = (10, 2_000);
