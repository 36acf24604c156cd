//! Global constants for the viewer core

/// Neutral brightness percentage (no window shift)
pub const DEFAULT_BRIGHTNESS: f32 = 50.0;

/// Neutral contrast percentage (window width equals the display range)
pub const DEFAULT_CONTRAST: f32 = 50.0;

/// Initial opacity for the overlay volume
pub const DEFAULT_OVERLAY_OPACITY: f32 = 0.7;

/// Lower and upper bounds for brightness/contrast percentages
pub const PERCENT_MIN: f32 = 0.0;
pub const PERCENT_MAX: f32 = 100.0;

/// Palette applied to overlay volumes. Kept distinct from the user-selectable base palettes.
pub const OVERLAY_COLORMAP: &str = "warm";

/// Volume index of the base image in the engine's load list
pub const BASE_VOLUME: usize = 0;

/// Volume index of the overlay in the engine's load list
pub const OVERLAY_VOLUME: usize = 1;

/// Slice shown when a scan is first opened and after a view reset
pub const DEFAULT_SLICE: u32 = 45;

/// Highest selectable slice index
pub const DEFAULT_MAX_SLICE: u32 = 90;

/// Contrast percentage span that doubles (or halves) the window width
pub const CONTRAST_DOUBLING_SPAN: f32 = 25.0;

/// Threshold for treating two control values as unchanged
pub const FLOAT_EPSILON: f32 = 1e-4;
