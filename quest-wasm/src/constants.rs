/// Palette and sizes for the canvas, in CSS pixels.
pub const BACKGROUND: &str = "#101010";
pub const GRID: &str = "#333333";
pub const OUTLINE: &str = "#FFFFFF";
pub const TEXT: &str = "#EEEEEE";
pub const ACCENT: &str = "#39FF14";
pub const GRID_STEP: f64 = 30.0;
pub const OUTLINE_WIDTH: f64 = 4.0;
/// Interval of the countdown refresh (ms).
pub const TICK_MS: i32 = 1000;
