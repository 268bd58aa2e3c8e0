/// Tunables for the tangram board. Distances are in canvas pixels at scale 1.

/// Piece and target vertices closer than this on both axes snap together.
pub const SNAP_TOLERANCE: f64 = 5.0;
/// Pieces are shrunk to this fraction of the board scale before the victory test,
/// which absorbs rounding and snapping slack along shared edges.
pub const VICTORY_SCALE: f64 = 0.9;
/// Number of rotation steps in a full turn (45° each).
pub const ROTATION_STEPS: u8 = 8;
/// Reference board height and width used to fit the scale to the canvas.
pub const BOARD_HEIGHT: f64 = 460.0;
pub const BOARD_WIDTH: f64 = 320.0;
/// Answer reported to the level orchestrator once the silhouette is filled.
pub const SOLUTION_ANSWER: &str = "TANGRAM";
