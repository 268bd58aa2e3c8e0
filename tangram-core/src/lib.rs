//! Collision kernel and tangram board logic shared by the browser game and
//! the offline layout checker.

pub mod collision;
pub mod constants;
pub mod error;
pub mod geometry;
pub mod piece;
pub mod session;
pub mod shapes;

pub use collision::{
    LineHit, Overlap, collide_line_line, collide_line_poly, collide_point_circle,
    collide_point_poly, collide_poly_poly, line_intersection, polygon_inside,
};
pub use constants::SOLUTION_ANSWER;
pub use error::TangramError;
pub use geometry::{Point, Segment};
pub use piece::Piece;
pub use session::{Layout, Rect, SessionPhase, TangramSession, Victory, Violation};
pub use shapes::{ShapeDef, ShapesCatalog, piece_color};
