use std::f64::consts::FRAC_PI_4;

use serde::{Deserialize, Serialize};

use crate::collision::collide_point_poly;
use crate::constants::ROTATION_STEPS;
use crate::error::TangramError;
use crate::geometry::{Point, bounds};
use crate::shapes::{ShapeDef, TARGET_COLOUR};

/// A shape placed on the board.
///
/// `vertices` stay in shape-local units; the on-screen polygon is derived
/// on demand by [`Piece::real_vertices`] so that rescaling never drifts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Piece {
    pub shape_id: String,
    pub vertices: Vec<Point>,
    pub origin: Point,
    /// Rotation in 45° steps, `0..8`.
    pub rot: u8,
    pub flip: bool,
    pub colour: String,
}

impl Piece {
    /// Place `def` so the centre of its bounding box lands on `center`.
    ///
    /// The box always includes the local origin, matching how the shape
    /// data is authored around it.
    pub fn centered(def: &ShapeDef, center: Point, scale: f64) -> Piece {
        let vertices = def.vertices();
        let (min_x, min_y, max_x, max_y) = bounds(&vertices);
        let (min_x, min_y) = (min_x.min(0.0), min_y.min(0.0));
        let (max_x, max_y) = (max_x.max(0.0), max_y.max(0.0));
        let (w, h) = (max_x - min_x, max_y - min_y);
        Piece {
            shape_id: def.id.clone(),
            vertices,
            origin: Point {
                x: center.x - (w / 2.0 + min_x) * scale,
                y: center.y - (h / 2.0 + min_y) * scale,
            },
            rot: 0,
            flip: false,
            colour: def
                .colour
                .clone()
                .unwrap_or_else(|| TARGET_COLOUR.to_string()),
        }
    }

    /// Absolute vertices: rotate, mirror, scale, translate and round to whole pixels.
    pub fn real_vertices(&self, scale: f64) -> Vec<Point> {
        let angle = f64::from(self.rot) * FRAC_PI_4;
        let (sin, cos) = angle.sin_cos();
        let n = if self.flip { -1.0 } else { 1.0 };
        self.vertices
            .iter()
            .map(|v| Point {
                x: round_half_up(n * (v.x * cos - v.y * sin) * scale + self.origin.x),
                y: round_half_up((v.x * sin + v.y * cos) * scale + self.origin.y),
            })
            .collect()
    }

    pub fn contains(&self, p: Point, scale: f64) -> bool {
        collide_point_poly(p, &self.real_vertices(scale))
    }

    /// One step clockwise on screen. Mirrored pieces step the other way.
    pub fn rotate_clockwise(&mut self) {
        self.rot = if self.flip {
            self.step_back()
        } else {
            self.step_forward()
        };
    }

    pub fn rotate_anticlockwise(&mut self) {
        self.rot = if self.flip {
            self.step_forward()
        } else {
            self.step_back()
        };
    }

    pub fn toggle_flip(&mut self) {
        self.flip = !self.flip;
    }

    pub fn set_rotation(&mut self, rot: u8) -> Result<(), TangramError> {
        if rot >= ROTATION_STEPS {
            return Err(TangramError::BadRotation(rot));
        }
        self.rot = rot;
        Ok(())
    }

    fn step_forward(&self) -> u8 {
        (self.rot + 1) % ROTATION_STEPS
    }

    fn step_back(&self) -> u8 {
        (self.rot + ROTATION_STEPS - 1) % ROTATION_STEPS
    }
}

/// Ties go towards +inf like `Math.round`; `f64::round` would send -2.5 to -3.
fn round_half_up(v: f64) -> f64 {
    (v + 0.5).floor()
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;
    use crate::shapes::ShapesCatalog;

    fn def(id: &str) -> ShapeDef {
        ShapesCatalog::builtin()
            .piece(id)
            .cloned()
            .expect("builtin shape")
    }

    #[test]
    fn target_centres_on_its_bounding_box() {
        let t = Piece::centered(&ShapesCatalog::builtin().target, Point::new(0.0, 170.0), 1.0);
        assert_abs_diff_eq!(t.origin.x, 0.0);
        assert_abs_diff_eq!(t.origin.y, 0.0);
        assert_eq!(t.real_vertices(1.0)[4], Point::new(60.0, 400.0));
    }

    #[test]
    fn bounding_box_includes_local_origin() {
        // all x >= 10: the box still starts at 0
        let d = ShapeDef {
            id: "right".into(),
            points: vec![[10.0, -5.0], [20.0, -5.0], [20.0, 5.0]],
            ..Default::default()
        };
        let p = Piece::centered(&d, Point::new(100.0, 100.0), 2.0);
        assert_abs_diff_eq!(p.origin.x, 80.0);
        assert_abs_diff_eq!(p.origin.y, 100.0);
    }

    #[test]
    fn scaled_placement() {
        let p = Piece::centered(&def("short_trap"), Point::new(710.0, 260.0), 1.0);
        assert_eq!(p.origin, Point::new(745.0, 260.0));
        let q = Piece::centered(&def("short_trap"), Point::new(0.0, 0.0), 0.5);
        assert_abs_diff_eq!(q.origin.x, 17.5);
    }

    #[test]
    fn quarter_turn_rounds_to_whole_pixels() {
        let mut p = Piece::centered(&def("triangle"), Point::new(0.0, 0.0), 1.0);
        p.origin = Point::new(0.0, 0.0);
        p.rot = 2;
        let v = p.real_vertices(1.0);
        // (x, y) -> (-y, x)
        assert_eq!(v, vec![Point::new(40.0, -40.0), Point::new(40.0, 80.0), Point::new(-80.0, -40.0)]);
    }

    #[test]
    fn half_pixels_round_towards_positive_infinity() {
        let d = ShapeDef {
            id: "halves".into(),
            points: vec![[-2.5, -0.5], [2.5, 0.5], [-1.5, 1.5]],
            ..Default::default()
        };
        let mut p = Piece::centered(&d, Point::new(0.0, 0.0), 1.0);
        p.origin = Point::new(0.0, 0.0);
        assert_eq!(
            p.real_vertices(1.0),
            vec![Point::new(-2.0, 0.0), Point::new(3.0, 1.0), Point::new(-1.0, 2.0)]
        );
    }

    #[test]
    fn flip_mirrors_after_rotation() {
        let mut p = Piece::centered(&def("triangle"), Point::new(0.0, 0.0), 1.0);
        p.origin = Point::new(100.0, 0.0);
        p.flip = true;
        assert_eq!(p.real_vertices(1.0)[1], Point::new(20.0, -40.0));
        p.rot = 2;
        assert_eq!(p.real_vertices(1.0)[1], Point::new(60.0, 80.0));
    }

    #[rstest]
    #[case(false, 0, 1)]
    #[case(false, 7, 0)]
    #[case(true, 0, 7)]
    #[case(true, 3, 2)]
    fn clockwise_step(#[case] flip: bool, #[case] from: u8, #[case] to: u8) {
        let mut p = Piece::centered(&def("pentagon"), Point::default(), 1.0);
        p.flip = flip;
        p.rot = from;
        p.rotate_clockwise();
        assert_eq!(p.rot, to);
        p.rotate_anticlockwise();
        assert_eq!(p.rot, from);
    }

    #[test]
    fn eight_steps_make_a_full_turn() {
        let mut p = Piece::centered(&def("long_trap"), Point::new(50.0, 50.0), 1.0);
        let before = p.real_vertices(1.0);
        for _ in 0..8 {
            p.rotate_clockwise();
        }
        assert_eq!(p.rot, 0);
        assert_eq!(p.real_vertices(1.0), before);
    }

    #[test]
    fn rotation_out_of_range() {
        let mut p = Piece::centered(&def("triangle"), Point::default(), 1.0);
        assert!(p.set_rotation(7).is_ok());
        assert!(matches!(p.set_rotation(8), Err(TangramError::BadRotation(8))));
        assert_eq!(p.rot, 7);
    }

    #[test]
    fn contains_uses_placed_polygon() {
        let p = Piece::centered(&def("short_trap"), Point::new(710.0, 260.0), 1.0);
        assert!(p.contains(Point::new(745.0, 260.0), 1.0));
        assert!(!p.contains(Point::new(600.0, 260.0), 1.0));
    }
}
