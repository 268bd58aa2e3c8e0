//! Collision tests between points, circles, segments and polygons.
//!
//! Every function here is pure: inputs are absolute, already transformed
//! vertex lists and nothing is mutated or cached between calls.

use crate::geometry::{Point, Segment, edges};

/// Result of [`line_intersection`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LineHit {
    Hit(Point),
    Miss,
}

impl LineHit {
    pub fn is_hit(&self) -> bool {
        matches!(self, LineHit::Hit(_))
    }

    pub fn point(&self) -> Option<Point> {
        match self {
            LineHit::Hit(p) => Some(*p),
            LineHit::Miss => None,
        }
    }
}

/// Whether polygon containment is considered in [`collide_poly_poly`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Overlap {
    /// Only crossing or touching edges count.
    #[default]
    Boundary,
    /// Additionally report a hit when the first vertex of either polygon
    /// lies inside the other one.
    Interior,
}

/// True when `p` lies within or on the circle of diameter `d` around `center`.
pub fn collide_point_circle(p: Point, center: Point, d: f64) -> bool {
    p.dist(center) <= d / 2.0
}

/// Parametric coefficients `(uA, uB)` of the crossing point along `s1` and `s2`.
///
/// Parallel and collinear segments divide by zero; the resulting NaN or
/// infinity fails every range check downstream.
fn crossing_params(s1: Segment, s2: Segment) -> (f64, f64) {
    let (x1, y1, x2, y2) = (s1.a.x, s1.a.y, s1.b.x, s1.b.y);
    let (x3, y3, x4, y4) = (s2.a.x, s2.a.y, s2.b.x, s2.b.y);
    let denom = (y4 - y3) * (x2 - x1) - (x4 - x3) * (y2 - y1);
    let ua = ((x4 - x3) * (y1 - y3) - (y4 - y3) * (x1 - x3)) / denom;
    let ub = ((x2 - x1) * (y1 - y3) - (y2 - y1) * (x1 - x3)) / denom;
    (ua, ub)
}

fn within_unit(u: f64) -> bool {
    (0.0..=1.0).contains(&u)
}

/// Segment/segment test. Touching endpoints count as intersecting.
pub fn collide_line_line(s1: Segment, s2: Segment) -> bool {
    let (ua, ub) = crossing_params(s1, s2);
    within_unit(ua) && within_unit(ub)
}

/// Like [`collide_line_line`] but also reports where the segments meet.
pub fn line_intersection(s1: Segment, s2: Segment) -> LineHit {
    let (ua, ub) = crossing_params(s1, s2);
    if within_unit(ua) && within_unit(ub) {
        LineHit::Hit(Point {
            x: s1.a.x + ua * (s1.b.x - s1.a.x),
            y: s1.a.y + ua * (s1.b.y - s1.a.y),
        })
    } else {
        LineHit::Miss
    }
}

/// Even-odd ray casting towards +x.
///
/// An edge is crossed when one end is at or below `p.y` and the other
/// strictly above it, so horizontal edges never toggle.
pub fn collide_point_poly(p: Point, poly: &[Point]) -> bool {
    let mut inside = false;
    for e in edges(poly) {
        let (vc, vn) = (e.a, e.b);
        let straddles = (vc.y >= p.y && vn.y < p.y) || (vc.y < p.y && vn.y >= p.y);
        if straddles && p.x < (vn.x - vc.x) * (p.y - vc.y) / (vn.y - vc.y) + vc.x {
            inside = !inside;
        }
    }
    inside
}

/// True when `seg` touches or crosses any edge of `poly`.
pub fn collide_line_poly(seg: Segment, poly: &[Point]) -> bool {
    edges(poly).any(|e| collide_line_line(seg, e))
}

/// Polygon/polygon overlap.
///
/// With [`Overlap::Interior`] only the first vertex of each polygon is
/// tested for containment once no edges cross. That is enough for the
/// fixed tangram pieces and is kept as is.
pub fn collide_poly_poly(p1: &[Point], p2: &[Point], mode: Overlap) -> bool {
    if edges(p1).any(|e| collide_line_poly(e, p2)) {
        return true;
    }
    if mode == Overlap::Interior {
        if let Some(first) = p2.first()
            && collide_point_poly(*first, p1)
        {
            return true;
        }
        if let Some(first) = p1.first()
            && collide_point_poly(*first, p2)
        {
            return true;
        }
    }
    false
}

/// Every vertex of `inner` lies inside `outer`.
pub fn polygon_inside(outer: &[Point], inner: &[Point]) -> bool {
    inner.iter().all(|p| collide_point_poly(*p, outer))
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use rstest::rstest;

    use super::*;

    fn pts(v: &[(f64, f64)]) -> Vec<Point> {
        v.iter().map(|&p| p.into()).collect()
    }

    fn seg(a: (f64, f64), b: (f64, f64)) -> Segment {
        Segment::new(a.into(), b.into())
    }

    fn square_at(x: f64, y: f64, side: f64) -> Vec<Point> {
        pts(&[(x, y), (x + side, y), (x + side, y + side), (x, y + side)])
    }

    #[rstest]
    #[case((0.0, 0.0), true)]
    #[case((3.0, 4.0), true)]
    #[case((3.0, 4.1), false)]
    #[case((-5.0, 0.0), true)]
    fn point_circle_radius_five(#[case] p: (f64, f64), #[case] expected: bool) {
        assert_eq!(
            collide_point_circle(p.into(), Point::new(0.0, 0.0), 10.0),
            expected
        );
    }

    #[test]
    fn zero_diameter_only_hits_the_center() {
        let c = Point::new(2.0, 2.0);
        assert!(collide_point_circle(c, c, 0.0));
        assert!(!collide_point_circle(Point::new(2.0, 2.000_001), c, 0.0));
    }

    #[test]
    fn crossing_diagonals_meet_in_the_middle() {
        let hit = line_intersection(seg((0.0, 0.0), (10.0, 10.0)), seg((0.0, 10.0), (10.0, 0.0)));
        let p = hit.point().expect("diagonals cross");
        assert_abs_diff_eq!(p.x, 5.0);
        assert_abs_diff_eq!(p.y, 5.0);
    }

    #[test]
    fn miss_reports_no_point() {
        let hit = line_intersection(seg((0.0, 0.0), (1.0, 0.0)), seg((5.0, 5.0), (6.0, 6.0)));
        assert_eq!(hit, LineHit::Miss);
        assert!(!hit.is_hit());
    }

    #[rstest]
    #[case(seg((0.0, 0.0), (10.0, 10.0)), seg((0.0, 10.0), (10.0, 0.0)), true)]
    #[case(seg((0.0, 0.0), (10.0, 0.0)), seg((10.0, 0.0), (10.0, 10.0)), true)]
    #[case(seg((0.0, 0.0), (10.0, 0.0)), seg((0.0, 5.0), (10.0, 5.0)), false)]
    #[case(seg((0.0, 0.0), (4.0, 4.0)), seg((0.0, 10.0), (10.0, 0.0)), false)]
    #[case(seg((0.0, 0.0), (5.0, 5.0)), seg((0.0, 10.0), (10.0, 0.0)), true)]
    fn line_line_is_symmetric(#[case] a: Segment, #[case] b: Segment, #[case] expected: bool) {
        assert_eq!(collide_line_line(a, b), expected);
        assert_eq!(collide_line_line(b, a), expected);
    }

    #[test]
    fn shared_endpoint_counts() {
        let a = seg((0.0, 0.0), (10.0, 5.0));
        let b = seg((10.0, 5.0), (20.0, -3.0));
        assert!(collide_line_line(a, b));
        let p = line_intersection(a, b).point().expect("shared endpoint");
        assert_abs_diff_eq!(p.x, 10.0);
        assert_abs_diff_eq!(p.y, 5.0);
    }

    #[test]
    fn collinear_overlap_is_not_reported() {
        // 0/0 in both coefficients; the NaN fails the range check
        assert!(!collide_line_line(seg((0.0, 0.0), (10.0, 0.0)), seg((5.0, 0.0), (15.0, 0.0))));
    }

    #[test]
    fn degenerate_segment_does_not_panic() {
        assert!(!collide_line_line(seg((1.0, 1.0), (1.0, 1.0)), seg((0.0, 0.0), (2.0, 0.0))));
    }

    #[rstest]
    #[case((5.0, 5.0), true)]
    #[case((15.0, 15.0), false)]
    #[case((-1.0, 5.0), false)]
    #[case((9.999, 0.001), true)]
    fn point_in_unit_square(#[case] p: (f64, f64), #[case] expected: bool) {
        assert_eq!(collide_point_poly(p.into(), &square_at(0.0, 0.0, 10.0)), expected);
    }

    #[test]
    fn point_in_concave_polygon() {
        // U shape opening upwards
        let u = pts(&[
            (0.0, 0.0),
            (3.0, 0.0),
            (3.0, 8.0),
            (7.0, 8.0),
            (7.0, 0.0),
            (10.0, 0.0),
            (10.0, 10.0),
            (0.0, 10.0),
        ]);
        assert!(collide_point_poly(Point::new(1.5, 2.0), &u));
        assert!(collide_point_poly(Point::new(8.5, 2.0), &u));
        assert!(!collide_point_poly(Point::new(5.0, 2.0), &u));
        assert!(collide_point_poly(Point::new(5.0, 9.0), &u));
    }

    #[test]
    fn winding_direction_does_not_matter() {
        let mut sq = square_at(0.0, 0.0, 10.0);
        let p = Point::new(2.0, 7.0);
        let cw = collide_point_poly(p, &sq);
        sq.reverse();
        assert_eq!(cw, collide_point_poly(p, &sq));
        assert!(cw);
    }

    #[test]
    fn boundary_point_is_stable() {
        let sq = square_at(0.0, 0.0, 10.0);
        let on_edge = Point::new(10.0, 5.0);
        let first = collide_point_poly(on_edge, &sq);
        for _ in 0..10 {
            assert_eq!(collide_point_poly(on_edge, &sq), first);
        }
    }

    #[test]
    fn empty_polygon_contains_nothing() {
        assert!(!collide_point_poly(Point::new(0.0, 0.0), &[]));
        assert!(!collide_line_poly(seg((0.0, 0.0), (1.0, 1.0)), &[]));
    }

    #[test]
    fn line_poly_hits_any_edge() {
        let sq = square_at(0.0, 0.0, 10.0);
        assert!(collide_line_poly(seg((-5.0, 5.0), (5.0, 5.0)), &sq));
        // closing edge (0,10)->(0,0) only
        assert!(collide_line_poly(seg((-5.0, 2.0), (0.0, 2.0)), &sq));
        // fully inside, touches nothing
        assert!(!collide_line_poly(seg((2.0, 2.0), (8.0, 8.0)), &sq));
    }

    #[test]
    fn translated_squares() {
        let a = square_at(0.0, 0.0, 10.0);
        let b = square_at(5.0, 5.0, 10.0);
        let far = square_at(20.0, 20.0, 10.0);
        assert!(collide_poly_poly(&a, &b, Overlap::Boundary));
        assert!(collide_poly_poly(&b, &a, Overlap::Boundary));
        assert!(!collide_poly_poly(&a, &far, Overlap::Boundary));
        assert!(!collide_poly_poly(&far, &a, Overlap::Boundary));
    }

    #[test]
    fn polygon_overlaps_itself() {
        let a = square_at(3.0, 4.0, 7.0);
        assert!(collide_poly_poly(&a, &a, Overlap::Boundary));
    }

    #[test]
    fn nested_polygon_needs_interior_mode() {
        let outer = square_at(0.0, 0.0, 10.0);
        let inner = square_at(3.0, 3.0, 2.0);
        assert!(!collide_poly_poly(&outer, &inner, Overlap::Boundary));
        assert!(collide_poly_poly(&outer, &inner, Overlap::Interior));
        assert!(collide_poly_poly(&inner, &outer, Overlap::Interior));
    }

    #[test]
    fn interior_mode_with_empty_input() {
        let a = square_at(0.0, 0.0, 10.0);
        assert!(!collide_poly_poly(&a, &[], Overlap::Interior));
        assert!(!collide_poly_poly(&[], &a, Overlap::Interior));
    }

    #[test]
    fn inside_requires_every_vertex() {
        let outer = square_at(0.0, 0.0, 10.0);
        assert!(polygon_inside(&outer, &square_at(2.0, 2.0, 3.0)));
        assert!(!polygon_inside(&outer, &square_at(8.0, 8.0, 3.0)));
    }
}
