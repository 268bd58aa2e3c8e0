use serde::{Deserialize, Serialize};

/// Basic two dimensional point used for geometry operations.
///
/// Coordinates are canvas pixels: x grows to the right, y grows downwards.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    pub fn dist(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn offset(self, dx: f64, dy: f64) -> Point {
        Point {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

impl From<(f64, f64)> for Point {
    fn from(v: (f64, f64)) -> Self {
        Point { x: v.0, y: v.1 }
    }
}

impl From<[f64; 2]> for Point {
    fn from(v: [f64; 2]) -> Self {
        Point { x: v[0], y: v[1] }
    }
}

impl From<geo_types::Coord<f64>> for Point {
    fn from(c: geo_types::Coord<f64>) -> Self {
        Point { x: c.x, y: c.y }
    }
}

impl From<Point> for geo_types::Coord<f64> {
    fn from(p: Point) -> Self {
        geo_types::Coord { x: p.x, y: p.y }
    }
}

/// A line segment between two absolute points.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub a: Point,
    pub b: Point,
}

impl Segment {
    pub const fn new(a: Point, b: Point) -> Self {
        Segment { a, b }
    }
}

/// Iterate the edges of a closed polygon; the last vertex connects back to the first.
pub fn edges(poly: &[Point]) -> impl Iterator<Item = Segment> + '_ {
    let n = poly.len();
    (0..n).map(move |i| Segment::new(poly[i], poly[(i + 1) % n]))
}

/// Axis aligned bounds as `(min_x, min_y, max_x, max_y)`.
pub fn bounds(pts: &[Point]) -> (f64, f64, f64, f64) {
    let mut minx = f64::INFINITY;
    let mut miny = f64::INFINITY;
    let mut maxx = f64::NEG_INFINITY;
    let mut maxy = f64::NEG_INFINITY;
    for p in pts {
        minx = minx.min(p.x);
        miny = miny.min(p.y);
        maxx = maxx.max(p.x);
        maxy = maxy.max(p.y);
    }
    (minx, miny, maxx, maxy)
}

pub fn to_geo_polygon(poly: &[Point]) -> geo_types::Polygon<f64> {
    let ring: Vec<geo_types::Coord<f64>> = poly.iter().map(|p| (*p).into()).collect();
    geo_types::Polygon::new(geo_types::LineString::from(ring), vec![])
}
