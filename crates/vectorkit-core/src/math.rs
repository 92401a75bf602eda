//! Scalar math helpers used by the anchor point model.
//!
//! The circle-fitting helpers deliberately return `Option` for degenerate
//! input (collinear or duplicate points) so callers can fall back
//! deterministically instead of propagating NaN into stored geometry.

use crate::geometry::Point;

/// Default tolerance for floating point comparisons.
pub const EPSILON: f64 = 1e-9;

/// Compares two scalars within [`EPSILON`].
pub fn is_equal_eps(a: f64, b: f64) -> bool {
    (a - b).abs() <= EPSILON
}

/// Squared distance between two points.
pub fn sqr_dist(p: Point, q: Point) -> f64 {
    let dx = p.x - q.x;
    let dy = p.y - q.y;
    dx * dx + dy * dy
}

/// Intersection of the two lines `a1*x + b1*y + c1 = 0` and
/// `a2*x + b2*y + c2 = 0`, or `None` when (nearly) parallel.
pub fn lines_intersection(a1: f64, b1: f64, c1: f64, a2: f64, b2: f64, c2: f64) -> Option<Point> {
    let d = a1 * b2 - a2 * b1;
    if is_equal_eps(d, 0.0) {
        return None;
    }
    Some(Point::new((b1 * c2 - b2 * c1) / d, (c1 * a2 - c2 * a1) / d))
}

/// Center of the circumcircle of the triangle `(p1, p2, p3)`.
///
/// The center is the intersection of the two perpendicular bisectors of
/// the sides `(p1, p2)` and `(p2, p3)`. Returns `None` for collinear or
/// coincident points.
pub fn circumcircle_center(p1: Point, p2: Point, p3: Point) -> Option<Point> {
    let dx1 = p1.x - p2.x;
    let dy1 = p1.y - p2.y;
    let dx2 = p2.x - p3.x;
    let dy2 = p2.y - p3.y;

    lines_intersection(
        dx1,
        dy1,
        -dx1 * (p1.x + p2.x) / 2.0 - dy1 * (p1.y + p2.y) / 2.0,
        dx2,
        dy2,
        -dx2 * (p2.x + p3.x) / 2.0 - dy2 * (p2.y + p3.y) / 2.0,
    )
}

/// Which side of the directed segment `(a, b)` the point `p` lies on:
/// `1`, `-1`, or `0` when (nearly) on the line.
pub fn segment_side(a: Point, b: Point, p: Point) -> i8 {
    let val = (p.y - a.y) * (b.x - a.x) + (p.x - a.x) * (a.y - b.y);
    if is_equal_eps(val, 0.0) {
        0
    } else if val > 0.0 {
        1
    } else {
        -1
    }
}
