use super::{Point, Rect};
use serde::{Deserialize, Serialize};

/// 2D affine transform in the form:
///
/// ```text
/// | sx  shx tx |
/// | shy sy  ty |
/// ```
///
/// Maps `(x, y)` to `(sx * x + shx * y + tx, shy * x + sy * y + ty)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub sx: f64,
    pub shy: f64,
    pub shx: f64,
    pub sy: f64,
    pub tx: f64,
    pub ty: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    pub fn new(sx: f64, shy: f64, shx: f64, sy: f64, tx: f64, ty: f64) -> Self {
        Self {
            sx,
            shy,
            shx,
            sy,
            tx,
            ty,
        }
    }

    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)
    }

    pub fn translation(dx: f64, dy: f64) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, dx, dy)
    }

    pub fn scaling(sx: f64, sy: f64) -> Self {
        Self::new(sx, 0.0, 0.0, sy, 0.0, 0.0)
    }

    pub fn rotation(radians: f64) -> Self {
        let (sin, cos) = radians.sin_cos();
        Self::new(cos, sin, -sin, cos, 0.0, 0.0)
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::identity()
    }

    /// Returns `self` followed by `other` (i.e. `other * self` in matrix
    /// terms: points are mapped through `self` first).
    pub fn multiplied(&self, other: &Transform) -> Transform {
        Transform::new(
            self.sx * other.sx + self.shy * other.shx,
            self.sx * other.shy + self.shy * other.sy,
            self.shx * other.sx + self.sy * other.shx,
            self.shx * other.shy + self.sy * other.sy,
            self.tx * other.sx + self.ty * other.shx + other.tx,
            self.tx * other.shy + self.ty * other.sy + other.ty,
        )
    }

    pub fn translated(&self, dx: f64, dy: f64) -> Transform {
        self.multiplied(&Transform::translation(dx, dy))
    }

    pub fn map_point(&self, p: Point) -> Point {
        Point::new(
            self.sx * p.x + self.shx * p.y + self.tx,
            self.shy * p.x + self.sy * p.y + self.ty,
        )
    }

    /// Maps a rect to the bounding box of its four mapped corners.
    pub fn map_rect(&self, r: &Rect) -> Rect {
        let corners = [
            self.map_point(Point::new(r.x, r.y)),
            self.map_point(Point::new(r.right(), r.y)),
            self.map_point(Point::new(r.right(), r.bottom())),
            self.map_point(Point::new(r.x, r.bottom())),
        ];
        let mut min_x = f64::INFINITY;
        let mut min_y = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut max_y = f64::NEG_INFINITY;
        for c in corners {
            min_x = min_x.min(c.x);
            min_y = min_y.min(c.y);
            max_x = max_x.max(c.x);
            max_y = max_y.max(c.y);
        }
        Rect::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }

    /// Inverse transform, or `None` when singular.
    pub fn inverted(&self) -> Option<Transform> {
        let det = self.sx * self.sy - self.shy * self.shx;
        if crate::math::is_equal_eps(det, 0.0) {
            return None;
        }
        let inv_det = 1.0 / det;
        Some(Transform::new(
            self.sy * inv_det,
            -self.shy * inv_det,
            -self.shx * inv_det,
            self.sx * inv_det,
            (self.shx * self.ty - self.sy * self.tx) * inv_det,
            (self.shy * self.tx - self.sx * self.ty) * inv_det,
        ))
    }
}
