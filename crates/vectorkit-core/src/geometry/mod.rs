//! Geometric primitives: points, rectangles and 2D affine transforms.

mod point;
mod rect;
mod transform;

pub use point::Point;
pub use rect::Rect;
pub use transform::Transform;
