//! # VectorKit Core
//!
//! Geometry primitives and scalar math shared by the VectorKit scene graph
//! and editor crates. Everything here is plain data: points, rectangles,
//! 2D affine transforms and the circle-fitting helpers the anchor point
//! model is built on.

pub mod geometry;
pub mod math;

pub use geometry::{Point, Rect, Transform};
pub use math::{
    circumcircle_center, is_equal_eps, lines_intersection, segment_side, sqr_dist, EPSILON,
};
