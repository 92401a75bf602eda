//! Scene graph for VectorKit.
//!
//! The scene is a node arena with stable ids, a synchronous change-event
//! stream, lazily cached bounding boxes with precise invalidation, a style
//! capability, the bezier anchor point model, and a JSON persistence
//! contract. Rendering goes through the [`paint::PaintContext`] boundary;
//! the scene itself never rasterizes.

pub mod element;
pub mod error;
pub mod events;
pub mod node;
pub mod paint;
pub mod path;
pub mod serialization;
pub mod style;

pub use element::{CollisionOptions, HitResult, HitTestOptions};
pub use error::DocumentError;
pub use events::{GeometryPhase, ListenerId, SceneEvent};
pub use node::{
    DetachedSubtree, Node, NodeFlag, NodeFlags, NodeId, NodeKind, PropertyValue, Scene,
};
pub use paint::{render_style, PaintContext};
pub use path::{
    AnchorPoint, AnchorPoints, CornerType, HandleSide, PathData, CONNECTOR_HANDLE_LEN,
    HANDLE_COEFF,
};
pub use style::{BlendMode, Color, StyleEntry, StyleSet};
