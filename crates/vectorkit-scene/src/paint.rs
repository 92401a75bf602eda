//! Render boundary.
//!
//! The scene never rasterizes anything itself. It walks the tree and talks
//! to a [`PaintContext`] supplied by the embedding application; backends
//! implement the trait, the scene stays backend-agnostic.

use crate::style::{BlendMode, Color, StyleEntry, StyleSet};
use vectorkit_core::Rect;

/// The drawing surface abstraction consumed by the paint walk.
///
/// Canvases nest as a stack: `push_canvas` opens an intermediate surface
/// covering `bbox`, subsequent drawing lands on it, and `pop_canvas`
/// composites it back onto the surface below with the given blend mode and
/// opacity. Clips nest the same way.
pub trait PaintContext {
    fn push_canvas(&mut self, bbox: Rect);
    fn pop_canvas(&mut self, blend: BlendMode, opacity: f64);
    fn fill_vertices(&mut self, outline: &lyon::path::Path, color: Color);
    fn stroke_vertices(&mut self, outline: &lyon::path::Path, color: Color, width: f64);
    fn clip_rect(&mut self, rect: Rect);
    fn pop_clip(&mut self);
}

/// Paints a style set over an element outline.
///
/// When the style needs compositing the entries are painted onto an
/// intermediate canvas covering `paint_bbox` which is then blended back,
/// otherwise entries go straight to the current surface.
pub fn render_style(
    ctx: &mut dyn PaintContext,
    style: &StyleSet,
    outline: &lyon::path::Path,
    paint_bbox: Rect,
) {
    if style.is_empty() {
        return;
    }
    let composited = style.needs_compositing();
    if composited {
        ctx.push_canvas(paint_bbox);
    }
    for entry in &style.entries {
        match *entry {
            StyleEntry::Fill { color } => ctx.fill_vertices(outline, color),
            StyleEntry::Stroke { color, width } => ctx.stroke_vertices(outline, color, width),
        }
    }
    if composited {
        ctx.pop_canvas(style.blend, style.opacity);
    }
}
