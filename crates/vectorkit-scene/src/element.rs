//! Element geometry engine: lazy bounding boxes, the geometry update
//! protocol, hit-testing and collision queries, and the paint walk.
//!
//! All boxes are reported in scene coordinates. Containers carry no
//! transform of their own; a shape's box already includes its `trf`
//! property, so parent-space and scene-space coincide.
//!
//! Box getters return `None` for hidden nodes. The children helpers return
//! an *empty rect* for a visible container whose visible children have no
//! area, which is a different statement than `None`; callers that union
//! boxes rely on the distinction.

use lyon::algorithms::hit_test::hit_test_path;
use lyon::path::FillRule;
use tracing::trace;

use crate::events::{GeometryPhase, SceneEvent};
use crate::node::{Node, NodeId, NodeKind, Scene};
use crate::paint::{render_style, PaintContext};
use vectorkit_core::{Point, Rect, Transform};

/// Extra padding applied to paint boxes for anti-aliased edges.
const AA_PADDING: f64 = 0.5;

/// Kappa constant for approximating a quarter ellipse arc with a cubic.
const ELLIPSE_KAPPA: f64 = 0.552_284_749_830_793_4;

/// Options for [`Scene::hit_test`].
pub struct HitTestOptions<'a> {
    /// Hit distance in scene units; also used to expand the bbox prune.
    pub tolerance: f64,
    /// Collect every hit along the z-order instead of the topmost one.
    pub stacked: bool,
    /// Recursion depth bound; negative means unlimited.
    pub level: i32,
    /// Optional predicate filtering which nodes may produce results.
    pub acceptor: Option<&'a dyn Fn(&Node) -> bool>,
}

impl Default for HitTestOptions<'_> {
    fn default() -> Self {
        Self {
            tolerance: 0.0,
            stacked: false,
            level: -1,
            acceptor: None,
        }
    }
}

/// A single hit-test match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HitResult {
    pub node: NodeId,
    /// True when the location lies within tolerance of the outline
    /// (it may additionally be inside the fill).
    pub outline: bool,
}

/// Options for [`Scene::collisions`].
pub struct CollisionOptions<'a> {
    /// Match on intersection instead of full containment.
    pub partial: bool,
    /// Test against paint boxes instead of geometry boxes.
    pub use_paint_bbox: bool,
    pub acceptor: Option<&'a dyn Fn(&Node) -> bool>,
}

impl Default for CollisionOptions<'_> {
    fn default() -> Self {
        Self {
            partial: true,
            use_paint_bbox: false,
            acceptor: None,
        }
    }
}

impl Scene {
    // ---- bounding boxes ---------------------------------------------------

    /// Geometry bounding box in scene coordinates; `None` when hidden, and
    /// for a container whose children contribute nothing.
    pub fn geometry_bbox(&mut self, id: NodeId) -> Option<Rect> {
        if !self.node(id).is_visible() {
            return None;
        }
        if let Some(cached) = self.node(id).geometry_bbox_cache {
            return Some(cached);
        }
        let computed = self.compute_geometry_bbox(id)?;
        self.node_mut(id).geometry_bbox_cache = Some(computed);
        Some(computed)
    }

    /// Paint bounding box: the geometry box grown by the style's paint
    /// margin and anti-aliasing padding. `None` when hidden.
    pub fn paint_bbox(&mut self, id: NodeId) -> Option<Rect> {
        if !self.node(id).is_visible() {
            return None;
        }
        if let Some(cached) = self.node(id).paint_bbox_cache {
            return Some(cached);
        }
        let computed = self.compute_paint_bbox(id)?;
        self.node_mut(id).paint_bbox_cache = Some(computed);
        Some(computed)
    }

    /// Union of visible children's geometry boxes. `None` when the node is
    /// hidden or not a container; an empty rect when no visible child
    /// contributes area.
    pub fn children_geometry_bbox(&mut self, id: NodeId) -> Option<Rect> {
        self.children_bbox(id, false)
    }

    /// Paint-box variant of [`Scene::children_geometry_bbox`], same
    /// null-versus-empty contract.
    pub fn children_paint_bbox(&mut self, id: NodeId) -> Option<Rect> {
        self.children_bbox(id, true)
    }

    fn children_bbox(&mut self, id: NodeId, paint: bool) -> Option<Rect> {
        let node = self.node(id);
        if !node.is_visible() || !node.kind.is_container() {
            return None;
        }
        let children = node.children.clone();
        let mut total: Option<Rect> = None;
        for child in children {
            let bbox = if paint {
                self.paint_bbox(child)
            } else {
                self.geometry_bbox(child)
            };
            match bbox {
                Some(b) if !b.is_empty() => {
                    total = Some(match total {
                        Some(t) => t.united(&b),
                        None => b,
                    });
                }
                _ => {}
            }
        }
        Some(total.unwrap_or_default())
    }

    fn compute_geometry_bbox(&mut self, id: NodeId) -> Option<Rect> {
        let node = self.node(id);
        match &node.kind {
            NodeKind::Rectangle | NodeKind::Ellipse => {
                let trf = node.local_transform();
                Some(trf.map_rect(&node.local_rect()))
            }
            NodeKind::Path(data) => {
                let (min, max) = data.anchor_points.extents()?;
                let trf = node.local_transform();
                Some(trf.map_rect(&Rect::from_points(min, max)))
            }
            kind if kind.is_container() => {
                let children = node.children.clone();
                let mut total: Option<Rect> = None;
                for child in children {
                    if let Some(b) = self.geometry_bbox(child) {
                        total = Some(match total {
                            Some(t) => t.united(&b),
                            None => b,
                        });
                    }
                }
                total
            }
            _ => None,
        }
    }

    fn compute_paint_bbox(&mut self, id: NodeId) -> Option<Rect> {
        if self.node(id).kind.is_container() {
            let children = self.node(id).children.clone();
            let mut total: Option<Rect> = None;
            for child in children {
                if let Some(b) = self.paint_bbox(child) {
                    total = Some(match total {
                        Some(t) => t.united(&b),
                        None => b,
                    });
                }
            }
            total
        } else {
            let bbox = self.geometry_bbox(id)?;
            let margin = self.node(id).style.paint_margin() + AA_PADDING;
            Some(bbox.expanded(margin, margin, margin, margin))
        }
    }

    // ---- geometry update protocol -----------------------------------------

    /// Opens a geometry update on `id`. Re-entrant: nested calls on the
    /// same node are counted and only the outermost pair does any work.
    /// The 0 -> 1 transition captures the pre-change paint box and fires
    /// [`GeometryPhase::Before`].
    pub fn begin_update(&mut self, id: NodeId) {
        if self.node(id).update_counter == 0 {
            let saved = self.paint_bbox(id);
            self.node_mut(id).saved_paint_bbox = saved;
            self.dispatch(SceneEvent::GeometryChange {
                node: id,
                phase: GeometryPhase::Before,
            });
        }
        self.node_mut(id).update_counter += 1;
    }

    /// Closes a geometry update. The final call clears the node's caches,
    /// fires [`GeometryPhase::After`], and when the paint box actually
    /// moved invalidates every ancestor (firing [`GeometryPhase::Child`]
    /// on each) and requests a repaint of the union of the old and new
    /// boxes. An unchanged box still requests a repaint of itself.
    ///
    /// Panics when called without a matching [`Scene::begin_update`].
    pub fn end_update(&mut self, id: NodeId) {
        let counter = self.node(id).update_counter;
        assert!(
            counter > 0,
            "end_update without matching begin_update on {id}"
        );
        if counter > 1 {
            self.node_mut(id).update_counter = counter - 1;
            return;
        }

        {
            let node = self.node_mut(id);
            node.update_counter = 0;
            node.geometry_bbox_cache = None;
            node.paint_bbox_cache = None;
        }
        self.dispatch(SceneEvent::GeometryChange {
            node: id,
            phase: GeometryPhase::After,
        });

        let old = self.node_mut(id).saved_paint_bbox.take();
        let new = self.paint_bbox(id);
        if old != new {
            trace!(node = %id, "paint bbox moved, invalidating ancestors");
            if let Some(parent) = self.parent(id) {
                self.invalidate_ancestors(parent);
            }
            let area = match (old, new) {
                (Some(a), Some(b)) => Some(a.united(&b)),
                (Some(a), None) => Some(a),
                (None, Some(b)) => Some(b),
                (None, None) => None,
            };
            if let Some(area) = area {
                self.dispatch(SceneEvent::RepaintRequested { area });
            }
        } else if let Some(area) = new {
            self.dispatch(SceneEvent::RepaintRequested { area });
        }
    }

    /// Clears cached boxes from `from` up to the root, firing
    /// [`GeometryPhase::Child`] on each node touched.
    pub(crate) fn invalidate_ancestors(&mut self, from: NodeId) {
        let mut current = Some(from);
        while let Some(id) = current {
            let node = self.node_mut(id);
            node.geometry_bbox_cache = None;
            node.paint_bbox_cache = None;
            current = node.parent;
            self.dispatch(SceneEvent::GeometryChange {
                node: id,
                phase: GeometryPhase::Child,
            });
        }
    }

    // ---- hit testing ------------------------------------------------------

    /// Hit-tests the subtree at `id` against `location` given in view
    /// coordinates; `view` maps scene to view. Children are tested
    /// last-to-first so the topmost element wins. Results are ordered
    /// topmost first; without `stacked` at most one result is returned.
    pub fn hit_test(
        &mut self,
        id: NodeId,
        location: Point,
        view: &Transform,
        opts: &HitTestOptions<'_>,
    ) -> Vec<HitResult> {
        let mut results = Vec::new();
        let Some(inverse) = view.inverted() else {
            return results;
        };
        let scene_loc = inverse.map_point(location);
        self.hit_test_node(id, scene_loc, opts, opts.level, &mut results);
        results
    }

    fn hit_test_node(
        &mut self,
        id: NodeId,
        loc: Point,
        opts: &HitTestOptions<'_>,
        level: i32,
        out: &mut Vec<HitResult>,
    ) -> bool {
        let Some(bbox) = self.paint_bbox(id) else {
            return false;
        };
        let t = opts.tolerance;
        if !bbox.expanded(t, t, t, t).contains_point(loc) {
            return false;
        }

        if self.node(id).kind.is_container() {
            if level == 0 {
                return false;
            }
            let next_level = if level > 0 { level - 1 } else { level };
            let children = self.node(id).children.clone();
            let mut any = false;
            for child in children.into_iter().rev() {
                if self.hit_test_node(child, loc, opts, next_level, out) {
                    any = true;
                    if !opts.stacked {
                        return true;
                    }
                }
            }
            return any;
        }

        if let Some(acceptor) = opts.acceptor {
            if !acceptor(self.node(id)) {
                return false;
            }
        }

        let outline_path = self.shape_outline(id);
        let probe = lyon::math::point(loc.x as f32, loc.y as f32);
        let flatten = (opts.tolerance.max(0.1)) as f32;
        let fill = hit_test_path(&probe, outline_path.iter(), FillRule::NonZero, flatten);
        let outline = distance_to_outline(&outline_path, probe) <= opts.tolerance as f32;
        if fill || outline {
            out.push(HitResult { node: id, outline });
            return true;
        }
        false
    }

    // ---- collision queries --------------------------------------------------

    /// Collects nodes in the subtree at `id` whose box matches `area`.
    /// Containers are always recursed into, whether or not they match.
    pub fn collisions(
        &mut self,
        id: NodeId,
        area: &Rect,
        opts: &CollisionOptions<'_>,
    ) -> Vec<NodeId> {
        let mut results = Vec::new();
        self.collide_node(id, area, opts, &mut results);
        results
    }

    fn collide_node(
        &mut self,
        id: NodeId,
        area: &Rect,
        opts: &CollisionOptions<'_>,
        out: &mut Vec<NodeId>,
    ) {
        let bbox = if opts.use_paint_bbox {
            self.paint_bbox(id)
        } else {
            self.geometry_bbox(id)
        };
        if let Some(bbox) = bbox {
            let matched = if opts.partial {
                area.intersects(&bbox)
            } else {
                area.contains_rect(&bbox)
            };
            let accepted = opts.acceptor.map_or(true, |a| a(self.node(id)));
            if matched && accepted && self.node(id).kind.is_shape() {
                out.push(id);
            }
        }
        if self.node(id).kind.is_container() && self.node(id).is_visible() {
            let children = self.node(id).children.clone();
            for child in children {
                self.collide_node(child, area, opts, out);
            }
        }
    }

    // ---- painting ------------------------------------------------------------

    /// Walks the subtree in z-order, handing each visible shape's outline
    /// and style to the paint context.
    pub fn paint(&mut self, id: NodeId, ctx: &mut dyn PaintContext) {
        if !self.node(id).is_visible() {
            return;
        }
        if self.node(id).kind.is_container() {
            let children = self.node(id).children.clone();
            for child in children {
                self.paint(child, ctx);
            }
            return;
        }
        let Some(bbox) = self.paint_bbox(id) else {
            return;
        };
        let outline = self.shape_outline(id);
        let style = self.node(id).style.clone();
        render_style(ctx, &style, &outline, bbox);
    }

    /// The shape's outline in scene coordinates, as a lyon path.
    pub fn shape_outline(&self, id: NodeId) -> lyon::path::Path {
        let node = self.node(id);
        let trf = node.local_transform();
        match &node.kind {
            NodeKind::Rectangle => {
                let r = node.local_rect();
                polygon_outline(
                    &trf,
                    &[
                        Point::new(r.x, r.y),
                        Point::new(r.right(), r.y),
                        Point::new(r.right(), r.bottom()),
                        Point::new(r.x, r.bottom()),
                    ],
                )
            }
            NodeKind::Ellipse => ellipse_outline(&trf, &node.local_rect()),
            NodeKind::Path(data) => data.to_lyon_path(&trf),
            _ => lyon::path::Path::builder().build(),
        }
    }
}

fn to_lyon(tf: &Transform, p: Point) -> lyon::math::Point {
    let m = tf.map_point(p);
    lyon::math::point(m.x as f32, m.y as f32)
}

fn polygon_outline(tf: &Transform, corners: &[Point]) -> lyon::path::Path {
    let mut builder = lyon::path::Path::builder();
    let mut iter = corners.iter();
    if let Some(&first) = iter.next() {
        builder.begin(to_lyon(tf, first));
        for &corner in iter {
            builder.line_to(to_lyon(tf, corner));
        }
        builder.end(true);
    }
    builder.build()
}

/// Four-cubic approximation of an ellipse inscribed in `rect`.
fn ellipse_outline(tf: &Transform, rect: &Rect) -> lyon::path::Path {
    let cx = rect.x + rect.width / 2.0;
    let cy = rect.y + rect.height / 2.0;
    let rx = rect.width / 2.0;
    let ry = rect.height / 2.0;
    let kx = rx * ELLIPSE_KAPPA;
    let ky = ry * ELLIPSE_KAPPA;

    let mut builder = lyon::path::Path::builder();
    builder.begin(to_lyon(tf, Point::new(cx + rx, cy)));
    builder.cubic_bezier_to(
        to_lyon(tf, Point::new(cx + rx, cy + ky)),
        to_lyon(tf, Point::new(cx + kx, cy + ry)),
        to_lyon(tf, Point::new(cx, cy + ry)),
    );
    builder.cubic_bezier_to(
        to_lyon(tf, Point::new(cx - kx, cy + ry)),
        to_lyon(tf, Point::new(cx - rx, cy + ky)),
        to_lyon(tf, Point::new(cx - rx, cy)),
    );
    builder.cubic_bezier_to(
        to_lyon(tf, Point::new(cx - rx, cy - ky)),
        to_lyon(tf, Point::new(cx - kx, cy - ry)),
        to_lyon(tf, Point::new(cx, cy - ry)),
    );
    builder.cubic_bezier_to(
        to_lyon(tf, Point::new(cx + kx, cy - ry)),
        to_lyon(tf, Point::new(cx + rx, cy - ky)),
        to_lyon(tf, Point::new(cx + rx, cy)),
    );
    builder.end(true);
    builder.build()
}

/// Minimum distance from `p` to the flattened outline.
fn distance_to_outline(path: &lyon::path::Path, p: lyon::math::Point) -> f32 {
    use lyon::path::iterator::PathIterator;

    let mut min = f32::INFINITY;
    for event in path.iter().flattened(0.1) {
        match event {
            lyon::path::Event::Line { from, to } => {
                min = min.min(segment_distance(p, from, to));
            }
            lyon::path::Event::End {
                last,
                first,
                close: true,
            } => {
                min = min.min(segment_distance(p, last, first));
            }
            _ => {}
        }
    }
    min
}

fn segment_distance(p: lyon::math::Point, a: lyon::math::Point, b: lyon::math::Point) -> f32 {
    let ab = b - a;
    let len_sq = ab.x * ab.x + ab.y * ab.y;
    if len_sq == 0.0 {
        return (p - a).length();
    }
    let t = (((p.x - a.x) * ab.x + (p.y - a.y) * ab.y) / len_sq).clamp(0.0, 1.0);
    let proj = lyon::math::point(a.x + ab.x * t, a.y + ab.y * t);
    (p - proj).length()
}
