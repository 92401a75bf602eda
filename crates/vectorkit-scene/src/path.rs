//! Path geometry: anchor points with tangent handles and corner styles.
//!
//! An anchor point carries either tangent handles (Connector/Smooth, or any
//! point whose handles were placed manually) or a pair of shoulder lengths
//! (the styled corner types). Handles are stored as absolute positions;
//! persistence converts them to offsets from the anchor position.
//!
//! Handle recomputation priority: Connector > auto > Smooth.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::warn;
use vectorkit_core::{circumcircle_center, is_equal_eps, segment_side, Point, Transform};

/// Fraction of the chord length used for auto-computed handles.
pub const HANDLE_COEFF: f64 = 0.4;

/// Handle length forced onto connector points.
pub const CONNECTOR_HANDLE_LEN: f64 = 5.0;

/// The geometric treatment applied at an anchor point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CornerType {
    /// Handles are independent of each other; no corner styling.
    Regular,
    /// Handles stay aligned with the direction of the adjacent segments.
    Connector,
    /// Handles stay collinear, tangent to the curve through the point.
    Smooth,
    /// A rounded corner.
    Rounded,
    /// An inverse rounded corner.
    InverseRounded,
    /// A beveled corner.
    Bevel,
    /// An inset corner.
    Inset,
    /// A fancy corner.
    Fancy,
}

impl CornerType {
    /// Styled corner types use shoulder lengths instead of handles.
    pub fn is_styled(&self) -> bool {
        matches!(
            self,
            CornerType::Rounded
                | CornerType::InverseRounded
                | CornerType::Bevel
                | CornerType::Inset
                | CornerType::Fancy
        )
    }

    /// Single-character code used by the persistence contract.
    pub fn code(&self) -> &'static str {
        match self {
            CornerType::Regular => "N",
            CornerType::Connector => "TC",
            CornerType::Smooth => "TS",
            CornerType::Rounded => "R",
            CornerType::InverseRounded => "U",
            CornerType::Bevel => "B",
            CornerType::Inset => "I",
            CornerType::Fancy => "F",
        }
    }

    pub fn from_code(code: &str) -> Option<CornerType> {
        Some(match code {
            "N" => CornerType::Regular,
            "TC" => CornerType::Connector,
            "TS" => CornerType::Smooth,
            "R" => CornerType::Rounded,
            "U" => CornerType::InverseRounded,
            "B" => CornerType::Bevel,
            "I" => CornerType::Inset,
            "F" => CornerType::Fancy,
            _ => return None,
        })
    }
}

impl Default for CornerType {
    fn default() -> Self {
        CornerType::Regular
    }
}

/// Which side of an anchor point a handle belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleSide {
    Left,
    Right,
}

/// A control vertex of a vector path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnchorPoint {
    pub position: Point,
    /// Incoming tangent handle, absolute position. `None` = no handle.
    pub left_handle: Option<Point>,
    /// Outgoing tangent handle, absolute position. `None` = no handle.
    pub right_handle: Option<Point>,
    pub corner_type: CornerType,
    /// Left/right shoulder lengths, used only by styled corner types.
    pub shoulder: (f64, f64),
    /// When set, handles are recomputed from neighboring geometry.
    pub auto_handles: bool,
    /// Part-selection bit, editor state. Not persisted.
    #[serde(skip)]
    pub selected: bool,
}

impl AnchorPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            position: Point::new(x, y),
            left_handle: None,
            right_handle: None,
            corner_type: CornerType::Regular,
            shoulder: (0.0, 0.0),
            auto_handles: false,
            selected: false,
        }
    }

    pub fn with_handles(x: f64, y: f64, left: Option<Point>, right: Option<Point>) -> Self {
        Self {
            left_handle: left,
            right_handle: right,
            ..Self::new(x, y)
        }
    }

    /// Applies a transform to the position and both handles.
    pub fn transform(&mut self, tf: &Transform) {
        self.position = tf.map_point(self.position);
        self.left_handle = self.left_handle.map(|h| tf.map_point(h));
        self.right_handle = self.right_handle.map(|h| tf.map_point(h));
    }

    /// Copies the geometry fields (everything except the selection bit).
    pub fn copy_geometry_from(&mut self, other: &AnchorPoint) {
        self.position = other.position;
        self.left_handle = other.left_handle;
        self.right_handle = other.right_handle;
        self.corner_type = other.corner_type;
        self.shoulder = other.shoulder;
        self.auto_handles = other.auto_handles;
    }

    /// Geometry equality ignoring the selection bit.
    pub fn same_geometry(&self, other: &AnchorPoint) -> bool {
        self.position == other.position
            && self.left_handle == other.left_handle
            && self.right_handle == other.right_handle
            && self.corner_type == other.corner_type
            && self.shoulder == other.shoulder
            && self.auto_handles == other.auto_handles
    }
}

/// Ordered anchor point list with path-closure awareness.
///
/// Inserting or removing a point recomputes the handles of the point itself
/// and of its two immediate neighbors, since their auto handles may now
/// point at a different neighbor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnchorPoints {
    points: Vec<AnchorPoint>,
    closed: bool,
}

impl AnchorPoints {
    pub fn new(closed: bool) -> Self {
        Self {
            points: Vec::new(),
            closed,
        }
    }

    pub fn from_points(points: Vec<AnchorPoint>, closed: bool) -> Self {
        let mut pts = Self { points, closed };
        for i in 0..pts.len() {
            pts.recompute(i);
        }
        pts
    }

    /// Builds a container from already-computed points, verbatim. Used by
    /// persistence restore and undo replay, which must not re-trigger
    /// handle recomputation.
    pub fn from_raw_points(points: Vec<AnchorPoint>, closed: bool) -> Self {
        Self { points, closed }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn set_closed(&mut self, closed: bool) {
        if self.closed == closed {
            return;
        }
        self.closed = closed;
        // Closure changes who the endpoints' neighbors are.
        if self.len() > 1 {
            let last = self.len() - 1;
            self.invalidate_neighborhood(0);
            self.invalidate_neighborhood(last);
        }
    }

    pub fn point(&self, index: usize) -> &AnchorPoint {
        &self.points[index]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AnchorPoint> {
        self.points.iter()
    }

    /// Index of the previous point; wraps only when the path is closed.
    pub fn prev_index(&self, index: usize) -> Option<usize> {
        if index > 0 {
            Some(index - 1)
        } else if self.closed && self.points.len() > 1 {
            Some(self.points.len() - 1)
        } else {
            None
        }
    }

    /// Index of the next point; wraps only when the path is closed.
    pub fn next_index(&self, index: usize) -> Option<usize> {
        if index + 1 < self.points.len() {
            Some(index + 1)
        } else if self.closed && self.points.len() > 1 {
            Some(0)
        } else {
            None
        }
    }

    pub fn append(&mut self, point: AnchorPoint) -> usize {
        let index = self.points.len();
        self.insert(index, point);
        index
    }

    pub fn insert(&mut self, index: usize, point: AnchorPoint) {
        assert!(index <= self.points.len(), "anchor point index out of range");
        self.points.insert(index, point);
        self.invalidate_neighborhood(index);
    }

    pub fn remove(&mut self, index: usize) -> AnchorPoint {
        assert!(index < self.points.len(), "anchor point index out of range");
        let removed = self.points.remove(index);
        if !self.points.is_empty() {
            // The pair that just became adjacent.
            let at = index.min(self.points.len() - 1);
            self.recompute(at);
            if let Some(prev) = self.prev_index(at) {
                self.recompute(prev);
            }
        }
        removed
    }

    /// Inserts a point verbatim, without recomputing any handles.
    pub fn insert_raw(&mut self, index: usize, point: AnchorPoint) {
        assert!(index <= self.points.len(), "anchor point index out of range");
        self.points.insert(index, point);
    }

    /// Removes a point verbatim, without recomputing any handles.
    pub fn remove_raw(&mut self, index: usize) -> AnchorPoint {
        assert!(index < self.points.len(), "anchor point index out of range");
        self.points.remove(index)
    }

    /// Overwrites a point's geometry verbatim, keeping its selection bit.
    pub fn restore(&mut self, index: usize, point: &AnchorPoint) {
        self.points[index].copy_geometry_from(point);
    }

    pub fn set_selected(&mut self, index: usize, selected: bool) {
        self.points[index].selected = selected;
    }

    /// Sets the corner type along with the shoulder lengths. Entering a
    /// styled corner or Regular resets the shoulders to the given values
    /// (pass zero to leave them unset until explicitly assigned).
    pub fn set_corner_type(&mut self, index: usize, tp: CornerType, cx: f64, cy: f64) {
        {
            let pt = &mut self.points[index];
            pt.corner_type = tp;
            pt.shoulder = if tp == CornerType::Connector || tp == CornerType::Smooth {
                (0.0, 0.0)
            } else {
                (cx, cy)
            };
        }
        self.recompute(index);
        self.invalidate_dependent_neighbors(index);
    }

    /// Toggles automatic handle computation. Connector points are
    /// unaffected by the flag (their handles are always forced).
    pub fn set_auto_handles(&mut self, index: usize, auto: bool) {
        self.points[index].auto_handles = auto;
        if auto {
            self.recompute(index);
        }
    }

    pub fn set_position(&mut self, index: usize, position: Point) {
        let delta = position - self.points[index].position;
        let pt = &mut self.points[index];
        pt.position = position;
        // Manually placed handles travel with the point.
        pt.left_handle = pt.left_handle.map(|h| h + delta);
        pt.right_handle = pt.right_handle.map(|h| h + delta);
        self.recompute(index);
        self.invalidate_dependent_neighbors(index);
    }

    pub fn set_handle(&mut self, index: usize, side: HandleSide, handle: Option<Point>) {
        {
            let pt = &mut self.points[index];
            match side {
                HandleSide::Left => pt.left_handle = handle,
                HandleSide::Right => pt.right_handle = handle,
            }
            // A manually placed handle overrides auto computation.
            if handle.is_some() {
                pt.auto_handles = false;
            }
        }
        // Smooth points re-aim the opposite handle to stay collinear.
        if self.points[index].corner_type == CornerType::Smooth && handle.is_some() {
            self.realign_smooth_opposite(index, side);
        }
        if self.points[index].corner_type == CornerType::Connector {
            self.calculate_connector(index);
        }
    }

    pub fn set_shoulders(&mut self, index: usize, cx: f64, cy: f64) {
        self.points[index].shoulder = (cx, cy);
    }

    /// Applies a transform to every point.
    pub fn transform_all(&mut self, tf: &Transform) {
        for pt in &mut self.points {
            pt.transform(tf);
        }
    }

    /// Bounding extent over positions and handles, as min/max corners.
    /// `None` for an empty container.
    pub fn extents(&self) -> Option<(Point, Point)> {
        let mut min = Point::new(f64::INFINITY, f64::INFINITY);
        let mut max = Point::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
        let mut any = false;
        let mut feed = |p: Point| {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
            any = true;
        };
        for pt in &self.points {
            feed(pt.position);
            if let Some(h) = pt.left_handle {
                feed(h);
            }
            if let Some(h) = pt.right_handle {
                feed(h);
            }
        }
        if any {
            Some((min, max))
        } else {
            None
        }
    }

    /// Recomputes handles for the point and its two immediate neighbors.
    fn invalidate_neighborhood(&mut self, index: usize) {
        let mut affected: SmallVec<[usize; 3]> = SmallVec::new();
        affected.push(index);
        if let Some(prev) = self.prev_index(index) {
            affected.push(prev);
        }
        if let Some(next) = self.next_index(index) {
            affected.push(next);
        }
        for i in affected {
            self.recompute(i);
        }
    }

    /// After a point's own geometry changed, neighbors that derive their
    /// handles from it (auto or Connector) must be recomputed.
    fn invalidate_dependent_neighbors(&mut self, index: usize) {
        let mut affected: SmallVec<[usize; 2]> = SmallVec::new();
        if let Some(prev) = self.prev_index(index) {
            affected.push(prev);
        }
        if let Some(next) = self.next_index(index) {
            affected.push(next);
        }
        for i in affected {
            if i != index
                && (self.points[i].auto_handles
                    || self.points[i].corner_type == CornerType::Connector)
            {
                self.recompute(i);
            }
        }
    }

    /// Recomputes the auto-calculated handles of one point.
    /// Priority: Connector > auto > Smooth.
    pub(crate) fn recompute(&mut self, index: usize) {
        let pt = &self.points[index];
        if pt.corner_type == CornerType::Connector {
            self.calculate_connector(index);
        } else if pt.auto_handles {
            self.calculate_auto_handles(index);
        } else if pt.corner_type == CornerType::Smooth {
            self.calculate_smooth(index);
        }
    }

    /// Connector handles stay aligned with the adjacent segments: the right
    /// handle continues the incoming edge (away from the previous point),
    /// the left handle extends backwards along the outgoing edge (away from
    /// the next point). Both handles are always present afterwards; a
    /// missing neighbor side mirrors the other handle's direction.
    fn calculate_connector(&mut self, index: usize) {
        let pos = self.points[index].position;
        let prev_dir = self
            .prev_index(index)
            .and_then(|i| (pos - self.points[i].position).normalized());
        let next_dir = self
            .next_index(index)
            .and_then(|i| (pos - self.points[i].position).normalized());

        let (right, left) = match (prev_dir, next_dir) {
            (Some(pd), Some(nd)) => (pd, nd),
            // No previous point: the right handle mirrors the left one.
            (None, Some(nd)) => (-nd, nd),
            // No next point: the left handle mirrors the right one.
            (Some(pd), None) => (pd, -pd),
            (None, None) => {
                warn!("connector point with no usable neighbors, handles collapsed");
                let pt = &mut self.points[index];
                pt.left_handle = Some(pos);
                pt.right_handle = Some(pos);
                return;
            }
        };

        let pt = &mut self.points[index];
        pt.right_handle = Some(pos + right * CONNECTOR_HANDLE_LEN);
        pt.left_handle = Some(pos + left * CONNECTOR_HANDLE_LEN);
    }

    /// Smooth handles are aimed along the chord between the two neighbors,
    /// using the neighbor positions at the time of the call. Each handle
    /// keeps its previous length; a handle that did not exist yet gets
    /// `HANDLE_COEFF` of the distance to its neighbor.
    fn calculate_smooth(&mut self, index: usize) {
        let pos = self.points[index].position;
        let prev = self.prev_index(index).map(|i| self.points[i].position);
        let next = self.next_index(index).map(|i| self.points[i].position);

        let tangent = match (prev, next) {
            (Some(p), Some(n)) => (n - p).normalized(),
            (None, Some(n)) => (n - pos).normalized(),
            (Some(p), None) => (pos - p).normalized(),
            (None, None) => None,
        };
        let Some(tangent) = tangent else {
            warn!("degenerate chord for smooth point, keeping handles");
            return;
        };

        let left_len = self.points[index]
            .left_handle
            .map(|h| pos.distance_to(&h))
            .unwrap_or_else(|| prev.map(|p| pos.distance_to(&p) * HANDLE_COEFF).unwrap_or(0.0));
        let right_len = self.points[index]
            .right_handle
            .map(|h| pos.distance_to(&h))
            .unwrap_or_else(|| next.map(|n| pos.distance_to(&n) * HANDLE_COEFF).unwrap_or(0.0));

        let pt = &mut self.points[index];
        pt.left_handle = Some(pos - tangent * left_len);
        pt.right_handle = Some(pos + tangent * right_len);
    }

    /// Re-aims the handle opposite to `moved` so a Smooth point stays
    /// collinear, preserving the opposite handle's length.
    fn realign_smooth_opposite(&mut self, index: usize, moved: HandleSide) {
        let pos = self.points[index].position;
        let (lead, follow) = match moved {
            HandleSide::Left => (self.points[index].left_handle, self.points[index].right_handle),
            HandleSide::Right => (self.points[index].right_handle, self.points[index].left_handle),
        };
        let (Some(lead), Some(follow)) = (lead, follow) else {
            return;
        };
        let Some(dir) = (pos - lead).normalized() else {
            return;
        };
        let len = pos.distance_to(&follow);
        let realigned = Some(pos + dir * len);
        match moved {
            HandleSide::Left => self.points[index].right_handle = realigned,
            HandleSide::Right => self.points[index].left_handle = realigned,
        }
    }

    /// Auto handles are tangent to the circumcircle through the point and
    /// its two neighbors: the tangent at the point is perpendicular to the
    /// radius, the per-side handle length is `HANDLE_COEFF` of the chord to
    /// that neighbor, and the perpendicular's sign is chosen by a
    /// side-of-segment test against the neighbors' midpoint. For an
    /// endpoint only the available side is computed; degenerate input
    /// (collinear or coincident points) skips the recompute.
    fn calculate_auto_handles(&mut self, index: usize) {
        let pos = self.points[index].position;
        let prev = self.prev_index(index).map(|i| self.points[i].position);
        let next = self.next_index(index).map(|i| self.points[i].position);

        match (prev, next) {
            (Some(prev), Some(next)) => {
                let Some(center) = circumcircle_center(prev, pos, next) else {
                    warn!("collinear auto-handle input, skipping recompute");
                    return;
                };
                let radius = pos.distance_to(&center);
                // radius > 0 since the center cannot coincide with a vertex
                let mut d = Point::new((pos.y - center.y) / radius, (center.x - pos.x) / radius);

                let mid = prev.mid(&next);
                if segment_side(pos, mid, prev) != segment_side(pos, mid, pos - d) {
                    d = -d;
                }

                let left_len = pos.distance_to(&prev) * HANDLE_COEFF;
                let right_len = pos.distance_to(&next) * HANDLE_COEFF;
                let pt = &mut self.points[index];
                pt.left_handle = Some(pos - d * left_len);
                pt.right_handle = Some(pos + d * right_len);
            }
            (Some(prev), None) => {
                if is_equal_eps(pos.distance_to(&prev), 0.0) {
                    return;
                }
                self.points[index].left_handle = Some(pos + (prev - pos) * HANDLE_COEFF);
            }
            (None, Some(next)) => {
                if is_equal_eps(pos.distance_to(&next), 0.0) {
                    return;
                }
                self.points[index].right_handle = Some(pos + (next - pos) * HANDLE_COEFF);
            }
            (None, None) => {}
        }
    }

    /// Geometry equality ignoring selection bits.
    pub fn same_geometry(&self, other: &AnchorPoints) -> bool {
        self.closed == other.closed
            && self.points.len() == other.points.len()
            && self
                .points
                .iter()
                .zip(other.points.iter())
                .all(|(a, b)| a.same_geometry(b))
    }
}

/// The geometry payload of a path element.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathData {
    pub anchor_points: AnchorPoints,
}

impl PathData {
    pub fn new(points: Vec<AnchorPoint>, closed: bool) -> Self {
        Self {
            anchor_points: AnchorPoints::from_points(points, closed),
        }
    }

    /// Emits the path outline as cubic segments. Handles act as control
    /// points; a segment with no handles on either side degenerates to a
    /// line. Styled corners are rendered as plain joins; corner shaping is
    /// the render backend's business.
    pub fn to_lyon_path(&self, tf: &Transform) -> lyon::path::Path {
        use lyon::math::point;

        let pts = &self.anchor_points;
        let mut builder = lyon::path::Path::builder();
        if pts.is_empty() {
            return builder.build();
        }

        let map = |p: Point| {
            let m = tf.map_point(p);
            point(m.x as f32, m.y as f32)
        };

        let first = pts.point(0);
        builder.begin(map(first.position));

        let segment_count = if pts.is_closed() {
            pts.len()
        } else {
            pts.len().saturating_sub(1)
        };
        for i in 0..segment_count {
            let from = pts.point(i);
            let to = pts.point((i + 1) % pts.len());
            match (from.right_handle, to.left_handle) {
                (None, None) => {
                    builder.line_to(map(to.position));
                }
                (c1, c2) => {
                    builder.cubic_bezier_to(
                        map(c1.unwrap_or(from.position)),
                        map(c2.unwrap_or(to.position)),
                        map(to.position),
                    );
                }
            }
        }
        builder.end(pts.is_closed());
        builder.build()
    }
}
