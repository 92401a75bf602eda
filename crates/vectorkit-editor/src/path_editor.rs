//! Per-path editing state: anchor part selection and the preview engine.
//!
//! While anchor points are dragged, edits land on a detached *preview*
//! copy instead of the scene. For a single contiguous selected run the
//! preview is a partial window (the run plus one unselected neighbor on
//! each side); anything trickier falls back to a full copy. Applying the
//! preview copies edited geometry back through the index map.

use std::collections::BTreeMap;

use tracing::trace;
use vectorkit_core::{Point, Transform};
use vectorkit_scene::{AnchorPoint, AnchorPoints, HandleSide, NodeId};

/// A detached working copy of (part of) a path's anchor points.
#[derive(Debug)]
pub struct PathPreview {
    pub points: AnchorPoints,
    /// Whether the preview covers the whole path.
    pub full: bool,
    /// Preview index -> source index.
    index_map: BTreeMap<usize, usize>,
}

impl PathPreview {
    pub fn source_index(&self, preview_index: usize) -> Option<usize> {
        self.index_map.get(&preview_index).copied()
    }

    pub fn preview_index(&self, source_index: usize) -> Option<usize> {
        self.index_map
            .iter()
            .find(|(_, &s)| s == source_index)
            .map(|(&p, _)| p)
    }

    /// (source index, geometry) pairs for writing the preview back.
    pub fn mapped_points(&self) -> Vec<(usize, AnchorPoint)> {
        self.index_map
            .iter()
            .map(|(&p, &s)| (s, self.points.point(p).clone()))
            .collect()
    }
}

/// Editing state attached to one selected path element.
#[derive(Debug)]
pub struct PathEditor {
    path: NodeId,
    preview: Option<PathPreview>,
}

impl PathEditor {
    pub fn new(path: NodeId) -> Self {
        Self {
            path,
            preview: None,
        }
    }

    pub fn path(&self) -> NodeId {
        self.path
    }

    pub fn preview(&self) -> Option<&PathPreview> {
        self.preview.as_ref()
    }

    /// Selected source indices, in point order.
    pub fn part_selection(&self, source: &AnchorPoints) -> Vec<usize> {
        source
            .iter()
            .enumerate()
            .filter(|(_, p)| p.selected)
            .map(|(i, _)| i)
            .collect()
    }

    /// Makes sure a preview exists, building the partial window from the
    /// current part selection when possible.
    pub fn ensure_preview(&mut self, source: &AnchorPoints) {
        if self.preview.is_some() {
            return;
        }
        self.preview = Some(match self.partial_window(source) {
            Some(window) => {
                trace!(path = %self.path, len = window.len(), "partial preview window");
                let points: Vec<AnchorPoint> = window
                    .iter()
                    .map(|&s| source.point(s).clone())
                    .collect();
                let index_map = window.iter().enumerate().map(|(p, &s)| (p, s)).collect();
                PathPreview {
                    // A window is a fragment, never closed.
                    points: AnchorPoints::from_raw_points(points, false),
                    full: false,
                    index_map,
                }
            }
            None => Self::full_preview(source),
        });
    }

    /// Grows the preview to cover the whole path, keeping edits already
    /// made to mapped points and remapping indices.
    pub fn extend_preview_to_full(&mut self, source: &AnchorPoints) {
        let existing = self.preview.take();
        let mut full = Self::full_preview(source);
        if let Some(prev) = existing {
            if prev.full {
                self.preview = Some(prev);
                return;
            }
            for (src, geometry) in prev.mapped_points() {
                full.points.restore(src, &geometry);
            }
        }
        trace!(path = %self.path, "preview extended to full");
        self.preview = Some(full);
    }

    pub fn reset_preview(&mut self) {
        self.preview = None;
    }

    /// Consumes the preview, returning the (source index, geometry) pairs
    /// the caller must write back.
    pub fn take_preview(&mut self) -> Vec<(usize, AnchorPoint)> {
        self.preview
            .take()
            .map(|p| p.mapped_points())
            .unwrap_or_default()
    }

    // ---- preview edits ----------------------------------------------------

    pub fn move_point(&mut self, source: &AnchorPoints, source_index: usize, pos: Point) {
        let pi = self.mapped_or_full(source, source_index);
        if let Some(preview) = &mut self.preview {
            preview.points.set_position(pi, pos);
        }
    }

    pub fn move_handle(
        &mut self,
        source: &AnchorPoints,
        source_index: usize,
        side: HandleSide,
        handle: Option<Point>,
    ) {
        let pi = self.mapped_or_full(source, source_index);
        if let Some(preview) = &mut self.preview {
            preview.points.set_handle(pi, side, handle);
        }
    }

    pub fn move_shoulder(&mut self, source: &AnchorPoints, source_index: usize, cl: f64, cr: f64) {
        let pi = self.mapped_or_full(source, source_index);
        if let Some(preview) = &mut self.preview {
            preview.points.set_shoulders(pi, cl, cr);
        }
    }

    /// Transforms the whole path, which always needs the full preview.
    pub fn transform_preview(&mut self, source: &AnchorPoints, tf: &Transform) {
        self.ensure_preview(source);
        self.extend_preview_to_full(source);
        if let Some(preview) = &mut self.preview {
            preview.points.transform_all(tf);
        }
    }

    fn mapped_or_full(&mut self, source: &AnchorPoints, source_index: usize) -> usize {
        self.ensure_preview(source);
        if self
            .preview
            .as_ref()
            .and_then(|p| p.preview_index(source_index))
            .is_none()
        {
            self.extend_preview_to_full(source);
        }
        self.preview
            .as_ref()
            .and_then(|p| p.preview_index(source_index))
            .expect("full preview maps every source index")
    }

    // ---- window construction ----------------------------------------------

    fn full_preview(source: &AnchorPoints) -> PathPreview {
        let points: Vec<AnchorPoint> = source.iter().cloned().collect();
        let index_map = (0..points.len()).map(|i| (i, i)).collect();
        PathPreview {
            points: AnchorPoints::from_raw_points(points, source.is_closed()),
            full: true,
            index_map,
        }
    }

    /// The partial window as source indices, or `None` when a full preview
    /// is required.
    fn partial_window(&self, source: &AnchorPoints) -> Option<Vec<usize>> {
        let n = source.len();
        let selected: Vec<bool> = source.iter().map(|p| p.selected).collect();
        let count = selected.iter().filter(|&&s| s).count();
        if count == 0 || count == n {
            return None;
        }

        // The run must be contiguous: exactly one selected point whose
        // predecessor is unselected (wrap-aware on closed paths).
        let is_run_start = |i: usize| {
            selected[i]
                && match source.prev_index(i) {
                    Some(p) => !selected[p],
                    None => true,
                }
        };
        let starts: Vec<usize> = (0..n).filter(|&i| is_run_start(i)).collect();
        if starts.len() != 1 {
            return None;
        }
        let first = starts[0];
        let mut last = first;
        while let Some(next) = source.next_index(last) {
            if !selected[next] || next == first {
                break;
            }
            last = next;
        }

        // One unselected neighbor on each side; a missing side (open path
        // endpoint selected) forces the full preview.
        let before = source.prev_index(first).filter(|&i| !selected[i])?;
        let after = source.next_index(last).filter(|&i| !selected[i])?;
        if before == after {
            return None;
        }
        // Boundary points with auto handles would recompute against
        // neighbors outside the window.
        if source.point(before).auto_handles || source.point(after).auto_handles {
            return None;
        }

        let mut window = vec![before];
        let mut i = first;
        loop {
            window.push(i);
            if i == last {
                break;
            }
            i = source.next_index(i).expect("run is contiguous");
        }
        window.push(after);
        Some(window)
    }
}
