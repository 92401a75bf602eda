//! The editor: selection, transactional mutation recording, bounded
//! undo/redo, page/layer focus and temporary selection transforms.
//!
//! Every scene mutation that should be undoable goes through an editor
//! method so the matching [`EditAction`] is recorded into the open
//! transaction. Undo and redo are pure replays of recorded actions; they
//! never open transactions themselves.

use std::collections::{HashMap, VecDeque};

use tracing::debug;
use vectorkit_core::Transform;
use vectorkit_scene::{
    AnchorPoint, AnchorPoints, CornerType, HandleSide, Node, NodeFlag, NodeId, NodeKind,
    PropertyValue, Scene, StyleSet,
};

use crate::path_editor::PathEditor;
use crate::transaction::{EditAction, SelectionSnapshot, Transaction, UndoState};

/// Tuning knobs for an editor instance.
#[derive(Debug, Clone)]
pub struct EditorOptions {
    /// Oldest undo entries are evicted beyond this bound.
    pub max_undo_steps: usize,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self { max_undo_steps: 20 }
    }
}

/// Notifications queued for the embedding UI, drained with
/// [`Editor::take_events`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorEvent {
    SelectionChanged,
    HistoryChanged,
    CurrentPageChanged,
    CurrentLayerChanged,
}

/// Editing session over one scene.
pub struct Editor {
    scene: Scene,
    options: EditorOptions,
    selection: Vec<NodeId>,
    transaction: Option<Transaction>,
    undo_states: VecDeque<UndoState>,
    redo_states: Vec<UndoState>,
    current_page: Option<NodeId>,
    current_layer: Option<NodeId>,
    temp_transforms: HashMap<NodeId, Transform>,
    path_editors: HashMap<NodeId, PathEditor>,
    events: Vec<EditorEvent>,
}

impl Editor {
    pub fn new(scene: Scene) -> Self {
        Self::with_options(scene, EditorOptions::default())
    }

    pub fn with_options(scene: Scene, options: EditorOptions) -> Self {
        let mut editor = Self {
            scene,
            options,
            selection: Vec::new(),
            transaction: None,
            undo_states: VecDeque::new(),
            redo_states: Vec::new(),
            current_page: None,
            current_layer: None,
            temp_transforms: HashMap::new(),
            path_editors: HashMap::new(),
            events: Vec::new(),
        };
        if let Some(&page) = editor.scene.pages().first() {
            editor.current_page = Some(page);
            editor.current_layer = editor.first_layer_of(page);
        }
        editor
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Mutable scene access for queries (box getters cache lazily). Going
    /// around the editor for mutations makes them unrecorded and thus not
    /// undoable.
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn selection(&self) -> &[NodeId] {
        &self.selection
    }

    pub fn current_page(&self) -> Option<NodeId> {
        self.current_page
    }

    pub fn current_layer(&self) -> Option<NodeId> {
        self.current_layer
    }

    pub fn path_editor(&self, path: NodeId) -> Option<&PathEditor> {
        self.path_editors.get(&path)
    }

    pub fn take_events(&mut self) -> Vec<EditorEvent> {
        std::mem::take(&mut self.events)
    }

    fn first_layer_of(&self, page: NodeId) -> Option<NodeId> {
        self.scene
            .children(page)
            .iter()
            .copied()
            .find(|&c| matches!(self.scene.node(c).kind, NodeKind::Layer))
    }

    // ---- transactions -------------------------------------------------------

    pub fn has_open_transaction(&self) -> bool {
        self.transaction.is_some()
    }

    /// Opens a transaction, snapshotting the current selection. Nesting is
    /// a programming error and panics.
    pub fn begin_transaction(&mut self) {
        assert!(
            self.transaction.is_none(),
            "a transaction is already open; transactions do not nest"
        );
        debug!("transaction opened");
        self.transaction = Some(Transaction {
            actions: Vec::new(),
            selection_before: self.selection_snapshot(),
        });
    }

    /// Closes the open transaction into an undo state. An empty
    /// transaction is dropped silently. Panics when none is open.
    pub fn commit_transaction(&mut self, label: &str) {
        let tx = self
            .transaction
            .take()
            .expect("commit_transaction without an open transaction");
        if tx.actions.is_empty() {
            debug!("empty transaction dropped");
            return;
        }
        debug!(label, actions = tx.actions.len(), "transaction committed");
        let state = UndoState {
            label: label.to_string(),
            actions: tx.actions,
            selection_before: tx.selection_before,
            selection_after: self.selection_snapshot(),
        };
        self.push_undo(state);
    }

    /// Abandons the open transaction, reverting everything it recorded and
    /// restoring the selection it captured.
    pub fn rollback_transaction(&mut self) {
        let mut tx = self
            .transaction
            .take()
            .expect("rollback_transaction without an open transaction");
        debug!(actions = tx.actions.len(), "transaction rolled back");
        for action in tx.actions.iter_mut().rev() {
            action.revert(&mut self.scene);
        }
        let snapshot = tx.selection_before;
        self.restore_selection(&snapshot);
    }

    /// Pushes a ready-made undo entry, for callers that assembled their
    /// actions outside a transaction. Clears the redo stack like a commit.
    pub fn push_state(&mut self, label: &str, actions: Vec<EditAction>) {
        if actions.is_empty() {
            return;
        }
        let snapshot = self.selection_snapshot();
        self.push_undo(UndoState {
            label: label.to_string(),
            actions,
            selection_before: snapshot.clone(),
            selection_after: snapshot,
        });
    }

    fn push_undo(&mut self, state: UndoState) {
        self.undo_states.push_back(state);
        while self.undo_states.len() > self.options.max_undo_steps {
            let evicted = self.undo_states.pop_front();
            debug!(
                label = evicted.map(|s| s.label).as_deref().unwrap_or(""),
                "undo entry evicted"
            );
        }
        self.redo_states.clear();
        self.events.push(EditorEvent::HistoryChanged);
    }

    fn record(&mut self, action: EditAction) {
        if let Some(tx) = &mut self.transaction {
            tx.actions.push(action);
        }
    }

    // ---- undo / redo ----------------------------------------------------------

    pub fn has_undo_state(&self) -> bool {
        !self.undo_states.is_empty()
    }

    pub fn has_redo_state(&self) -> bool {
        !self.redo_states.is_empty()
    }

    pub fn undo_state_name(&self) -> Option<&str> {
        self.undo_states.back().map(|s| s.label.as_str())
    }

    pub fn redo_state_name(&self) -> Option<&str> {
        self.redo_states.last().map(|s| s.label.as_str())
    }

    /// Replays the newest undo entry backward. Returns whether anything
    /// was undone. Panics when called with an open transaction.
    pub fn undo_state(&mut self) -> bool {
        assert!(
            self.transaction.is_none(),
            "cannot undo with an open transaction"
        );
        let Some(mut state) = self.undo_states.pop_back() else {
            return false;
        };
        debug!(label = %state.label, "undo");
        for action in state.actions.iter_mut().rev() {
            action.revert(&mut self.scene);
        }
        let snapshot = state.selection_before.clone();
        self.restore_selection(&snapshot);
        self.redo_states.push(state);
        self.events.push(EditorEvent::HistoryChanged);
        true
    }

    /// Replays the newest redo entry forward.
    pub fn redo_state(&mut self) -> bool {
        assert!(
            self.transaction.is_none(),
            "cannot redo with an open transaction"
        );
        let Some(mut state) = self.redo_states.pop() else {
            return false;
        };
        debug!(label = %state.label, "redo");
        for action in state.actions.iter_mut() {
            action.apply(&mut self.scene);
        }
        let snapshot = state.selection_after.clone();
        self.restore_selection(&snapshot);
        self.undo_states.push_back(state);
        self.events.push(EditorEvent::HistoryChanged);
        true
    }

    // ---- selection --------------------------------------------------------------

    fn selection_snapshot(&self) -> SelectionSnapshot {
        SelectionSnapshot {
            elements: self.selection.clone(),
            path_parts: self
                .path_editors
                .iter()
                .map(|(&id, pe)| {
                    let parts = self
                        .scene
                        .node(id)
                        .path_data()
                        .map(|d| pe.part_selection(&d.anchor_points))
                        .unwrap_or_default();
                    (id, parts)
                })
                .filter(|(_, parts)| !parts.is_empty())
                .collect(),
        }
    }

    fn restore_selection(&mut self, snapshot: &SelectionSnapshot) {
        let current: Vec<NodeId> = self.selection.clone();
        for id in current {
            if !snapshot.elements.contains(&id) {
                self.set_selected(id, false);
            }
        }
        for &id in &snapshot.elements {
            self.set_selected(id, true);
        }
        for &(path, ref parts) in &snapshot.path_parts {
            if !self.scene.contains(path) {
                continue;
            }
            let len = self
                .scene
                .node(path)
                .path_data()
                .map(|d| d.anchor_points.len())
                .unwrap_or(0);
            for i in 0..len {
                self.scene.set_anchor_selected(path, i, parts.contains(&i));
            }
            if let Some(pe) = self.path_editors.get_mut(&path) {
                pe.reset_preview();
            }
        }
    }

    /// Selects exactly `ids` (or toggles each of them). Selection
    /// membership always follows the `Selected` flag: setting the flag
    /// opens a per-element editor where one applies, clearing it closes
    /// it.
    pub fn update_selection(&mut self, toggle: bool, ids: &[NodeId]) {
        if toggle {
            for &id in ids {
                let selected = self.scene.node(id).flags.has(NodeFlag::Selected);
                self.set_selected(id, !selected);
            }
        } else {
            let current: Vec<NodeId> = self.selection.clone();
            for id in current {
                if !ids.contains(&id) {
                    self.set_selected(id, false);
                }
            }
            for &id in ids {
                self.set_selected(id, true);
            }
        }
    }

    fn set_selected(&mut self, id: NodeId, selected: bool) {
        if !self.scene.contains(id) {
            // Replays may detach nodes behind the editor's back; drop any
            // state still pointing at them.
            self.selection.retain(|&s| s != id);
            self.path_editors.remove(&id);
            self.temp_transforms.remove(&id);
            return;
        }
        self.scene.set_flag(id, NodeFlag::Selected, selected);
        // A re-inserted subtree can carry a stale flag, so membership is
        // synced from the selection list, not from the flag change.
        if selected == self.selection.contains(&id) {
            return;
        }
        if selected {
            self.selection.push(id);
            if matches!(self.scene.node(id).kind, NodeKind::Path(_)) {
                self.path_editors.entry(id).or_insert_with(|| PathEditor::new(id));
            }
        } else {
            self.selection.retain(|&s| s != id);
            self.path_editors.remove(&id);
            self.temp_transforms.remove(&id);
            if let Some(data) = self.scene.node(id).path_data() {
                let len = data.anchor_points.len();
                for i in 0..len {
                    self.scene.set_anchor_selected(id, i, false);
                }
            }
        }
        self.events.push(EditorEvent::SelectionChanged);
    }

    // ---- recorded mutation surface ---------------------------------------------

    /// Inserts a node and records the insertion.
    pub fn insert_node(&mut self, parent: NodeId, before: Option<NodeId>, node: Node) -> NodeId {
        let id = self.scene.insert_child(parent, before, node);
        self.record(EditAction::InsertNode {
            id,
            parent,
            before,
            subtree: None,
        });
        id
    }

    /// Removes a subtree and records the removal. Removing the current
    /// page promotes its previous sibling page, then its next; removing
    /// the last page is a programming error and panics.
    pub fn remove_node(&mut self, id: NodeId) {
        if matches!(self.scene.node(id).kind, NodeKind::Page) {
            let pages = self.scene.pages();
            assert!(
                pages.len() > 1 || !pages.contains(&id),
                "cannot remove the last page"
            );
            if self.current_page == Some(id) {
                let at = pages.iter().position(|&p| p == id).unwrap_or(0);
                let promoted = if at > 0 { pages[at - 1] } else { pages[at + 1] };
                self.set_current_page(promoted);
            }
        }

        // Drop selection state living inside the removed subtree.
        let selected: Vec<NodeId> = self.selection.clone();
        for sel in selected {
            if sel == id || self.has_ancestor(sel, id) {
                self.set_selected(sel, false);
            }
        }
        if let Some(layer) = self.current_layer {
            if layer == id || self.has_ancestor(layer, id) {
                self.current_layer = None;
            }
        }

        let parent = self.scene.parent(id).expect("cannot remove the scene root");
        let before = self.scene.next_sibling(id);
        let subtree = self.scene.remove_subtree(id);
        self.record(EditAction::RemoveNode {
            id,
            parent,
            before,
            subtree: Some(subtree),
        });

        if self.current_layer.is_none() {
            if let Some(page) = self.current_page {
                self.current_layer = self.first_layer_of(page);
            }
        }
    }

    fn has_ancestor(&self, id: NodeId, ancestor: NodeId) -> bool {
        let mut current = self.scene.parent(id);
        while let Some(p) = current {
            if p == ancestor {
                return true;
            }
            current = self.scene.parent(p);
        }
        false
    }

    /// Sets properties and records old/new values.
    pub fn set_properties(&mut self, id: NodeId, names: &[String], values: &[PropertyValue]) {
        let old = self.scene.set_properties(id, names, values);
        self.record(EditAction::SetProperties {
            id,
            names: names.to_vec(),
            new_values: values.to_vec(),
            old_values: old,
        });
    }

    /// Sets a flag and records the change. The `Selected` flag is
    /// selection state and routes through the selection machinery instead
    /// of the history.
    pub fn set_flag(&mut self, id: NodeId, flag: NodeFlag, set: bool) {
        if flag == NodeFlag::Selected {
            self.set_selected(id, set);
            return;
        }
        if self.scene.set_flag(id, flag, set) {
            self.record(EditAction::SetFlag { id, flag, set });
        }
    }

    // ---- element level operations ------------------------------------------------

    /// Inserts elements into the current layer (or page), gives them the
    /// initial style, selects them, and wraps the whole thing in an
    /// "Insert Element(s)" transaction. Both the styling and the
    /// transaction can be suppressed.
    pub fn insert_elements(
        &mut self,
        nodes: Vec<Node>,
        no_initial_properties: bool,
        no_transaction: bool,
    ) -> Vec<NodeId> {
        let target = self
            .current_layer
            .or(self.current_page)
            .expect("no page to insert elements into");
        if !no_transaction {
            self.begin_transaction();
        }
        let mut ids = Vec::with_capacity(nodes.len());
        for mut node in nodes {
            if !no_initial_properties
                && node.kind.has_style()
                && node.style == StyleSet::default()
            {
                node.style = StyleSet::initial();
            }
            ids.push(self.insert_node(target, None, node));
        }
        self.update_selection(false, &ids);
        if !no_transaction {
            self.commit_transaction("Insert Element(s)");
        }
        ids
    }

    pub fn set_current_page(&mut self, page: NodeId) {
        assert!(
            matches!(self.scene.node(page).kind, NodeKind::Page),
            "{page} is not a page"
        );
        if self.current_page == Some(page) {
            return;
        }
        self.current_page = Some(page);
        self.current_layer = self.first_layer_of(page);
        self.events.push(EditorEvent::CurrentPageChanged);
    }

    pub fn set_current_layer(&mut self, layer: NodeId) {
        assert!(
            matches!(self.scene.node(layer).kind, NodeKind::Layer),
            "{layer} is not a layer"
        );
        if self.current_layer == Some(layer) {
            return;
        }
        self.current_layer = Some(layer);
        self.events.push(EditorEvent::CurrentLayerChanged);
    }

    /// Removes every selected element inside one transaction.
    pub fn delete_selection(&mut self) {
        if self.selection.is_empty() {
            return;
        }
        self.begin_transaction();
        let ids: Vec<NodeId> = self.selection.clone();
        for id in ids {
            if self.scene.contains(id) {
                self.remove_node(id);
            }
        }
        self.commit_transaction("Delete Selection");
    }

    // ---- selection transform -------------------------------------------------------

    /// Accumulates a temporary transform on every transformable selected
    /// element. Nothing touches the scene until the transform is applied.
    pub fn transform_selection(&mut self, tf: &Transform) {
        for &id in &self.selection {
            if !self.scene.node(id).kind.can_transform() {
                continue;
            }
            let entry = self
                .temp_transforms
                .entry(id)
                .or_insert_with(Transform::identity);
            *entry = entry.multiplied(tf);
        }
    }

    pub fn pending_transform(&self, id: NodeId) -> Option<&Transform> {
        self.temp_transforms.get(&id)
    }

    /// Commits accumulated transforms to the `trf` property inside a
    /// transaction, optionally onto freshly inserted clones instead of the
    /// originals. Temporary state is reset either way.
    pub fn apply_selection_transform(&mut self, clone: bool) {
        let pending: Vec<(NodeId, Transform)> = self
            .selection
            .iter()
            .filter_map(|&id| self.temp_transforms.get(&id).map(|t| (id, *t)))
            .collect();
        self.temp_transforms.clear();
        if pending.is_empty() {
            return;
        }

        self.begin_transaction();
        let mut targets = Vec::with_capacity(pending.len());
        for (id, tf) in pending {
            if !self.scene.node(id).kind.can_transform() {
                continue;
            }
            let target = if clone {
                let parent = self.scene.parent(id).expect("selected node has a parent");
                let copy = self.scene.duplicate_subtree(id);
                let copy_root = self.scene.insert_subtree(parent, None, copy);
                self.record(EditAction::InsertNode {
                    id: copy_root,
                    parent,
                    before: None,
                    subtree: None,
                });
                copy_root
            } else {
                id
            };
            let new_trf = self.scene.node(target).local_transform().multiplied(&tf);
            self.set_properties(
                target,
                &["trf".into()],
                &[PropertyValue::TransformVal(new_trf)],
            );
            targets.push(target);
        }
        if clone {
            self.update_selection(false, &targets);
            self.commit_transaction("Duplicate & Transform");
        } else {
            self.commit_transaction("Transform Selection");
        }
    }

    // ---- path editing ---------------------------------------------------------------

    fn anchor_points(&self, path: NodeId) -> AnchorPoints {
        self.scene
            .node(path)
            .path_data()
            .expect("node is not a path")
            .anchor_points
            .clone()
    }

    /// Selects exactly (or toggles) the given anchor indices of a path.
    /// Changing the part selection discards any live preview.
    pub fn update_part_selection(&mut self, path: NodeId, toggle: bool, indices: &[usize]) {
        let len = self.anchor_points(path).len();
        for i in 0..len {
            let selected = self
                .scene
                .node(path)
                .path_data()
                .map(|d| d.anchor_points.point(i).selected)
                .unwrap_or(false);
            let next = if toggle {
                if indices.contains(&i) {
                    !selected
                } else {
                    selected
                }
            } else {
                indices.contains(&i)
            };
            if next != selected {
                self.scene.set_anchor_selected(path, i, next);
            }
        }
        if let Some(pe) = self.path_editors.get_mut(&path) {
            pe.reset_preview();
        }
    }

    /// Runs a closure against the path's preview via its editor.
    fn with_path_editor<R>(
        &mut self,
        path: NodeId,
        f: impl FnOnce(&mut PathEditor, &AnchorPoints) -> R,
    ) -> R {
        let source = self.anchor_points(path);
        let pe = self
            .path_editors
            .get_mut(&path)
            .expect("path is not selected, no editor is open");
        f(pe, &source)
    }

    pub fn preview_move_point(&mut self, path: NodeId, index: usize, pos: vectorkit_core::Point) {
        self.with_path_editor(path, |pe, src| pe.move_point(src, index, pos));
    }

    pub fn preview_move_handle(
        &mut self,
        path: NodeId,
        index: usize,
        side: HandleSide,
        handle: Option<vectorkit_core::Point>,
    ) {
        self.with_path_editor(path, |pe, src| pe.move_handle(src, index, side, handle));
    }

    pub fn preview_move_shoulder(&mut self, path: NodeId, index: usize, cl: f64, cr: f64) {
        self.with_path_editor(path, |pe, src| pe.move_shoulder(src, index, cl, cr));
    }

    pub fn preview_transform(&mut self, path: NodeId, tf: &Transform) {
        self.with_path_editor(path, |pe, src| pe.transform_preview(src, tf));
    }

    /// Writes the preview back to the source path inside the caller's
    /// transaction and releases it.
    pub fn apply_preview(&mut self, path: NodeId) {
        let written = self
            .path_editors
            .get_mut(&path)
            .map(|pe| pe.take_preview())
            .unwrap_or_default();
        for (index, new) in written {
            let old = self
                .scene
                .node(path)
                .path_data()
                .expect("node is not a path")
                .anchor_points
                .point(index)
                .clone();
            self.write_anchor_point(path, index, old, new);
        }
    }

    pub fn reset_preview(&mut self, path: NodeId) {
        if let Some(pe) = self.path_editors.get_mut(&path) {
            pe.reset_preview();
        }
    }

    fn write_anchor_point(&mut self, path: NodeId, index: usize, old: AnchorPoint, new: AnchorPoint) {
        if old.same_geometry(&new) {
            return;
        }
        {
            let new = new.clone();
            self.scene
                .edit_path(path, |data| data.anchor_points.restore(index, &new));
        }
        self.record(EditAction::SetAnchorPoint {
            path,
            index,
            new,
            old,
        });
    }

    /// Applies an anchor container edit and records raw per-point diffs,
    /// so replay restores exact geometry without re-running handle
    /// recomputation.
    fn edit_anchor_points(
        &mut self,
        path: NodeId,
        f: impl FnOnce(&mut AnchorPoints),
    ) {
        let before = self.anchor_points(path);
        self.scene.edit_path(path, |data| f(&mut data.anchor_points));
        let after = self.anchor_points(path);
        assert_eq!(
            before.len(),
            after.len(),
            "edit_anchor_points cannot change the point count"
        );
        for i in 0..after.len() {
            let old = before.point(i).clone();
            let new = after.point(i).clone();
            self.write_anchor_point_recorded_only(path, i, old, new);
        }
        if before.is_closed() != after.is_closed() {
            self.record(EditAction::SetPathClosed {
                path,
                closed: after.is_closed(),
            });
        }
    }

    fn write_anchor_point_recorded_only(
        &mut self,
        path: NodeId,
        index: usize,
        old: AnchorPoint,
        new: AnchorPoint,
    ) {
        if old.same_geometry(&new) {
            return;
        }
        self.record(EditAction::SetAnchorPoint {
            path,
            index,
            new,
            old,
        });
    }

    /// Inserts an anchor point, recording the insertion plus the neighbor
    /// handles it recomputed.
    pub fn insert_anchor_point(&mut self, path: NodeId, index: usize, point: AnchorPoint) {
        let before = self.anchor_points(path);
        self.scene
            .edit_path(path, |data| data.anchor_points.insert(index, point));
        let after = self.anchor_points(path);

        self.record(EditAction::InsertAnchorPoint {
            path,
            index,
            point: after.point(index).clone(),
        });
        for j in 0..before.len() {
            let j_after = if j < index { j } else { j + 1 };
            let old = before.point(j).clone();
            let new = after.point(j_after).clone();
            self.write_anchor_point_recorded_only(path, j_after, old, new);
        }
    }

    /// Removes an anchor point, recording the removal plus the neighbor
    /// handles it recomputed.
    pub fn remove_anchor_point(&mut self, path: NodeId, index: usize) {
        let before = self.anchor_points(path);
        let removed = before.point(index).clone();
        self.scene
            .edit_path(path, |data| {
                data.anchor_points.remove(index);
            });
        let after = self.anchor_points(path);

        // The removal is recorded before the neighbor diffs, so the reverse
        // replay restores the neighbors at post-removal indices and only
        // then re-inserts the point.
        self.record(EditAction::RemoveAnchorPoint {
            path,
            index,
            point: removed,
        });
        for j_after in 0..after.len() {
            let j_before = if j_after < index { j_after } else { j_after + 1 };
            let old = before.point(j_before).clone();
            let new = after.point(j_after).clone();
            self.write_anchor_point_recorded_only(path, j_after, old, new);
        }
    }

    /// Sets the corner type on every part-selected point of the path,
    /// transactionally when no transaction is already open.
    pub fn selection_set_corner_type(&mut self, path: NodeId, tp: CornerType, cx: f64, cy: f64) {
        let indices = self.part_selection_of(path);
        if indices.is_empty() {
            return;
        }
        let own_tx = self.transaction.is_none();
        if own_tx {
            self.begin_transaction();
        }
        self.edit_anchor_points(path, |pts| {
            for &i in &indices {
                pts.set_corner_type(i, tp, cx, cy);
            }
        });
        if own_tx {
            self.commit_transaction("Set Corner Type");
        }
    }

    /// Toggles auto handles on every part-selected point of the path.
    pub fn selection_set_auto_handles(&mut self, path: NodeId, auto: bool) {
        let indices = self.part_selection_of(path);
        if indices.is_empty() {
            return;
        }
        let own_tx = self.transaction.is_none();
        if own_tx {
            self.begin_transaction();
        }
        self.edit_anchor_points(path, |pts| {
            for &i in &indices {
                pts.set_auto_handles(i, auto);
            }
        });
        if own_tx {
            self.commit_transaction("Set Auto Handles");
        }
    }

    fn part_selection_of(&self, path: NodeId) -> Vec<usize> {
        self.scene
            .node(path)
            .path_data()
            .map(|d| {
                d.anchor_points
                    .iter()
                    .enumerate()
                    .filter(|(_, p)| p.selected)
                    .map(|(i, _)| i)
                    .collect()
            })
            .unwrap_or_default()
    }
}
