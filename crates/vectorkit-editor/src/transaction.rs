//! Recorded edit actions and the transaction/undo state model.
//!
//! Actions reference nodes by id, never by pointer, so a recorded action
//! stays valid across arbitrary replays: removing a subtree parks it inside
//! the action itself and re-inserting it restores the very same ids.

use vectorkit_scene::{
    AnchorPoint, DetachedSubtree, NodeFlag, NodeId, PropertyValue, Scene,
};

/// One reversible mutation of a scene.
///
/// An action always holds its *post-apply* state: applying is only legal
/// right after `revert`, reverting only right after `apply` (or right
/// after recording, which happens post-apply).
#[derive(Debug)]
pub enum EditAction {
    InsertNode {
        id: NodeId,
        parent: NodeId,
        before: Option<NodeId>,
        /// Parked subtree while the node is *not* in the scene.
        subtree: Option<DetachedSubtree>,
    },
    RemoveNode {
        id: NodeId,
        parent: NodeId,
        before: Option<NodeId>,
        subtree: Option<DetachedSubtree>,
    },
    SetProperties {
        id: NodeId,
        names: Vec<String>,
        new_values: Vec<PropertyValue>,
        old_values: Vec<PropertyValue>,
    },
    SetFlag {
        id: NodeId,
        flag: NodeFlag,
        set: bool,
    },
    /// Raw geometry overwrite of one anchor point. Replay restores the
    /// recorded geometry verbatim so no recomputation can drift.
    SetAnchorPoint {
        path: NodeId,
        index: usize,
        new: AnchorPoint,
        old: AnchorPoint,
    },
    InsertAnchorPoint {
        path: NodeId,
        index: usize,
        point: AnchorPoint,
    },
    RemoveAnchorPoint {
        path: NodeId,
        index: usize,
        point: AnchorPoint,
    },
    SetPathClosed {
        path: NodeId,
        closed: bool,
    },
}

impl EditAction {
    /// Replays the action forward (redo direction).
    pub fn apply(&mut self, scene: &mut Scene) {
        match self {
            EditAction::InsertNode {
                parent,
                before,
                subtree,
                ..
            } => {
                let parked = subtree.take().expect("insert action already applied");
                scene.insert_subtree(*parent, *before, parked);
            }
            EditAction::RemoveNode { id, subtree, .. } => {
                *subtree = Some(scene.remove_subtree(*id));
            }
            EditAction::SetProperties {
                id,
                names,
                new_values,
                ..
            } => {
                scene.set_properties(*id, names, new_values);
            }
            EditAction::SetFlag { id, flag, set } => {
                scene.set_flag(*id, *flag, *set);
            }
            EditAction::SetAnchorPoint {
                path, index, new, ..
            } => {
                let (index, new) = (*index, new.clone());
                scene.edit_path(*path, |data| data.anchor_points.restore(index, &new));
            }
            EditAction::InsertAnchorPoint { path, index, point } => {
                let (index, point) = (*index, point.clone());
                scene.edit_path(*path, |data| data.anchor_points.insert_raw(index, point));
            }
            EditAction::RemoveAnchorPoint { path, index, .. } => {
                let index = *index;
                scene.edit_path(*path, |data| {
                    data.anchor_points.remove_raw(index);
                });
            }
            EditAction::SetPathClosed { path, closed } => {
                let closed = *closed;
                scene.edit_path(*path, |data| data.anchor_points.set_closed(closed));
            }
        }
    }

    /// Replays the action backward (undo direction).
    pub fn revert(&mut self, scene: &mut Scene) {
        match self {
            EditAction::InsertNode { id, subtree, .. } => {
                *subtree = Some(scene.remove_subtree(*id));
            }
            EditAction::RemoveNode {
                parent,
                before,
                subtree,
                ..
            } => {
                let parked = subtree.take().expect("remove action not applied");
                scene.insert_subtree(*parent, *before, parked);
            }
            EditAction::SetProperties {
                id,
                names,
                old_values,
                ..
            } => {
                scene.set_properties(*id, names, old_values);
            }
            EditAction::SetFlag { id, flag, set } => {
                scene.set_flag(*id, *flag, !*set);
            }
            EditAction::SetAnchorPoint {
                path, index, old, ..
            } => {
                let (index, old) = (*index, old.clone());
                scene.edit_path(*path, |data| data.anchor_points.restore(index, &old));
            }
            EditAction::InsertAnchorPoint { path, index, .. } => {
                let index = *index;
                scene.edit_path(*path, |data| {
                    data.anchor_points.remove_raw(index);
                });
            }
            EditAction::RemoveAnchorPoint { path, index, point } => {
                let (index, point) = (*index, point.clone());
                scene.edit_path(*path, |data| data.anchor_points.insert_raw(index, point));
            }
            EditAction::SetPathClosed { path, closed } => {
                let closed = *closed;
                scene.edit_path(*path, |data| data.anchor_points.set_closed(!closed));
            }
        }
    }
}

/// What was selected at a point in time: element ids in selection order
/// plus the anchor part-selection of each open path editor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionSnapshot {
    pub elements: Vec<NodeId>,
    pub path_parts: Vec<(NodeId, Vec<usize>)>,
}

/// An open transaction: the actions recorded so far plus the selection
/// captured when it was opened.
#[derive(Debug)]
pub struct Transaction {
    pub actions: Vec<EditAction>,
    pub selection_before: SelectionSnapshot,
}

/// One entry of the undo or redo stack.
#[derive(Debug)]
pub struct UndoState {
    pub label: String,
    pub actions: Vec<EditAction>,
    pub selection_before: SelectionSnapshot,
    pub selection_after: SelectionSnapshot,
}
