//! The scene node tree.
//!
//! Nodes live in an arena owned by [`Scene`] and refer to each other by
//! [`NodeId`]. Ids are stable for the lifetime of a scene: removing a
//! subtree detaches it into a [`DetachedSubtree`] that can be re-inserted
//! later under the same ids, which is what makes undo replay possible
//! without holding references into the tree.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::trace;
use uuid::Uuid;

use crate::events::{ListenerId, SceneEvent};
use crate::path::{CornerType, PathData};
use crate::style::StyleSet;
use vectorkit_core::{Point, Rect, Transform};

/// Stable handle to a node in a scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub(crate) u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Per-node boolean states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeFlag {
    Hidden,
    Locked,
    Selected,
    Highlighted,
    PartialSelection,
}

impl NodeFlag {
    fn bit(self) -> u8 {
        match self {
            NodeFlag::Hidden => 1 << 0,
            NodeFlag::Locked => 1 << 1,
            NodeFlag::Selected => 1 << 2,
            NodeFlag::Highlighted => 1 << 3,
            NodeFlag::PartialSelection => 1 << 4,
        }
    }
}

/// Typed bitset over [`NodeFlag`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeFlags(u8);

impl NodeFlags {
    pub fn has(&self, flag: NodeFlag) -> bool {
        self.0 & flag.bit() != 0
    }

    /// Returns true when the flag actually changed.
    pub fn set(&mut self, flag: NodeFlag, value: bool) -> bool {
        let before = self.0;
        if value {
            self.0 |= flag.bit();
        } else {
            self.0 &= !flag.bit();
        }
        self.0 != before
    }

    pub fn toggle(&mut self, flag: NodeFlag) {
        self.0 ^= flag.bit();
    }
}

/// A dynamically typed property value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertyValue {
    Number(f64),
    Bool(bool),
    Text(String),
    PointVal(Point),
    TransformVal(Transform),
    CornerTypeVal(CornerType),
    Null,
}

impl PropertyValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            PropertyValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_transform(&self) -> Option<Transform> {
        match self {
            PropertyValue::TransformVal(t) => Some(*t),
            _ => None,
        }
    }
}

/// What a node is. Containers hold children; shapes are leaves.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    SceneRoot,
    Page,
    Layer,
    Group,
    /// Axis-aligned rectangle; geometry in the `x/y/w/h` properties.
    Rectangle,
    /// Axis-aligned ellipse; geometry in the `x/y/w/h` properties.
    Ellipse,
    Path(PathData),
}

impl NodeKind {
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::SceneRoot => "scene",
            NodeKind::Page => "page",
            NodeKind::Layer => "layer",
            NodeKind::Group => "group",
            NodeKind::Rectangle => "rectangle",
            NodeKind::Ellipse => "ellipse",
            NodeKind::Path(_) => "path",
        }
    }

    pub fn is_container(&self) -> bool {
        matches!(
            self,
            NodeKind::SceneRoot | NodeKind::Page | NodeKind::Layer | NodeKind::Group
        )
    }

    pub fn is_shape(&self) -> bool {
        matches!(
            self,
            NodeKind::Rectangle | NodeKind::Ellipse | NodeKind::Path(_)
        )
    }

    pub fn has_style(&self) -> bool {
        self.is_shape()
    }

    pub fn can_transform(&self) -> bool {
        matches!(
            self,
            NodeKind::Group | NodeKind::Rectangle | NodeKind::Ellipse | NodeKind::Path(_)
        )
    }
}

/// A node of the scene tree.
#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub flags: NodeFlags,
    pub properties: BTreeMap<String, PropertyValue>,
    pub style: StyleSet,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    // Element geometry engine state.
    pub(crate) geometry_bbox_cache: Option<Rect>,
    pub(crate) paint_bbox_cache: Option<Rect>,
    pub(crate) update_counter: u32,
    pub(crate) saved_paint_bbox: Option<Rect>,
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            flags: NodeFlags::default(),
            properties: BTreeMap::new(),
            style: StyleSet::default(),
            parent: None,
            children: Vec::new(),
            geometry_bbox_cache: None,
            paint_bbox_cache: None,
            update_counter: 0,
            saved_paint_bbox: None,
        }
    }

    pub fn page() -> Self {
        Self::new(NodeKind::Page)
    }

    pub fn layer() -> Self {
        Self::new(NodeKind::Layer)
    }

    pub fn group() -> Self {
        Self::new(NodeKind::Group)
    }

    pub fn rectangle(x: f64, y: f64, w: f64, h: f64) -> Self {
        let mut node = Self::new(NodeKind::Rectangle);
        node.set_local_rect(x, y, w, h);
        node
    }

    pub fn ellipse(x: f64, y: f64, w: f64, h: f64) -> Self {
        let mut node = Self::new(NodeKind::Ellipse);
        node.set_local_rect(x, y, w, h);
        node
    }

    pub fn path(data: PathData) -> Self {
        Self::new(NodeKind::Path(data))
    }

    fn set_local_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.properties
            .insert("x".into(), PropertyValue::Number(x));
        self.properties
            .insert("y".into(), PropertyValue::Number(y));
        self.properties
            .insert("w".into(), PropertyValue::Number(w));
        self.properties
            .insert("h".into(), PropertyValue::Number(h));
    }

    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name)
    }

    fn number_property(&self, name: &str) -> f64 {
        self.properties
            .get(name)
            .and_then(PropertyValue::as_number)
            .unwrap_or(0.0)
    }

    /// The node's own transform, identity when unset.
    pub fn local_transform(&self) -> Transform {
        self.properties
            .get("trf")
            .and_then(PropertyValue::as_transform)
            .unwrap_or_else(Transform::identity)
    }

    /// Untransformed geometry of a rectangle/ellipse shape.
    pub(crate) fn local_rect(&self) -> Rect {
        Rect::new(
            self.number_property("x"),
            self.number_property("y"),
            self.number_property("w"),
            self.number_property("h"),
        )
    }

    pub fn is_visible(&self) -> bool {
        !self.flags.has(NodeFlag::Hidden)
    }

    pub fn path_data(&self) -> Option<&PathData> {
        match &self.kind {
            NodeKind::Path(data) => Some(data),
            _ => None,
        }
    }

    /// Properties whose change moves geometry and must run inside the
    /// geometry update protocol.
    fn is_geometry_property(name: &str) -> bool {
        matches!(name, "x" | "y" | "w" | "h" | "trf")
    }
}

/// A subtree detached from a scene, ids preserved.
#[derive(Debug, Clone)]
pub struct DetachedSubtree {
    pub root: NodeId,
    pub(crate) nodes: Vec<(NodeId, Node)>,
}

type SceneListener = dyn Fn(&mut Scene, &SceneEvent);

/// The scene graph: a node arena plus a listener registry.
pub struct Scene {
    pub id: Uuid,
    nodes: HashMap<NodeId, Node>,
    root: NodeId,
    next_id: u64,
    listeners: Vec<(ListenerId, Rc<SceneListener>)>,
    next_listener_id: u64,
}

impl Scene {
    /// Creates a scene containing only the root node.
    pub fn new() -> Self {
        let root = NodeId(1);
        let mut nodes = HashMap::new();
        nodes.insert(root, Node::new(NodeKind::SceneRoot));
        Self {
            id: Uuid::new_v4(),
            nodes,
            root,
            next_id: 2,
            listeners: Vec::new(),
            next_listener_id: 1,
        }
    }

    /// Creates a scene with one page holding one layer, the usual starting
    /// point for a fresh document.
    pub fn with_default_page() -> (Self, NodeId, NodeId) {
        let mut scene = Self::new();
        let root = scene.root();
        let page = scene.append_child(root, Node::page());
        let layer = scene.append_child(page, Node::layer());
        (scene, page, layer)
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Panics on a dangling id; ids are stable, so a miss is a caller bug.
    pub fn node(&self, id: NodeId) -> &Node {
        self.nodes.get(&id).unwrap_or_else(|| {
            panic!("dangling node id {id}");
        })
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        self.nodes.get_mut(&id).unwrap_or_else(|| {
            panic!("dangling node id {id}");
        })
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    /// The next sibling of `id`, used to capture an insertion position.
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let siblings = self.children(parent);
        let at = siblings.iter().position(|&c| c == id)?;
        siblings.get(at + 1).copied()
    }

    /// Ids of pages in z-order.
    pub fn pages(&self) -> Vec<NodeId> {
        self.children(self.root)
            .iter()
            .copied()
            .filter(|&c| matches!(self.node(c).kind, NodeKind::Page))
            .collect()
    }

    // ---- listeners -------------------------------------------------------

    pub fn add_listener(&mut self, listener: Rc<SceneListener>) -> ListenerId {
        let id = ListenerId(self.next_listener_id);
        self.next_listener_id += 1;
        self.listeners.push((id, listener));
        id
    }

    pub fn remove_listener(&mut self, id: ListenerId) {
        self.listeners.retain(|(lid, _)| *lid != id);
    }

    /// Synchronous dispatch. The listener list is snapshotted first so a
    /// handler may re-enter the scene and mutate it.
    pub(crate) fn dispatch(&mut self, event: SceneEvent) {
        if self.listeners.is_empty() {
            return;
        }
        let listeners: Vec<Rc<SceneListener>> =
            self.listeners.iter().map(|(_, l)| l.clone()).collect();
        for listener in listeners {
            listener(self, &event);
        }
    }

    // ---- structure -------------------------------------------------------

    /// Inserts `node` as a child of `parent`, in front of `before` (or
    /// appended when `before` is `None`).
    pub fn insert_child(
        &mut self,
        parent: NodeId,
        before: Option<NodeId>,
        mut node: Node,
    ) -> NodeId {
        assert!(
            self.node(parent).kind.is_container(),
            "cannot insert under non-container node {parent}"
        );
        let id = NodeId(self.next_id);
        self.next_id += 1;
        node.parent = Some(parent);
        self.nodes.insert(id, node);
        self.link_child(parent, before, id);
        trace!(node = %id, %parent, "node inserted");
        self.invalidate_ancestors(parent);
        self.dispatch(SceneEvent::AfterInsert { node: id });
        id
    }

    pub fn append_child(&mut self, parent: NodeId, node: Node) -> NodeId {
        self.insert_child(parent, None, node)
    }

    fn link_child(&mut self, parent: NodeId, before: Option<NodeId>, id: NodeId) {
        let children = &mut self.node_mut(parent).children;
        match before {
            Some(before) => {
                let at = children
                    .iter()
                    .position(|&c| c == before)
                    .unwrap_or_else(|| panic!("{before} is not a child of {parent}"));
                children.insert(at, id);
            }
            None => children.push(id),
        }
    }

    /// Detaches `id` and its descendants, preserving ids for later
    /// re-insertion.
    pub fn remove_subtree(&mut self, id: NodeId) -> DetachedSubtree {
        assert!(id != self.root, "cannot remove the scene root");
        self.dispatch(SceneEvent::BeforeRemove { node: id });

        let parent = self
            .node(id)
            .parent
            .expect("non-root node without a parent");
        self.node_mut(parent).children.retain(|&c| c != id);

        let mut nodes = Vec::new();
        self.detach_recursive(id, &mut nodes);
        trace!(node = %id, count = nodes.len(), "subtree detached");

        self.invalidate_ancestors(parent);
        self.dispatch(SceneEvent::AfterRemove { node: id, parent });
        DetachedSubtree { root: id, nodes }
    }

    fn detach_recursive(&mut self, id: NodeId, out: &mut Vec<(NodeId, Node)>) {
        let node = self
            .nodes
            .remove(&id)
            .unwrap_or_else(|| panic!("dangling node id {id}"));
        let children = node.children.clone();
        out.push((id, node));
        for child in children {
            self.detach_recursive(child, out);
        }
    }

    /// Re-attaches a previously detached subtree under `parent`.
    pub fn insert_subtree(
        &mut self,
        parent: NodeId,
        before: Option<NodeId>,
        subtree: DetachedSubtree,
    ) -> NodeId {
        let root = subtree.root;
        for (id, node) in subtree.nodes {
            debug_assert!(!self.nodes.contains_key(&id), "subtree id {id} collides");
            self.nodes.insert(id, node);
        }
        self.node_mut(root).parent = Some(parent);
        self.link_child(parent, before, root);
        self.invalidate_ancestors(parent);
        self.dispatch(SceneEvent::AfterInsert { node: root });
        root
    }

    /// Deep-copies the subtree at `id` under fresh ids, without attaching
    /// it. Selection state is not copied.
    pub fn duplicate_subtree(&mut self, id: NodeId) -> DetachedSubtree {
        let mut nodes = Vec::new();
        let root = self.duplicate_recursive(id, None, &mut nodes);
        DetachedSubtree { root, nodes }
    }

    fn duplicate_recursive(
        &mut self,
        source: NodeId,
        parent: Option<NodeId>,
        out: &mut Vec<(NodeId, Node)>,
    ) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;

        let mut copy = self.node(source).clone();
        copy.parent = parent;
        copy.flags.set(NodeFlag::Selected, false);
        copy.flags.set(NodeFlag::PartialSelection, false);
        copy.update_counter = 0;
        copy.saved_paint_bbox = None;
        let children = std::mem::take(&mut copy.children);
        let slot = out.len();
        out.push((id, copy));

        let mut copied_children = Vec::with_capacity(children.len());
        for child in children {
            copied_children.push(self.duplicate_recursive(child, Some(id), out));
        }
        out[slot].1.children = copied_children;
        id
    }

    // ---- properties and flags ---------------------------------------------

    /// Sets properties by name and returns the previous values (missing
    /// properties report [`PropertyValue::Null`]). Geometry-bearing
    /// properties run inside the geometry update protocol.
    pub fn set_properties(
        &mut self,
        id: NodeId,
        names: &[String],
        values: &[PropertyValue],
    ) -> Vec<PropertyValue> {
        assert_eq!(names.len(), values.len(), "property name/value mismatch");
        let old: Vec<PropertyValue> = names
            .iter()
            .map(|n| {
                self.node(id)
                    .properties
                    .get(n)
                    .cloned()
                    .unwrap_or(PropertyValue::Null)
            })
            .collect();

        self.dispatch(SceneEvent::BeforePropertiesChange {
            node: id,
            names: names.to_vec(),
            old: old.clone(),
        });

        let geometric = names.iter().any(|n| Node::is_geometry_property(n));
        if geometric {
            self.begin_update(id);
        }
        for (name, value) in names.iter().zip(values.iter()) {
            match value {
                PropertyValue::Null => {
                    self.node_mut(id).properties.remove(name);
                }
                _ => {
                    self.node_mut(id)
                        .properties
                        .insert(name.clone(), value.clone());
                }
            }
        }
        if geometric {
            self.end_update(id);
        }

        self.dispatch(SceneEvent::AfterPropertiesChange {
            node: id,
            names: names.to_vec(),
            old: old.clone(),
        });
        old
    }

    /// Sets or clears a flag; returns whether it changed. A visibility
    /// change runs inside the geometry update protocol since it flips the
    /// node's boxes between a value and `None`.
    pub fn set_flag(&mut self, id: NodeId, flag: NodeFlag, set: bool) -> bool {
        if self.node(id).flags.has(flag) == set {
            return false;
        }
        if flag == NodeFlag::Hidden {
            self.begin_update(id);
            self.node_mut(id).flags.set(flag, set);
            self.end_update(id);
        } else {
            self.node_mut(id).flags.set(flag, set);
        }
        self.dispatch(SceneEvent::FlagChanged {
            node: id,
            flag,
            set,
        });
        true
    }

    /// Sets the part-selection bit of one anchor point and keeps the
    /// node's `PartialSelection` flag in sync. Selection is editor state,
    /// not geometry, so no geometry update runs.
    pub fn set_anchor_selected(&mut self, id: NodeId, index: usize, selected: bool) {
        let any = match &mut self.node_mut(id).kind {
            NodeKind::Path(data) => {
                data.anchor_points.set_selected(index, selected);
                data.anchor_points.iter().any(|p| p.selected)
            }
            _ => panic!("{id} is not a path node"),
        };
        self.set_flag(id, NodeFlag::PartialSelection, any);
    }

    /// Mutates a path's point data inside the geometry update protocol.
    pub fn edit_path<R>(&mut self, id: NodeId, f: impl FnOnce(&mut PathData) -> R) -> R {
        assert!(
            matches!(self.node(id).kind, NodeKind::Path(_)),
            "{id} is not a path node"
        );
        self.begin_update(id);
        let result = match &mut self.node_mut(id).kind {
            NodeKind::Path(data) => f(data),
            _ => unreachable!(),
        };
        self.end_update(id);
        result
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}
