//! Scene change notifications.
//!
//! Events are dispatched synchronously from within the mutation that caused
//! them. Dispatch snapshots the listener list first, so a handler may
//! re-enter the scene and mutate it; the resulting nested events are
//! delivered synchronously as well.

use crate::node::{NodeFlag, NodeId, PropertyValue};
use vectorkit_core::Rect;

/// Phase of a geometry update on an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryPhase {
    /// Fired on the 0 -> 1 transition of the update counter, before the
    /// mutation takes effect.
    Before,
    /// Fired when the counter returns to 0 and the caches were cleared.
    After,
    /// Fired on each ancestor whose cached boxes were invalidated by a
    /// descendant's geometry change.
    Child,
}

/// A change notification emitted by the scene.
#[derive(Debug, Clone)]
pub enum SceneEvent {
    /// A node was inserted into the tree.
    AfterInsert { node: NodeId },
    /// A node is about to be removed; it is still fully linked.
    BeforeRemove { node: NodeId },
    /// A node was removed from the tree.
    AfterRemove { node: NodeId, parent: NodeId },
    /// Properties are about to change; `old` holds the current values.
    BeforePropertiesChange {
        node: NodeId,
        names: Vec<String>,
        old: Vec<PropertyValue>,
    },
    /// Properties changed; `old` holds the previous values.
    AfterPropertiesChange {
        node: NodeId,
        names: Vec<String>,
        old: Vec<PropertyValue>,
    },
    /// A flag was set or cleared on a node.
    FlagChanged {
        node: NodeId,
        flag: NodeFlag,
        set: bool,
    },
    /// Geometry update protocol notification.
    GeometryChange { node: NodeId, phase: GeometryPhase },
    /// A region of the scene needs repainting.
    RepaintRequested { area: Rect },
}

/// Handle for removing a registered scene listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub(crate) u64);
