//! Persistence contract: documents round-trip through a serde model that
//! mirrors the node tree.
//!
//! Anchor point handles are persisted as *offsets* from the point position
//! (in-memory they are absolute), corner types as their short codes.
//! Restore is atomic: the whole document is parsed and validated into
//! staged nodes before the first node is attached, so a failed restore
//! leaves nothing behind.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DocumentError;
use crate::node::{Node, NodeFlag, NodeId, NodeKind, PropertyValue, Scene};
use crate::path::{AnchorPoint, AnchorPoints, CornerType, PathData};
use crate::style::StyleSet;
use vectorkit_core::Point;

pub const DOCUMENT_VERSION: u32 = 1;

/// A serialized scene.
#[derive(Debug, Serialize, Deserialize)]
pub struct Document {
    pub version: u32,
    pub id: Uuid,
    pub root: DocNode,
}

/// One serialized node.
#[derive(Debug, Serialize, Deserialize)]
pub struct DocNode {
    pub kind: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub hidden: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub locked: bool,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, PropertyValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<StyleSet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<DocPath>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<DocNode>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DocPath {
    pub closed: bool,
    pub points: Vec<DocAnchorPoint>,
}

/// Serialized anchor point. `hl`/`hr` are handle offsets from `(x, y)`,
/// `cl`/`cr` the shoulder lengths, `tp` the corner type code.
#[derive(Debug, Serialize, Deserialize)]
pub struct DocAnchorPoint {
    pub x: f64,
    pub y: f64,
    pub tp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hl: Option<(f64, f64)>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hr: Option<(f64, f64)>,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub cl: f64,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub cr: f64,
    #[serde(default, skip_serializing_if = "is_false")]
    pub ah: bool,
}

fn is_false(b: &bool) -> bool {
    !*b
}

fn is_zero(v: &f64) -> bool {
    *v == 0.0
}

impl Document {
    /// Snapshots a scene into its serialized form.
    pub fn from_scene(scene: &Scene) -> Document {
        Document {
            version: DOCUMENT_VERSION,
            id: scene.id,
            root: doc_node(scene, scene.root()),
        }
    }

    pub fn to_json(&self) -> Result<String, DocumentError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Document, DocumentError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Rebuilds the scene. All nodes are staged and validated first; any
    /// error returns before a scene exists.
    pub fn build_scene(&self) -> Result<Scene, DocumentError> {
        if self.root.kind != "scene" {
            return Err(DocumentError::UnknownNodeKind(self.root.kind.clone()));
        }
        let staged: Vec<Staged> = self
            .root
            .children
            .iter()
            .map(|c| stage(c, &self.root.kind))
            .collect::<Result<_, _>>()?;

        let mut scene = Scene::new();
        scene.id = self.id;
        let root = scene.root();
        for child in staged {
            attach(&mut scene, root, child);
        }
        Ok(scene)
    }
}

struct Staged {
    node: Node,
    children: Vec<Staged>,
}

fn stage(doc: &DocNode, parent_kind: &str) -> Result<Staged, DocumentError> {
    let kind = match doc.kind.as_str() {
        "page" => NodeKind::Page,
        "layer" => NodeKind::Layer,
        "group" => NodeKind::Group,
        "rectangle" => NodeKind::Rectangle,
        "ellipse" => NodeKind::Ellipse,
        "path" => {
            let data = doc.path.as_ref().ok_or(DocumentError::MissingPathData)?;
            NodeKind::Path(restore_path(data)?)
        }
        other => return Err(DocumentError::UnknownNodeKind(other.to_string())),
    };

    // Pages live directly under the scene root and nowhere else.
    let under_root = parent_kind == "scene";
    if matches!(kind, NodeKind::Page) != under_root {
        return Err(DocumentError::InvalidChild(
            doc.kind.clone(),
            parent_kind.to_string(),
        ));
    }

    let mut node = Node::new(kind);
    node.flags.set(NodeFlag::Hidden, doc.hidden);
    node.flags.set(NodeFlag::Locked, doc.locked);
    node.properties = doc.properties.clone();
    if let Some(style) = &doc.style {
        node.style = style.clone();
    }

    let children = doc
        .children
        .iter()
        .map(|c| stage(c, &doc.kind))
        .collect::<Result<_, _>>()?;
    Ok(Staged { node, children })
}

fn attach(scene: &mut Scene, parent: NodeId, staged: Staged) {
    let id = scene.append_child(parent, staged.node);
    for child in staged.children {
        attach(scene, id, child);
    }
}

fn restore_path(doc: &DocPath) -> Result<PathData, DocumentError> {
    let mut points = Vec::with_capacity(doc.points.len());
    for dp in &doc.points {
        let tp = CornerType::from_code(&dp.tp)
            .ok_or_else(|| DocumentError::UnknownCornerType(dp.tp.clone()))?;
        let pos = Point::new(dp.x, dp.y);
        points.push(AnchorPoint {
            position: pos,
            left_handle: dp.hl.map(|(dx, dy)| Point::new(pos.x + dx, pos.y + dy)),
            right_handle: dp.hr.map(|(dx, dy)| Point::new(pos.x + dx, pos.y + dy)),
            corner_type: tp,
            shoulder: (dp.cl, dp.cr),
            auto_handles: dp.ah,
            selected: false,
        });
    }
    Ok(PathData {
        // Handles restore verbatim, no recomputation on load.
        anchor_points: AnchorPoints::from_raw_points(points, doc.closed),
    })
}

fn doc_node(scene: &Scene, id: NodeId) -> DocNode {
    let node = scene.node(id);
    DocNode {
        kind: node.kind.name().to_string(),
        hidden: node.flags.has(NodeFlag::Hidden),
        locked: node.flags.has(NodeFlag::Locked),
        properties: node.properties.clone(),
        style: if node.kind.has_style() && node.style != StyleSet::default() {
            Some(node.style.clone())
        } else {
            None
        },
        path: node.path_data().map(|data| DocPath {
            closed: data.anchor_points.is_closed(),
            points: data
                .anchor_points
                .iter()
                .map(|pt| DocAnchorPoint {
                    x: pt.position.x,
                    y: pt.position.y,
                    tp: pt.corner_type.code().to_string(),
                    hl: pt
                        .left_handle
                        .map(|h| (h.x - pt.position.x, h.y - pt.position.y)),
                    hr: pt
                        .right_handle
                        .map(|h| (h.x - pt.position.x, h.y - pt.position.y)),
                    cl: pt.shoulder.0,
                    cr: pt.shoulder.1,
                    ah: pt.auto_handles,
                })
                .collect(),
        }),
        children: scene
            .children(id)
            .iter()
            .map(|&c| doc_node(scene, c))
            .collect(),
    }
}
