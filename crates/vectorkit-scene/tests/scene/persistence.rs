use std::fs;

use vectorkit_scene::serialization::Document;
use vectorkit_scene::{
    AnchorPoint, CornerType, Node, NodeFlag, PathData, PropertyValue, Scene,
};

fn editor_like_scene() -> Scene {
    let (mut scene, _page, layer) = Scene::with_default_page();
    let hidden = scene.append_child(layer, Node::ellipse(0.0, 0.0, 40.0, 20.0));
    scene.set_flag(hidden, NodeFlag::Hidden, true);
    scene.set_properties(
        hidden,
        &["name".into()],
        &[PropertyValue::Text("backdrop".into())],
    );

    let mut curve = PathData::new(
        vec![
            AnchorPoint::new(10.0, 0.0),
            AnchorPoint::new(50.0, 0.0),
            AnchorPoint::new(50.0, 70.0),
            AnchorPoint::new(10.0, -10.0),
        ],
        true,
    );
    curve.anchor_points.set_corner_type(0, CornerType::Connector, 0.0, 0.0);
    curve.anchor_points.set_auto_handles(2, true);
    scene.append_child(layer, Node::path(curve));
    scene
}

#[test]
fn round_trip_through_a_file() {
    let scene = editor_like_scene();
    let json = Document::from_scene(&scene).to_json().unwrap();

    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("drawing.json");
    fs::write(&file, &json).unwrap();

    let read_back = fs::read_to_string(&file).unwrap();
    let mut restored = Document::from_json(&read_back)
        .unwrap()
        .build_scene()
        .unwrap();

    let page = restored.pages()[0];
    let layer = restored.children(page)[0];
    let children = restored.children(layer).to_vec();
    assert_eq!(children.len(), 2);

    // Flags and names survive.
    let ellipse = children[0];
    assert!(restored.node(ellipse).flags.has(NodeFlag::Hidden));
    assert_eq!(
        restored.node(ellipse).property("name"),
        Some(&PropertyValue::Text("backdrop".into()))
    );
    assert_eq!(restored.geometry_bbox(ellipse), None);

    // Path geometry survives verbatim, including auto-computed handles.
    let original_path = scene.node(children[1]).path_data().unwrap();
    let restored_path = restored.node(children[1]).path_data().unwrap();
    assert!(restored_path
        .anchor_points
        .same_geometry(&original_path.anchor_points));
}

#[test]
fn failed_restore_builds_nothing() {
    let json = r#"{
        "version": 1,
        "id": "00000000-0000-0000-0000-000000000002",
        "root": {
            "kind": "scene",
            "children": [
                { "kind": "page", "children": [
                    { "kind": "layer", "children": [
                        { "kind": "rectangle" },
                        { "kind": "teapot" }
                    ]}
                ]}
            ]
        }
    }"#;
    // The rectangle alone would be fine; the teapot poisons the whole load.
    assert!(Document::from_json(json).unwrap().build_scene().is_err());
}

#[test]
fn empty_scene_round_trips() {
    let scene = Scene::new();
    let json = Document::from_scene(&scene).to_json().unwrap();
    let mut restored = Document::from_json(&json).unwrap().build_scene().unwrap();
    assert!(restored.pages().is_empty());
    assert_eq!(restored.geometry_bbox(restored.root()), None);
}

#[test]
fn default_style_is_not_persisted() {
    let (mut scene, _page, layer) = Scene::with_default_page();
    scene.append_child(layer, Node::rectangle(0.0, 0.0, 10.0, 10.0));
    let doc = Document::from_scene(&scene);
    let rect = &doc.root.children[0].children[0].children[0];
    assert!(rect.style.is_none());
    assert_eq!(
        rect.properties.get("w"),
        Some(&PropertyValue::Number(10.0))
    );
}
