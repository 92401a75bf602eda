use std::cell::RefCell;
use std::rc::Rc;

use vectorkit_core::{Rect, Transform};
use vectorkit_scene::{
    GeometryPhase, Node, NodeFlag, PropertyValue, Scene, SceneEvent, StyleSet,
};

#[test]
fn hidden_element_reports_no_boxes_regardless_of_children() {
    let (mut scene, _page, layer) = Scene::with_default_page();
    let group = scene.append_child(layer, Node::group());
    scene.append_child(group, Node::rectangle(0.0, 0.0, 100.0, 100.0));

    assert!(scene.geometry_bbox(group).is_some());
    scene.set_flag(group, NodeFlag::Hidden, true);

    assert_eq!(scene.geometry_bbox(group), None);
    assert_eq!(scene.paint_bbox(group), None);
    assert_eq!(scene.children_geometry_bbox(group), None);
    assert_eq!(scene.children_paint_bbox(group), None);
}

#[test]
fn visible_container_with_only_hidden_children_has_empty_children_box() {
    let (mut scene, _page, layer) = Scene::with_default_page();
    let a = scene.append_child(layer, Node::rectangle(0.0, 0.0, 10.0, 10.0));
    let b = scene.append_child(layer, Node::rectangle(20.0, 0.0, 10.0, 10.0));
    scene.set_flag(a, NodeFlag::Hidden, true);
    scene.set_flag(b, NodeFlag::Hidden, true);

    // The container is visible, so the answer is a value, just an empty one.
    let bbox = scene.children_geometry_bbox(layer).unwrap();
    assert!(bbox.is_empty());
    let bbox = scene.children_paint_bbox(layer).unwrap();
    assert!(bbox.is_empty());
}

#[test]
fn children_box_is_none_for_shapes() {
    let (mut scene, _page, layer) = Scene::with_default_page();
    let shape = scene.append_child(layer, Node::rectangle(0.0, 0.0, 10.0, 10.0));
    assert_eq!(scene.children_geometry_bbox(shape), None);
}

#[test]
fn container_box_unions_visible_children() {
    let (mut scene, _page, layer) = Scene::with_default_page();
    let a = scene.append_child(layer, Node::rectangle(0.0, 0.0, 10.0, 10.0));
    scene.append_child(layer, Node::rectangle(20.0, 20.0, 10.0, 10.0));

    assert_eq!(
        scene.geometry_bbox(layer),
        Some(Rect::new(0.0, 0.0, 30.0, 30.0))
    );

    scene.set_flag(a, NodeFlag::Hidden, true);
    assert_eq!(
        scene.geometry_bbox(layer),
        Some(Rect::new(20.0, 20.0, 10.0, 10.0))
    );
}

#[test]
fn moving_a_shape_invalidates_ancestor_caches() {
    let (mut scene, page, layer) = Scene::with_default_page();
    let shape = scene.append_child(layer, Node::rectangle(0.0, 0.0, 10.0, 10.0));

    // Prime the caches up the chain.
    assert_eq!(
        scene.geometry_bbox(page),
        Some(Rect::new(0.0, 0.0, 10.0, 10.0))
    );

    scene.set_properties(
        shape,
        &["x".into(), "y".into()],
        &[PropertyValue::Number(50.0), PropertyValue::Number(50.0)],
    );
    assert_eq!(
        scene.geometry_bbox(page),
        Some(Rect::new(50.0, 50.0, 10.0, 10.0))
    );
    assert_eq!(
        scene.geometry_bbox(layer),
        Some(Rect::new(50.0, 50.0, 10.0, 10.0))
    );
}

#[test]
fn transform_property_moves_the_box_without_touching_local_rect() {
    let (mut scene, _page, layer) = Scene::with_default_page();
    let shape = scene.append_child(layer, Node::rectangle(0.0, 0.0, 10.0, 10.0));
    scene.set_properties(
        shape,
        &["trf".into()],
        &[PropertyValue::TransformVal(
            Transform::scaling(2.0, 2.0).translated(5.0, 0.0),
        )],
    );
    assert_eq!(
        scene.geometry_bbox(shape),
        Some(Rect::new(5.0, 0.0, 20.0, 20.0))
    );
    assert_eq!(
        scene.node(shape).property("w"),
        Some(&PropertyValue::Number(10.0))
    );
}

#[test]
fn geometry_update_fires_phases_and_repaint() {
    let (mut scene, _page, layer) = Scene::with_default_page();
    let shape = scene.append_child(layer, Node::rectangle(0.0, 0.0, 10.0, 10.0));
    let _ = scene.paint_bbox(shape);

    let log = Rc::new(RefCell::new(Vec::new()));
    let log2 = log.clone();
    scene.add_listener(Rc::new(move |_, event| match event {
        SceneEvent::GeometryChange { node, phase } => {
            log2.borrow_mut().push(format!("{phase:?}:{node}"));
        }
        SceneEvent::RepaintRequested { area } => {
            log2.borrow_mut().push(format!(
                "repaint:{},{},{},{}",
                area.x, area.y, area.width, area.height
            ));
        }
        _ => {}
    }));

    scene.set_properties(shape, &["x".into()], &[PropertyValue::Number(20.0)]);

    let log = log.borrow();
    assert_eq!(log[0], format!("{:?}:{shape}", GeometryPhase::Before));
    assert_eq!(log[1], format!("{:?}:{shape}", GeometryPhase::After));
    // Child notifications walk the ancestor chain: layer, page, root.
    assert_eq!(
        log.iter()
            .filter(|l| l.starts_with("Before:"))
            .count(),
        1
    );
    assert_eq!(log.iter().filter(|l| l.starts_with("Child:")).count(), 3);
    // Repaint covers the union of the old and new paint boxes
    // (10 wide shape moved from x=0 to x=20, half-pixel padding).
    assert_eq!(log.last().unwrap(), "repaint:-0.5,-0.5,31,11");
}

#[test]
fn unchanged_geometry_still_requests_repaint_of_itself() {
    let (mut scene, _page, layer) = Scene::with_default_page();
    let shape = scene.append_child(layer, Node::rectangle(0.0, 0.0, 10.0, 10.0));
    let expected = scene.paint_bbox(shape).unwrap();

    let repaints = Rc::new(RefCell::new(Vec::new()));
    let repaints2 = repaints.clone();
    scene.add_listener(Rc::new(move |_, event| {
        if let SceneEvent::RepaintRequested { area } = event {
            repaints2.borrow_mut().push(*area);
        }
    }));

    scene.begin_update(shape);
    scene.end_update(shape);
    assert_eq!(repaints.borrow().as_slice(), &[expected]);
}

#[test]
fn hiding_a_shape_repaints_its_old_box() {
    let (mut scene, _page, layer) = Scene::with_default_page();
    let shape = scene.append_child(layer, Node::rectangle(0.0, 0.0, 10.0, 10.0));
    let old = scene.paint_bbox(shape).unwrap();

    let repaints = Rc::new(RefCell::new(Vec::new()));
    let repaints2 = repaints.clone();
    scene.add_listener(Rc::new(move |_, event| {
        if let SceneEvent::RepaintRequested { area } = event {
            repaints2.borrow_mut().push(*area);
        }
    }));

    scene.set_flag(shape, NodeFlag::Hidden, true);
    assert_eq!(repaints.borrow().as_slice(), &[old]);
    assert_eq!(scene.paint_bbox(shape), None);
}

#[test]
fn style_margin_feeds_paint_box() {
    let (mut scene, _page, layer) = Scene::with_default_page();
    let mut node = Node::rectangle(10.0, 10.0, 10.0, 10.0);
    node.style = StyleSet::initial();
    let shape = scene.append_child(layer, node);
    // Stroke 1.0 -> 0.5 margin, plus 0.5 anti-aliasing padding.
    assert_eq!(
        scene.paint_bbox(shape),
        Some(Rect::new(9.0, 9.0, 12.0, 12.0))
    );
    assert_eq!(
        scene.geometry_bbox(shape),
        Some(Rect::new(10.0, 10.0, 10.0, 10.0))
    );
}
