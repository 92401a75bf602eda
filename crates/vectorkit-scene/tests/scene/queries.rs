use vectorkit_core::{Point, Rect, Transform};
use vectorkit_scene::{
    AnchorPoint, CollisionOptions, HitTestOptions, Node, NodeFlag, PathData, Scene,
};

fn overlapping_scene() -> (Scene, vectorkit_scene::NodeId, [vectorkit_scene::NodeId; 3]) {
    let (mut scene, page, layer) = Scene::with_default_page();
    // Three overlapping rects; c is topmost at the shared center.
    let a = scene.append_child(layer, Node::rectangle(0.0, 0.0, 20.0, 20.0));
    let b = scene.append_child(layer, Node::rectangle(5.0, 5.0, 20.0, 20.0));
    let c = scene.append_child(layer, Node::rectangle(10.0, 10.0, 20.0, 20.0));
    (scene, page, [a, b, c])
}

#[test]
fn hit_test_returns_topmost_first() {
    let (mut scene, page, [_, _, c]) = overlapping_scene();
    let hits = scene.hit_test(
        page,
        Point::new(12.0, 12.0),
        &Transform::identity(),
        &HitTestOptions::default(),
    );
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].node, c);
    assert!(!hits[0].outline);
}

#[test]
fn stacked_mode_collects_every_hit_in_z_order() {
    let (mut scene, page, [a, b, c]) = overlapping_scene();
    let hits = scene.hit_test(
        page,
        Point::new(12.0, 12.0),
        &Transform::identity(),
        &HitTestOptions {
            stacked: true,
            ..HitTestOptions::default()
        },
    );
    let ids: Vec<_> = hits.iter().map(|h| h.node).collect();
    assert_eq!(ids, vec![c, b, a]);
}

#[test]
fn level_bound_stops_recursion() {
    let (mut scene, page, _) = overlapping_scene();
    let hits = scene.hit_test(
        page,
        Point::new(12.0, 12.0),
        &Transform::identity(),
        &HitTestOptions {
            // One level reaches the layer but not its shapes.
            level: 1,
            ..HitTestOptions::default()
        },
    );
    assert!(hits.is_empty());
}

#[test]
fn acceptor_filters_locked_shapes() {
    let (mut scene, page, [a, b, c]) = overlapping_scene();
    scene.set_flag(c, NodeFlag::Locked, true);
    scene.set_flag(b, NodeFlag::Locked, true);
    let unlocked = |node: &vectorkit_scene::Node| !node.flags.has(NodeFlag::Locked);
    let hits = scene.hit_test(
        page,
        Point::new(12.0, 12.0),
        &Transform::identity(),
        &HitTestOptions {
            acceptor: Some(&unlocked),
            ..HitTestOptions::default()
        },
    );
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].node, a);
}

#[test]
fn view_transform_maps_the_probe_back_to_scene_space() {
    let (mut scene, page, [a, _, _]) = overlapping_scene();
    // Scene is viewed at 2x; scene point (2, 2) shows at view (4, 4).
    let view = Transform::scaling(2.0, 2.0);
    let hits = scene.hit_test(page, Point::new(4.0, 4.0), &view, &HitTestOptions::default());
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].node, a);
}

#[test]
fn path_fill_hit_uses_the_curve_outline() {
    let (mut scene, page, layer) = Scene::with_default_page();
    let triangle = PathData::new(
        vec![
            AnchorPoint::new(0.0, 0.0),
            AnchorPoint::new(40.0, 0.0),
            AnchorPoint::new(20.0, 30.0),
        ],
        true,
    );
    scene.append_child(layer, Node::path(triangle));

    let opts = HitTestOptions::default();
    let inside = scene.hit_test(page, Point::new(20.0, 10.0), &Transform::identity(), &opts);
    assert_eq!(inside.len(), 1);
    // Inside the bbox but outside the triangle.
    let outside = scene.hit_test(page, Point::new(2.0, 25.0), &Transform::identity(), &opts);
    assert!(outside.is_empty());
}

#[test]
fn collisions_partial_versus_full_containment() {
    let (mut scene, page, [a, b, c]) = overlapping_scene();
    let area = Rect::new(-1.0, -1.0, 23.0, 23.0);

    let partial = scene.collisions(page, &area, &CollisionOptions::default());
    assert_eq!(partial, vec![a, b, c]);

    let full = scene.collisions(
        page,
        &area,
        &CollisionOptions {
            partial: false,
            ..CollisionOptions::default()
        },
    );
    assert_eq!(full, vec![a]);
}

#[test]
fn collisions_skip_hidden_shapes_but_recurse_groups() {
    let (mut scene, page, layer) = Scene::with_default_page();
    let group = scene.append_child(layer, Node::group());
    let inner = scene.append_child(group, Node::rectangle(0.0, 0.0, 10.0, 10.0));
    let hidden = scene.append_child(layer, Node::rectangle(0.0, 0.0, 10.0, 10.0));
    scene.set_flag(hidden, NodeFlag::Hidden, true);

    let found = scene.collisions(
        page,
        &Rect::new(0.0, 0.0, 50.0, 50.0),
        &CollisionOptions::default(),
    );
    assert_eq!(found, vec![inner]);
}
