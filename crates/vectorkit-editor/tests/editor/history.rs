use proptest::prelude::*;

use vectorkit_core::Rect;
use vectorkit_editor::{Editor, EditorOptions};
use vectorkit_scene::serialization::Document;
use vectorkit_scene::{Node, NodeFlag, NodeId, PropertyValue, Scene};

fn fresh_editor() -> Editor {
    let (scene, _page, _layer) = Scene::with_default_page();
    Editor::new(scene)
}

fn insert_rect(editor: &mut Editor, x: f64, y: f64) -> NodeId {
    editor.insert_elements(vec![Node::rectangle(x, y, 10.0, 10.0)], false, false)[0]
}

#[test]
fn insert_commit_undo_redo_round_trip() {
    let mut editor = fresh_editor();
    let shape = insert_rect(&mut editor, 0.0, 0.0);
    assert_eq!(editor.selection(), &[shape]);
    assert_eq!(editor.undo_state_name(), Some("Insert Element(s)"));

    assert!(editor.undo_state());
    assert!(!editor.scene().contains(shape));
    assert!(editor.selection().is_empty());

    assert!(editor.redo_state());
    assert!(editor.scene().contains(shape));
    // Redo restores the post-commit selection too.
    assert_eq!(editor.selection(), &[shape]);
    assert!(editor.scene().node(shape).flags.has(NodeFlag::Selected));
}

#[test]
fn undo_stack_is_bounded_and_evicts_oldest() {
    let (scene, _page, _layer) = Scene::with_default_page();
    let mut editor = Editor::with_options(scene, EditorOptions { max_undo_steps: 3 });
    for i in 0..5 {
        insert_rect(&mut editor, i as f64 * 20.0, 0.0);
    }
    // Only the newest three commits are replayable.
    assert!(editor.undo_state());
    assert!(editor.undo_state());
    assert!(editor.undo_state());
    assert!(!editor.undo_state());
    // The two oldest rects survive as permanent history.
    let layer = editor.current_layer().unwrap();
    assert_eq!(editor.scene().children(layer).len(), 2);
}

#[test]
fn eviction_does_not_touch_the_redo_stack() {
    let (scene, _page, _layer) = Scene::with_default_page();
    let mut editor = Editor::with_options(scene, EditorOptions { max_undo_steps: 2 });
    insert_rect(&mut editor, 0.0, 0.0);
    insert_rect(&mut editor, 20.0, 0.0);
    editor.undo_state();
    assert!(editor.has_redo_state());
    // Undoing more does not evict; redo survives until the next commit.
    editor.undo_state();
    assert!(editor.has_redo_state());
    assert!(editor.redo_state());
    assert!(editor.redo_state());
}

#[test]
fn commit_clears_the_redo_stack() {
    let mut editor = fresh_editor();
    insert_rect(&mut editor, 0.0, 0.0);
    insert_rect(&mut editor, 20.0, 0.0);
    editor.undo_state();
    assert!(editor.has_redo_state());

    insert_rect(&mut editor, 40.0, 0.0);
    assert!(!editor.has_redo_state());
}

#[test]
fn push_state_clears_the_redo_stack() {
    let mut editor = fresh_editor();
    let shape = insert_rect(&mut editor, 0.0, 0.0);
    editor.undo_state();
    assert!(editor.has_redo_state());

    // A manual entry counts as new history like any commit.
    editor.push_state(
        "Manual",
        vec![vectorkit_editor::EditAction::SetFlag {
            id: editor.current_layer().unwrap(),
            flag: NodeFlag::Locked,
            set: true,
        }],
    );
    assert!(!editor.has_redo_state());
    assert!(!editor.scene().contains(shape));
}

#[test]
fn empty_transaction_is_dropped_silently() {
    let mut editor = fresh_editor();
    editor.begin_transaction();
    editor.commit_transaction("Nothing");
    assert!(!editor.has_undo_state());
}

#[test]
#[should_panic(expected = "transactions do not nest")]
fn nested_transaction_panics() {
    let mut editor = fresh_editor();
    editor.begin_transaction();
    editor.begin_transaction();
}

#[test]
#[should_panic(expected = "without an open transaction")]
fn commit_without_transaction_panics() {
    let mut editor = fresh_editor();
    editor.commit_transaction("Nothing");
}

#[test]
fn rollback_reverts_actions_and_selection() {
    let mut editor = fresh_editor();
    let kept = insert_rect(&mut editor, 0.0, 0.0);
    let layer = editor.current_layer().unwrap();

    editor.begin_transaction();
    let doomed = editor.insert_node(layer, None, Node::rectangle(50.0, 0.0, 10.0, 10.0));
    editor.update_selection(false, &[doomed]);
    editor.rollback_transaction();

    assert!(!editor.scene().contains(doomed));
    assert_eq!(editor.selection(), &[kept]);
    // Only the open transaction is discarded; committed history survives.
    assert!(editor.has_undo_state());
    editor.undo_state();
    assert!(!editor.scene().contains(kept));
}

#[test]
fn property_change_undo_restores_old_values() {
    let mut editor = fresh_editor();
    let shape = insert_rect(&mut editor, 5.0, 5.0);

    editor.begin_transaction();
    editor.set_properties(
        shape,
        &["x".into()],
        &[PropertyValue::Number(40.0)],
    );
    editor.commit_transaction("Move");

    assert_eq!(
        editor.scene_mut().geometry_bbox(shape),
        Some(Rect::new(40.0, 5.0, 10.0, 10.0))
    );
    editor.undo_state();
    assert_eq!(
        editor.scene_mut().geometry_bbox(shape),
        Some(Rect::new(5.0, 5.0, 10.0, 10.0))
    );
}

#[test]
fn delete_selection_undo_restores_nodes_and_selection() {
    let mut editor = fresh_editor();
    let a = insert_rect(&mut editor, 0.0, 0.0);
    let b = insert_rect(&mut editor, 20.0, 0.0);
    editor.update_selection(false, &[a, b]);

    editor.delete_selection();
    assert!(!editor.scene().contains(a));
    assert!(!editor.scene().contains(b));
    assert!(editor.selection().is_empty());

    editor.undo_state();
    assert!(editor.scene().contains(a));
    assert!(editor.scene().contains(b));
    let mut selected = editor.selection().to_vec();
    selected.sort();
    assert_eq!(selected, vec![a, b]);
}

// ---- transaction round-trip law ---------------------------------------------

#[derive(Debug, Clone)]
enum Op {
    Insert { x: f64, y: f64, w: f64, h: f64 },
    Move { pick: usize, dx: f64, dy: f64 },
    Remove { pick: usize },
    Lock { pick: usize },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    let coord = -100.0f64..100.0;
    let size = 1.0f64..50.0;
    prop_oneof![
        (coord.clone(), coord.clone(), size.clone(), size.clone())
            .prop_map(|(x, y, w, h)| Op::Insert { x, y, w, h }),
        (0usize..8, coord.clone(), coord.clone())
            .prop_map(|(pick, dx, dy)| Op::Move { pick, dx, dy }),
        (0usize..8).prop_map(|pick| Op::Remove { pick }),
        (0usize..8).prop_map(|pick| Op::Lock { pick }),
    ]
}

fn shapes_of(editor: &Editor) -> Vec<NodeId> {
    let layer = editor.current_layer().unwrap();
    editor.scene().children(layer).to_vec()
}

fn apply_op(editor: &mut Editor, op: &Op) {
    match op {
        Op::Insert { x, y, w, h } => {
            editor.insert_elements(vec![Node::rectangle(*x, *y, *w, *h)], false, false);
        }
        Op::Move { pick, dx, dy } => {
            let shapes = shapes_of(editor);
            if shapes.is_empty() {
                return;
            }
            let id = shapes[pick % shapes.len()];
            let x = editor.scene().node(id).property("x").unwrap().as_number().unwrap();
            let y = editor.scene().node(id).property("y").unwrap().as_number().unwrap();
            editor.begin_transaction();
            editor.set_properties(
                id,
                &["x".into(), "y".into()],
                &[PropertyValue::Number(x + dx), PropertyValue::Number(y + dy)],
            );
            editor.commit_transaction("Move");
        }
        Op::Remove { pick } => {
            let shapes = shapes_of(editor);
            if shapes.is_empty() {
                return;
            }
            let id = shapes[pick % shapes.len()];
            editor.begin_transaction();
            editor.remove_node(id);
            editor.commit_transaction("Remove");
        }
        Op::Lock { pick } => {
            let shapes = shapes_of(editor);
            if shapes.is_empty() {
                return;
            }
            let id = shapes[pick % shapes.len()];
            let locked = editor.scene().node(id).flags.has(NodeFlag::Locked);
            editor.begin_transaction();
            editor.set_flag(id, NodeFlag::Locked, !locked);
            editor.commit_transaction("Lock");
        }
    }
}

fn scene_fingerprint(editor: &Editor) -> String {
    Document::from_scene(editor.scene()).to_json().unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Undoing everything restores the initial document; redoing
    /// everything restores the final document.
    #[test]
    fn transaction_round_trip_law(ops in proptest::collection::vec(op_strategy(), 1..16)) {
        let (scene, _page, _layer) = Scene::with_default_page();
        let mut editor = Editor::with_options(scene, EditorOptions { max_undo_steps: 64 });

        let initial = scene_fingerprint(&editor);
        for op in &ops {
            apply_op(&mut editor, op);
        }
        let finished = scene_fingerprint(&editor);

        while editor.undo_state() {}
        prop_assert_eq!(scene_fingerprint(&editor), initial.clone());

        while editor.redo_state() {}
        prop_assert_eq!(scene_fingerprint(&editor), finished);
    }
}
