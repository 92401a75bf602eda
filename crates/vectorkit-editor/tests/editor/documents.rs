use vectorkit_core::Rect;
use vectorkit_editor::{load_document, save_document, Editor, EditorRegistry};
use vectorkit_scene::{DocumentError, Node, Scene};

#[test]
fn save_and_load_round_trip() {
    let (scene, _page, _layer) = Scene::with_default_page();
    let mut editor = Editor::new(scene);
    let ids = editor.insert_elements(vec![Node::rectangle(5.0, 5.0, 20.0, 10.0)], false, false);
    let scene_id = editor.scene().id;

    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("drawing.json");
    save_document(&editor, &file).unwrap();

    let mut loaded = load_document(&file).unwrap();
    assert_eq!(loaded.scene().id, scene_id);
    // A fresh editor is focused on the document's first page and layer.
    let page = loaded.current_page().unwrap();
    let layer = loaded.current_layer().unwrap();
    assert_eq!(loaded.scene().children(page), &[layer]);
    let shape = loaded.scene().children(layer)[0];
    assert_eq!(
        loaded.scene_mut().geometry_bbox(shape),
        Some(Rect::new(5.0, 5.0, 20.0, 10.0))
    );
    assert_eq!(
        loaded.scene().node(shape).style,
        editor.scene().node(ids[0]).style
    );
    // History and selection are session state, not document state.
    assert!(!loaded.has_undo_state());
    assert!(loaded.selection().is_empty());
}

#[test]
fn missing_file_reports_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.json");
    assert!(matches!(
        load_document(&missing),
        Err(DocumentError::Io(_))
    ));
}

#[test]
fn malformed_json_reports_a_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("broken.json");
    std::fs::write(&file, "{ not json").unwrap();
    assert!(matches!(
        load_document(&file),
        Err(DocumentError::Json(_))
    ));
}

#[test]
fn loaded_editor_registers_under_the_document_id() {
    let (scene, _page, _layer) = Scene::with_default_page();
    let editor = Editor::new(scene);
    let scene_id = editor.scene().id;

    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("drawing.json");
    save_document(&editor, &file).unwrap();

    let mut registry = EditorRegistry::new();
    let id = registry.open(load_document(&file).unwrap());
    assert_eq!(id, scene_id);
    assert!(registry.get_mut(id).is_some());
}
