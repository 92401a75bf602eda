//! Document save/load on top of the scene persistence contract.

use std::fs;
use std::path::Path;

use tracing::debug;
use vectorkit_scene::serialization::Document;
use vectorkit_scene::DocumentError;

use crate::editor::Editor;

/// Serializes the editor's scene to a JSON document file.
pub fn save_document(editor: &Editor, path: &Path) -> Result<(), DocumentError> {
    let json = Document::from_scene(editor.scene()).to_json()?;
    fs::write(path, json)?;
    debug!(path = %path.display(), "document saved");
    Ok(())
}

/// Loads a document file into a fresh editor. Any failure leaves nothing
/// constructed.
pub fn load_document(path: &Path) -> Result<Editor, DocumentError> {
    let json = fs::read_to_string(path)?;
    let scene = Document::from_json(&json)?.build_scene()?;
    debug!(path = %path.display(), "document loaded");
    Ok(Editor::new(scene))
}
