//! Editing layer for VectorKit.
//!
//! Wraps a scene in an [`editor::Editor`] providing selection,
//! transaction-recorded mutations with bounded undo/redo, per-path preview
//! editing, an editor registry keyed by scene identity, and document
//! save/load.

pub mod document_io;
pub mod editor;
pub mod path_editor;
pub mod registry;
pub mod transaction;

pub use document_io::{load_document, save_document};
pub use editor::{Editor, EditorEvent, EditorOptions};
pub use path_editor::{PathEditor, PathPreview};
pub use registry::EditorRegistry;
pub use transaction::{EditAction, SelectionSnapshot, Transaction, UndoState};
