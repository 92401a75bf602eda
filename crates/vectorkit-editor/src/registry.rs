//! Editor registry keyed by scene identity. No hidden statics; the
//! embedding application owns the registry.

use std::collections::HashMap;

use uuid::Uuid;

use crate::editor::Editor;

#[derive(Default)]
pub struct EditorRegistry {
    editors: HashMap<Uuid, Editor>,
}

impl EditorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an editor under its scene's id, returning the id. An
    /// editor already registered for the same scene is replaced.
    pub fn open(&mut self, editor: Editor) -> Uuid {
        let id = editor.scene().id;
        self.editors.insert(id, editor);
        id
    }

    pub fn get(&self, id: Uuid) -> Option<&Editor> {
        self.editors.get(&id)
    }

    pub fn get_mut(&mut self, id: Uuid) -> Option<&mut Editor> {
        self.editors.get_mut(&id)
    }

    pub fn close(&mut self, id: Uuid) -> Option<Editor> {
        self.editors.remove(&id)
    }

    pub fn is_empty(&self) -> bool {
        self.editors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.editors.len()
    }
}
