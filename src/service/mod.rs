use crate::{
    error::NoteError,
    models::{NewNote, Note, NoteField, NotePatch},
    repository::NoteStore,
};

use std::sync::Arc;

/// Validation and field-mask handling on top of the store.
#[derive(Clone)]
pub struct NoteService {
    store: Arc<NoteStore>,
}

impl NoteService {
    pub const fn new(store: Arc<NoteStore>) -> Self {
        Self { store }
    }

    pub async fn list_notes(&self) -> Vec<Note> {
        self.store.list().await
    }

    pub async fn get_note(&self, id: i64) -> Result<Note, NoteError> {
        self.store.get(id).await
    }

    /// Title is checked before content, so a request with both blank
    /// reports the title.
    pub async fn create_note(&self, note: Option<NewNote>) -> Result<Note, NoteError> {
        let note = note.ok_or(NoteError::InvalidArgument("note"))?;

        if note.title.trim().is_empty() {
            return Err(NoteError::InvalidArgument("title"));
        }
        if note.content.trim().is_empty() {
            return Err(NoteError::InvalidArgument("content"));
        }

        Ok(self.store.insert(note).await)
    }

    /// Applies a sparse update.
    ///
    /// With an empty `mask` every field carrying a value in `patch` is
    /// applied. With a non-empty `mask` only the fields it names are
    /// applied, even if `patch` carries others. Mask entries that do not
    /// name a note field are ignored rather than rejected.
    pub async fn update_note(
        &self,
        patch: Option<NotePatch>,
        mask: &[String],
    ) -> Result<Note, NoteError> {
        let patch = patch.ok_or(NoteError::InvalidArgument("note"))?;

        let fields: Vec<NoteField> = if mask.is_empty() {
            NoteField::ALL
                .into_iter()
                .filter(|field| !patch.value(*field).is_empty())
                .collect()
        } else {
            mask.iter()
                .filter_map(|path| NoteField::from_path(path))
                .collect()
        };

        self.store
            .apply_update(patch.id, |note| {
                for field in fields {
                    let value = patch.value(field);
                    if value.trim().is_empty() {
                        return Err(NoteError::InvalidArgument(field.name()));
                    }
                    field.set(note, value);
                }
                Ok(())
            })
            .await
    }

    pub async fn delete_note(&self, id: i64) -> Result<(), NoteError> {
        self.store.delete(id).await
    }
}
