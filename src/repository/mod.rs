use std::collections::HashMap;

use chrono::Utc;
use tokio::sync::Mutex;

use crate::{
    error::NoteError,
    models::{NewNote, Note},
};

#[derive(Default)]
struct State {
    notes: HashMap<i64, Note>,
    last_id: i64,
}

/// In-memory note collection. Every operation takes the one lock, so no
/// caller ever observes a half-applied change.
#[derive(Default)]
pub struct NoteStore {
    state: Mutex<State>,
}

impl NoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all notes, in no particular order.
    pub async fn list(&self) -> Vec<Note> {
        self.state.lock().await.notes.values().cloned().collect()
    }

    pub async fn get(&self, id: i64) -> Result<Note, NoteError> {
        self.state
            .lock()
            .await
            .notes
            .get(&id)
            .cloned()
            .ok_or(NoteError::NotFound(id))
    }

    pub async fn insert(&self, new: NewNote) -> Note {
        let mut state = self.state.lock().await;

        state.last_id += 1;
        let now = Utc::now();
        let note = Note {
            id: state.last_id,
            title: new.title,
            content: new.content,
            created_at: now,
            updated_at: now,
        };

        state.notes.insert(note.id, note.clone());
        note
    }

    /// Runs `mutator` on a copy of the note and commits it only if the
    /// mutator succeeds. `id` and `created_at` cannot be changed here.
    pub async fn apply_update<F>(&self, id: i64, mutator: F) -> Result<Note, NoteError>
    where
        F: FnOnce(&mut Note) -> Result<(), NoteError>,
    {
        let mut state = self.state.lock().await;
        let stored = state.notes.get_mut(&id).ok_or(NoteError::NotFound(id))?;

        let mut draft = stored.clone();
        mutator(&mut draft)?;

        draft.id = stored.id;
        draft.created_at = stored.created_at;
        // Wall clock may step back; updated_at must not.
        draft.updated_at = Utc::now().max(stored.updated_at);

        *stored = draft.clone();
        Ok(draft)
    }

    pub async fn delete(&self, id: i64) -> Result<(), NoteError> {
        self.state
            .lock()
            .await
            .notes
            .remove(&id)
            .map(|_| ())
            .ok_or(NoteError::NotFound(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_note(title: &str, content: &str) -> NewNote {
        NewNote {
            title: title.to_string(),
            content: content.to_string(),
        }
    }

    #[tokio::test]
    async fn ids_start_at_one_and_are_never_reused() {
        let store = NoteStore::new();

        let first = store.insert(new_note("a", "b")).await;
        let second = store.insert(new_note("c", "d")).await;
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);

        store.delete(second.id).await.unwrap();
        let third = store.insert(new_note("e", "f")).await;
        assert_eq!(third.id, 3);
    }

    #[tokio::test]
    async fn sequences_are_scoped_to_the_store() {
        let one = NoteStore::new();
        let two = NoteStore::new();

        assert_eq!(one.insert(new_note("a", "b")).await.id, 1);
        assert_eq!(two.insert(new_note("a", "b")).await.id, 1);
    }

    #[tokio::test]
    async fn returned_notes_are_copies() {
        let store = NoteStore::new();
        let mut note = store.insert(new_note("a", "b")).await;

        note.title = "mutated outside".to_string();

        assert_eq!(store.get(note.id).await.unwrap().title, "a");
    }

    #[tokio::test]
    async fn failed_mutator_leaves_note_untouched() {
        let store = NoteStore::new();
        let note = store.insert(new_note("a", "b")).await;

        let result = store
            .apply_update(note.id, |draft| {
                draft.title = "half".to_string();
                Err(NoteError::InvalidArgument("content"))
            })
            .await;

        assert_eq!(result, Err(NoteError::InvalidArgument("content")));
        assert_eq!(store.get(note.id).await.unwrap(), note);
    }

    #[tokio::test]
    async fn apply_update_pins_identity_fields() {
        let store = NoteStore::new();
        let note = store.insert(new_note("a", "b")).await;

        let updated = store
            .apply_update(note.id, |draft| {
                draft.id = 42;
                draft.created_at = chrono::DateTime::UNIX_EPOCH;
                draft.content = "c".to_string();
                Ok(())
            })
            .await
            .unwrap();

        assert_eq!(updated.id, note.id);
        assert_eq!(updated.created_at, note.created_at);
        assert!(updated.updated_at >= note.updated_at);
        assert_eq!(updated.content, "c");
    }

    #[tokio::test]
    async fn missing_ids_are_not_found() {
        let store = NoteStore::new();

        assert_eq!(store.get(7).await, Err(NoteError::NotFound(7)));
        assert_eq!(store.delete(7).await, Err(NoteError::NotFound(7)));
        assert_eq!(
            store.apply_update(7, |_| Ok(())).await,
            Err(NoteError::NotFound(7))
        );
    }
}
