use chrono::{DateTime, Utc};

/// A stored note. Only the store hands these out, always as copies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for creating a note.
#[derive(Debug, Clone, Default)]
pub struct NewNote {
    pub title: String,
    pub content: String,
}

/// Sparse update payload. An empty string means the field was not supplied.
#[derive(Debug, Clone, Default)]
pub struct NotePatch {
    pub id: i64,
    pub title: String,
    pub content: String,
}

impl NotePatch {
    pub fn value(&self, field: NoteField) -> &str {
        match field {
            NoteField::Title => &self.title,
            NoteField::Content => &self.content,
        }
    }
}

/// Fields an update mask may name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteField {
    Title,
    Content,
}

impl NoteField {
    pub const ALL: [Self; 2] = [Self::Title, Self::Content];

    /// Unknown paths yield `None` and are skipped by callers.
    pub fn from_path(path: &str) -> Option<Self> {
        match path {
            "title" => Some(Self::Title),
            "content" => Some(Self::Content),
            _ => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Content => "content",
        }
    }

    pub fn set(self, note: &mut Note, value: &str) {
        let slot = match self {
            Self::Title => &mut note.title,
            Self::Content => &mut note.content,
        };
        value.clone_into(slot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_paths_are_case_sensitive() {
        assert_eq!(NoteField::from_path("title"), Some(NoteField::Title));
        assert_eq!(NoteField::from_path("content"), Some(NoteField::Content));
        assert_eq!(NoteField::from_path("Title"), None);
        assert_eq!(NoteField::from_path("created_at"), None);
    }
}
