/// Caller-facing failures of note operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NoteError {
    #[error("note {0} not found")]
    NotFound(i64),

    #[error("required field: {0}")]
    InvalidArgument(&'static str),
}
