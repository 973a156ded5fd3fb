use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::handlers::grpc::proto;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct NoteResponse {
    /// Note ID
    pub id: i64,
    /// Note title
    pub title: String,
    /// Note content
    pub content: String,
    /// Creation time, never changes
    pub created_at: DateTime<Utc>,
    /// Time of the last successful update
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ListNotesResponse {
    pub notes: Vec<NoteResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateNoteRequest {
    /// Note title
    pub title: String,
    /// Note content
    pub content: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateNoteRequest {
    /// New title
    #[serde(default)]
    pub title: Option<String>,
    /// New content
    #[serde(default)]
    pub content: Option<String>,
    /// Fields to apply. When absent or empty, every supplied field is applied.
    /// Unknown names are ignored.
    #[serde(default)]
    pub update_mask: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// gRPC status code reported by the note service
    pub code: i32,
    pub message: String,
    /// Offending field for invalid arguments
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EmptyResponse {}

impl From<proto::Note> for NoteResponse {
    fn from(note: proto::Note) -> Self {
        Self {
            id: note.id,
            title: note.title,
            content: note.content,
            created_at: to_datetime(note.created_at),
            updated_at: to_datetime(note.updated_at),
        }
    }
}

fn to_datetime(ts: Option<prost_types::Timestamp>) -> DateTime<Utc> {
    ts.and_then(|ts| DateTime::from_timestamp(ts.seconds, u32::try_from(ts.nanos).ok()?))
        .unwrap_or_default()
}
