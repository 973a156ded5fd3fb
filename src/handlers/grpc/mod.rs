use std::sync::Arc;

use chrono::{DateTime, Utc};
use tonic::{Request, Response, Status, metadata::MetadataValue};

use crate::{
    error::NoteError,
    models::{self, NewNote, NotePatch},
    service::NoteService,
};

// Include the generated proto code
pub mod proto {
    tonic::include_proto!("note.v1");
}

/// Encoded descriptors of `note.v1`, served through gRPC reflection.
pub const FILE_DESCRIPTOR_SET: &[u8] = tonic::include_file_descriptor_set!("note_descriptor");

use proto::{
    CreateNoteRequest, DeleteNoteRequest, GetNoteRequest, ListNotesResponse, Note,
    UpdateNoteRequest,
    note_service_server::{NoteService as NoteServiceTrait, NoteServiceServer},
};

/// Metadata key carrying the offending field of an `InvalidArgument` status.
pub const FIELD_METADATA_KEY: &str = "field";

// gRPC service implementation
pub struct GrpcNoteService {
    service: Arc<NoteService>,
}

impl GrpcNoteService {
    pub const fn new(service: Arc<NoteService>) -> Self {
        Self { service }
    }
}

#[tonic::async_trait]
impl NoteServiceTrait for GrpcNoteService {
    async fn list_notes(
        &self,
        _request: Request<()>,
    ) -> Result<Response<ListNotesResponse>, Status> {
        let notes = self
            .service
            .list_notes()
            .await
            .into_iter()
            .map(Note::from)
            .collect();

        Ok(Response::new(ListNotesResponse { notes }))
    }

    async fn get_note(&self, request: Request<GetNoteRequest>) -> Result<Response<Note>, Status> {
        let req = request.into_inner();

        self.service
            .get_note(req.note_id)
            .await
            .map(|note| Response::new(note.into()))
            .map_err(to_status)
    }

    async fn create_note(
        &self,
        request: Request<CreateNoteRequest>,
    ) -> Result<Response<Note>, Status> {
        let req = request.into_inner();
        let new_note = req.note.map(|note| NewNote {
            title: note.title,
            content: note.content,
        });

        let note = self.service.create_note(new_note).await.map_err(to_status)?;
        tracing::info!("Created note {}", note.id);

        Ok(Response::new(note.into()))
    }

    async fn update_note(
        &self,
        request: Request<UpdateNoteRequest>,
    ) -> Result<Response<Note>, Status> {
        let req = request.into_inner();
        let patch = req.note.map(|note| NotePatch {
            id: note.id,
            title: note.title,
            content: note.content,
        });
        let mask = req.update_mask.map(|mask| mask.paths).unwrap_or_default();

        self.service
            .update_note(patch, &mask)
            .await
            .map(|note| Response::new(note.into()))
            .map_err(to_status)
    }

    async fn delete_note(
        &self,
        request: Request<DeleteNoteRequest>,
    ) -> Result<Response<()>, Status> {
        let req = request.into_inner();

        self.service
            .delete_note(req.note_id)
            .await
            .map_err(to_status)?;
        tracing::info!("Deleted note {}", req.note_id);

        Ok(Response::new(()))
    }
}

// Caller errors, so they stay at debug level.
fn to_status(err: NoteError) -> Status {
    tracing::debug!("Rejected note request: {err}");

    match err {
        NoteError::NotFound(_) => Status::not_found(err.to_string()),
        NoteError::InvalidArgument(field) => {
            let mut status = Status::invalid_argument(err.to_string());
            status
                .metadata_mut()
                .insert(FIELD_METADATA_KEY, MetadataValue::from_static(field));
            status
        }
    }
}

impl From<models::Note> for Note {
    fn from(note: models::Note) -> Self {
        Self {
            id: note.id,
            title: note.title,
            content: note.content,
            created_at: Some(timestamp(note.created_at)),
            updated_at: Some(timestamp(note.updated_at)),
        }
    }
}

fn timestamp(at: DateTime<Utc>) -> prost_types::Timestamp {
    prost_types::Timestamp {
        seconds: at.timestamp(),
        nanos: i32::try_from(at.timestamp_subsec_nanos()).unwrap_or_default(),
    }
}

pub fn create_grpc_server(service: Arc<NoteService>) -> NoteServiceServer<GrpcNoteService> {
    NoteServiceServer::new(GrpcNoteService::new(service))
}
