//! HTTP/JSON gateway. Every handler is a translation onto the gRPC note
//! service; the gateway holds no note state of its own.

use axum::{
    Json, Router,
    extract::{
        State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use axum_macros::{FromRequest, FromRequestParts, debug_handler};
use tonic::{Code, Status, transport::Channel};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::{
    dto::{
        CreateNoteRequest, EmptyResponse, ErrorResponse, ListNotesResponse, NoteResponse,
        UpdateNoteRequest,
    },
    handlers::grpc::{
        FIELD_METADATA_KEY,
        proto::{self, note_service_client::NoteServiceClient},
    },
};

pub type NoteClient = NoteServiceClient<Channel>;

#[derive(OpenApi)]
#[openapi(
    paths(list_notes, get_note, create_note, update_note, delete_note),
    components(schemas(
        NoteResponse,
        ListNotesResponse,
        CreateNoteRequest,
        UpdateNoteRequest,
        ErrorResponse,
        EmptyResponse
    )),
    tags(
        (name = "notes", description = "Notes management API")
    )
)]
pub struct ApiDoc;

/// JSON body extractor that reports rejections as [`ErrorResponse`].
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(BadRequest))]
pub struct JsonBody<T>(pub T);

/// Path extractor that reports rejections as [`ErrorResponse`].
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(BadRequest))]
pub struct NotePath<T>(pub T);

/// A request axum could not decode. Answered like an invalid argument
/// from the note service, without the call ever leaving the gateway.
#[derive(Debug)]
pub struct BadRequest(String);

impl From<JsonRejection> for BadRequest {
    fn from(rejection: JsonRejection) -> Self {
        Self(rejection.body_text())
    }
}

impl From<PathRejection> for BadRequest {
    fn from(rejection: PathRejection) -> Self {
        Self(rejection.body_text())
    }
}

impl IntoResponse for BadRequest {
    fn into_response(self) -> Response {
        tracing::debug!("rejected request: {}", self.0);
        error_response(&Status::invalid_argument(self.0))
    }
}

pub fn router(client: NoteClient) -> Router {
    Router::new()
        .route("/v1/notes", get(list_notes).post(create_note))
        .route(
            "/v1/notes/{id}",
            get(get_note)
                .patch(update_note)
                .put(update_note)
                .delete(delete_note),
        )
        .route("/v1/openapi.json", get(openapi))
        .with_state(client)
        .layer(TraceLayer::new_for_http())
}

#[utoipa::path(
    get,
    path = "/v1/notes",
    responses(
        (status = 200, description = "List of all notes", body = ListNotesResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "notes"
)]
#[debug_handler]
pub async fn list_notes(State(mut client): State<NoteClient>) -> Response {
    match client.list_notes(()).await {
        Ok(response) => {
            let notes = response
                .into_inner()
                .notes
                .into_iter()
                .map(NoteResponse::from)
                .collect();
            (StatusCode::OK, Json(ListNotesResponse { notes })).into_response()
        }
        Err(status) => error_response(&status),
    }
}

#[utoipa::path(
    get,
    path = "/v1/notes/{id}",
    params(
        ("id" = i64, Path, description = "Note ID")
    ),
    responses(
        (status = 200, description = "Note found", body = NoteResponse),
        (status = 404, description = "Note not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "notes"
)]
#[debug_handler]
pub async fn get_note(
    State(mut client): State<NoteClient>,
    NotePath(id): NotePath<i64>,
) -> Response {
    match client.get_note(proto::GetNoteRequest { note_id: id }).await {
        Ok(note) => note_response(note.into_inner()),
        Err(status) => error_response(&status),
    }
}

#[utoipa::path(
    post,
    path = "/v1/notes",
    request_body = CreateNoteRequest,
    responses(
        (status = 200, description = "Note created successfully", body = NoteResponse),
        (status = 400, description = "Required field missing or malformed body", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "notes"
)]
#[debug_handler]
pub async fn create_note(
    State(mut client): State<NoteClient>,
    JsonBody(payload): JsonBody<CreateNoteRequest>,
) -> Response {
    let request = proto::CreateNoteRequest {
        note: Some(proto::Note {
            title: payload.title,
            content: payload.content,
            ..proto::Note::default()
        }),
    };

    match client.create_note(request).await {
        Ok(note) => note_response(note.into_inner()),
        Err(status) => error_response(&status),
    }
}

#[utoipa::path(
    patch,
    path = "/v1/notes/{id}",
    params(
        ("id" = i64, Path, description = "Note ID")
    ),
    request_body = UpdateNoteRequest,
    responses(
        (status = 200, description = "Note updated successfully", body = NoteResponse),
        (status = 400, description = "Masked field is blank or malformed request", body = ErrorResponse),
        (status = 404, description = "Note not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "notes"
)]
#[debug_handler]
pub async fn update_note(
    State(mut client): State<NoteClient>,
    NotePath(id): NotePath<i64>,
    JsonBody(payload): JsonBody<UpdateNoteRequest>,
) -> Response {
    let request = proto::UpdateNoteRequest {
        note: Some(proto::Note {
            id,
            title: payload.title.unwrap_or_default(),
            content: payload.content.unwrap_or_default(),
            ..proto::Note::default()
        }),
        update_mask: Some(prost_types::FieldMask {
            paths: payload.update_mask.unwrap_or_default(),
        }),
    };

    match client.update_note(request).await {
        Ok(note) => note_response(note.into_inner()),
        Err(status) => error_response(&status),
    }
}

#[utoipa::path(
    delete,
    path = "/v1/notes/{id}",
    params(
        ("id" = i64, Path, description = "Note ID")
    ),
    responses(
        (status = 200, description = "Note deleted successfully", body = EmptyResponse),
        (status = 404, description = "Note not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "notes"
)]
#[debug_handler]
pub async fn delete_note(
    State(mut client): State<NoteClient>,
    NotePath(id): NotePath<i64>,
) -> Response {
    match client.delete_note(proto::DeleteNoteRequest { note_id: id }).await {
        Ok(_) => (StatusCode::OK, Json(EmptyResponse {})).into_response(),
        Err(status) => error_response(&status),
    }
}

async fn openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

fn note_response(note: proto::Note) -> Response {
    (StatusCode::OK, Json(NoteResponse::from(note))).into_response()
}

/// Keeps the error kind from the note service: not-found stays 404 and
/// invalid arguments stay 400. Anything else is ours to report as 500.
fn error_response(status: &Status) -> Response {
    let http_status = match status.code() {
        Code::NotFound => StatusCode::NOT_FOUND,
        Code::InvalidArgument => StatusCode::BAD_REQUEST,
        code => {
            tracing::error!("note service call failed ({code:?}): {}", status.message());
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let body = ErrorResponse {
        code: status.code() as i32,
        message: status.message().to_string(),
        field: status
            .metadata()
            .get(FIELD_METADATA_KEY)
            .and_then(|value| value.to_str().ok())
            .map(ToOwned::to_owned),
    };

    (http_status, Json(body)).into_response()
}
