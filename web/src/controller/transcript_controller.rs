use crate::params::transcript::{Upload, UploadForm, UploadParams};
use crate::response::{ErrorResponse, MessageResponse};
use crate::{AppState, Error};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use domain::transcript as TranscriptApi;
use domain::Id;

use log::*;

/// POST upload a new meeting transcript as text or as a UTF-8 file
#[utoipa::path(
    post,
    path = "/transcripts/",
    request_body(
        content(
            (UploadForm = "multipart/form-data"),
            (UploadParams = "application/json"),
            (UploadParams = "application/x-www-form-urlencoded"),
        )
    ),
    responses(
        (status = 201, description = "Successfully stored the transcript", body = MessageResponse),
        (status = 400, description = "Missing title, missing content or unreadable file", body = ErrorResponse),
        (status = 415, description = "Unsupported request body type", body = ErrorResponse),
    )
)]
pub async fn create(
    State(app_state): State<AppState>,
    Upload(upload): Upload,
) -> Result<impl IntoResponse, Error> {
    debug!(
        "POST Upload transcript titled {:?} (file: {})",
        upload.title,
        upload.file.is_some()
    );

    let (transcript, source) = TranscriptApi::upload(app_state.db_conn_ref(), upload).await?;

    debug!("New transcript: {}", transcript.id);

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: source.message(),
        }),
    ))
}

/// GET all stored transcripts in processing order
#[utoipa::path(
    get,
    path = "/transcripts/",
    responses(
        (status = 200, description = "Successfully retrieved all transcripts", body = [domain::transcripts::Model]),
    )
)]
pub async fn index(State(app_state): State<AppState>) -> Result<impl IntoResponse, Error> {
    let transcripts = TranscriptApi::find_all(app_state.db_conn_ref()).await?;

    debug!("Found {} transcript(s)", transcripts.len());

    Ok(Json(transcripts))
}

/// GET a single stored transcript
#[utoipa::path(
    get,
    path = "/transcripts/{id}/",
    params(
        ("id" = Uuid, Path, description = "Transcript id to retrieve")
    ),
    responses(
        (status = 200, description = "Successfully retrieved the transcript", body = domain::transcripts::Model),
        (status = 404, description = "Transcript not found", body = ErrorResponse),
    )
)]
pub async fn read(
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    debug!("GET transcript: {id}");

    let transcript = TranscriptApi::find_by_id(app_state.db_conn_ref(), id).await?;

    Ok(Json(transcript))
}
