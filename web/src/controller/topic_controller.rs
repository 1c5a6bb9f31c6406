use crate::response::{ErrorResponse, TopicSummary};
use crate::{AppState, Error};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;

use log::*;

/// GET every versioned topic from the last processing run
#[utoipa::path(
    get,
    path = "/topics/",
    responses(
        (status = 200, description = "Topics in the order the last run produced them", body = [TopicSummary]),
        (status = 404, description = "No processing run has completed yet", body = ErrorResponse),
    )
)]
pub async fn index(State(app_state): State<AppState>) -> Result<impl IntoResponse, Error> {
    let store = app_state.pipeline_config.version_store();

    let versions = store.load().await?.ok_or_else(|| {
        debug!("No version map at {}", store.path().display());
        Error::NotFound("No topics found. Run AI processing first.".to_string())
    })?;

    Ok(Json(TopicSummary::from_versions(&versions)))
}
