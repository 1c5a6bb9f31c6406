use crate::response::{ErrorResponse, ModuleResponse};
use crate::{AppState, Error};
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;

use log::*;

/// GET the Markdown training module for a topic
#[utoipa::path(
    get,
    path = "/module/{topic}/",
    params(
        ("topic" = String, Path, description = "Topic name; matched case-insensitively with spaces read as underscores")
    ),
    responses(
        (status = 200, description = "Successfully retrieved the module", body = ModuleResponse),
        (status = 404, description = "No module has been generated for the topic", body = ErrorResponse),
    )
)]
pub async fn read(
    State(app_state): State<AppState>,
    Path(topic): Path<String>,
) -> Result<impl IntoResponse, Error> {
    debug!("GET training module for topic: {topic}");

    let content = app_state
        .pipeline_config
        .module_store()
        .read(&topic)
        .await?
        .ok_or_else(|| Error::NotFound("Training module not found".to_string()))?;

    Ok(Json(ModuleResponse { topic, content }))
}
