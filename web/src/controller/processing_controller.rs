use crate::response::{ErrorResponse, ProcessingResponse};
use crate::{AppState, Error};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use domain::pipeline;

use log::*;

/// POST cluster all transcripts and generate one training module per cluster
#[utoipa::path(
    post,
    path = "/process-ai/",
    responses(
        (status = 200, description = "Modules generated and versions recorded", body = ProcessingResponse),
        (status = 500, description = "The run failed; `stage` names the failed step", body = ErrorResponse),
    )
)]
pub async fn process_ai(State(app_state): State<AppState>) -> Result<impl IntoResponse, Error> {
    let _run = app_state.pipeline_lock.lock().await;
    info!("POST Process AI");

    let report = pipeline::process_ai(
        app_state.db_conn_ref(),
        &app_state.pipeline_config,
        app_state.embedder.as_ref(),
        app_state.generator.as_ref(),
    )
    .await?;

    Ok(Json(ProcessingResponse {
        message: "AI processing completed successfully",
        topics: report.topic_names(),
    }))
}

/// POST group all transcripts by keyword rules and write templated modules
#[utoipa::path(
    post,
    path = "/process-keywords/",
    responses(
        (status = 200, description = "Modules written and versions recorded", body = ProcessingResponse),
        (status = 500, description = "The run failed; `stage` names the failed step", body = ErrorResponse),
    )
)]
pub async fn process_keywords(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, Error> {
    let _run = app_state.pipeline_lock.lock().await;
    info!("POST Process keywords");

    let report = pipeline::process_keywords(app_state.db_conn_ref(), &app_state.pipeline_config)
        .await?;

    Ok(Json(ProcessingResponse {
        message: "Keyword processing completed successfully",
        topics: report.topic_names(),
    }))
}
