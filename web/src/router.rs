use crate::controller::{
    health_check_controller, processing_controller, topic_controller,
    training_module_controller, transcript_controller,
};
use crate::{params, response, AppState};
use axum::{
    routing::{get, post},
    Router,
};

use utoipa::OpenApi;
use utoipa_rapidoc::RapiDoc;

// Every documented path and schema must be listed here to appear in the
// rendered OpenAPI document.
#[derive(OpenApi)]
#[openapi(
        info(
            title = "Meeting Trainer API"
        ),
        paths(
            health_check_controller::health_check,
            transcript_controller::create,
            transcript_controller::index,
            transcript_controller::read,
            processing_controller::process_ai,
            processing_controller::process_keywords,
            topic_controller::index,
            training_module_controller::read,
        ),
        components(
            schemas(
                domain::transcripts::Model,
                params::transcript::UploadParams,
                params::transcript::UploadForm,
                response::HealthResponse,
                response::MessageResponse,
                response::ProcessingResponse,
                response::TopicSummary,
                response::ModuleResponse,
                response::ErrorResponse,
            )
        ),
        tags(
            (name = "meeting_trainer", description = "Turns meeting transcripts into versioned training modules")
        )
    )]
struct ApiDoc;

pub fn define_routes(app_state: AppState) -> Router {
    Router::new()
        .merge(health_routes())
        .merge(transcript_routes(app_state.clone()))
        .merge(processing_routes(app_state.clone()))
        .merge(topic_routes(app_state.clone()))
        .merge(training_module_routes(app_state))
        .merge(RapiDoc::with_openapi("/api-docs/openapi.json", ApiDoc::openapi()).path("/rapidoc"))
}

fn health_routes() -> Router {
    Router::new().route("/health/", get(health_check_controller::health_check))
}

fn transcript_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/transcripts/", post(transcript_controller::create))
        .route("/transcripts/", get(transcript_controller::index))
        .route("/transcripts/{id}/", get(transcript_controller::read))
        .with_state(app_state)
}

fn processing_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/process-ai/", post(processing_controller::process_ai))
        .route(
            "/process-keywords/",
            post(processing_controller::process_keywords),
        )
        .with_state(app_state)
}

fn topic_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/topics/", get(topic_controller::index))
        .with_state(app_state)
}

fn training_module_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/module/{topic}/", get(training_module_controller::read))
        .with_state(app_state)
}
