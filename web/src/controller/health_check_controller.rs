use crate::response::HealthResponse;
use axum::response::IntoResponse;
use axum::Json;

/// GET a static payload confirming the API is up
#[utoipa::path(
    get,
    path = "/health/",
    responses(
        (status = 200, description = "API router is up and responding to requests", body = HealthResponse),
    )
)]
pub async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "API is working",
    })
}
