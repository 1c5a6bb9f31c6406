use std::error::Error as StdError;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use domain::error::{
    DomainErrorKind, EntityErrorKind, Error as DomainError, ExternalErrorKind, InternalErrorKind,
};
use domain::pipeline::PipelineError;

use log::*;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    Domain(DomainError),
    /// A processing run failed part way through.
    Pipeline(PipelineError),
    /// The request body could not be read at all.
    BadRequest(String),
    NotFound(String),
    UnsupportedMediaType(String),
}

impl StdError for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> core::result::Result<(), std::fmt::Error> {
        match self {
            Error::Domain(err) => write!(fmt, "{err}"),
            Error::Pipeline(err) => write!(fmt, "{err}"),
            Error::BadRequest(msg) | Error::NotFound(msg) | Error::UnsupportedMediaType(msg) => {
                write!(fmt, "{msg}")
            }
        }
    }
}

fn error_body(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

// List of possible StatusCode variants https://docs.rs/http/latest/http/status/struct.StatusCode.html#associatedconstant.UNPROCESSABLE_ENTITY
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::Pipeline(err) => {
                error!("Processing run failed: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": err.to_string(), "stage": err.stage })),
                )
                    .into_response()
            }
            Error::BadRequest(msg) => error_body(StatusCode::BAD_REQUEST, msg),
            Error::NotFound(msg) => error_body(StatusCode::NOT_FOUND, msg),
            Error::UnsupportedMediaType(msg) => error_body(StatusCode::UNSUPPORTED_MEDIA_TYPE, msg),
            Error::Domain(err) => domain_error_response(err),
        }
    }
}

fn domain_error_response(err: DomainError) -> Response {
    match &err.error_kind {
        DomainErrorKind::Internal(internal_error_kind) => match internal_error_kind {
            InternalErrorKind::Validation(msg) => error_body(StatusCode::BAD_REQUEST, msg.clone()),
            InternalErrorKind::Entity(entity_error_kind) => match entity_error_kind {
                EntityErrorKind::NotFound => error_body(StatusCode::NOT_FOUND, "Record not found"),
                EntityErrorKind::Invalid => {
                    error_body(StatusCode::UNPROCESSABLE_ENTITY, "Unprocessable entity")
                }
                EntityErrorKind::DbTransaction | EntityErrorKind::Other(_) => {
                    error!("Database error: {err}");
                    error_body(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
                }
            },
            InternalErrorKind::Config
            | InternalErrorKind::Io
            | InternalErrorKind::Serialization
            | InternalErrorKind::Other(_) => {
                error!("Internal error: {err}");
                error_body(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        },
        DomainErrorKind::External(external_error_kind) => match external_error_kind {
            ExternalErrorKind::Network => {
                warn!("Upstream network error: {err}");
                error_body(StatusCode::BAD_GATEWAY, "Bad gateway")
            }
            ExternalErrorKind::Provider | ExternalErrorKind::Other(_) => {
                error!("External service error: {err}");
                error_body(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        },
    }
}

impl From<DomainError> for Error {
    fn from(err: DomainError) -> Self {
        Error::Domain(err)
    }
}

impl From<PipelineError> for Error {
    fn from(err: PipelineError) -> Self {
        Error::Pipeline(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use domain::pipeline::Stage;
    use serde_json::Value;

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn validation_errors_are_bad_requests_with_their_message() {
        let response = Error::from(DomainError::validation("Title is required")).into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await, json!({ "error": "Title is required" }));
    }

    #[tokio::test]
    async fn pipeline_errors_report_the_failed_stage() {
        let err = PipelineError {
            stage: Stage::VersionWrite,
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only").into(),
        };

        let response = Error::from(err).into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await,
            json!({
                "error": "version_write failed: file system error: read-only",
                "stage": "version_write"
            })
        );
    }

    #[tokio::test]
    async fn not_found_uses_the_given_message() {
        let response = Error::NotFound("Training module not found".to_string()).into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            body_json(response).await,
            json!({ "error": "Training module not found" })
        );
    }

    #[tokio::test]
    async fn network_errors_are_bad_gateway() {
        let err: DomainError =
            domain::ModelProviderError::Network("connection reset".to_string()).into();

        assert_eq!(Error::from(err).into_response().status(), StatusCode::BAD_GATEWAY);
    }
}
