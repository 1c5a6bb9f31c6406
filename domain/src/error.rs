//! Error types for the `domain` layer.
use entity_api::error::{EntityApiErrorKind, Error as EntityApiError};
use meeting_ai::Error as ModelProviderError;
use std::error::Error as StdError;
use std::fmt;

/// Top-level domain error type.
/// Errors in the Domain layer are modeled as a tree structure
/// with `domain::error::Error` as the root type holding a tree of `error_kind`
/// enums that represent the kinds of errors that can occur in the domain layer or
/// in lower layers. The `source` field is used to hold the original error that caused
/// the domain error. The intent is to translate errors between layers while maintaining
/// layer boundaries. Ex. `domain` is dependent on `entity_api` and `meeting-ai`, and `web`
/// is dependent on `domain`, but `web` should not be dependent, directly, on either of them.
/// Ultimately the various `error_kind`s are used by `web` to return appropriate HTTP status
/// codes and messages to the client.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: DomainErrorKind,
}

/// Enum representing the major categories of errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum DomainErrorKind {
    Internal(InternalErrorKind),
    External(ExternalErrorKind),
}

/// Enum representing the various kinds of internal errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum InternalErrorKind {
    Entity(EntityErrorKind),
    Config,
    /// Reading or writing generated files failed.
    Io,
    /// Persisted JSON could not be encoded or decoded.
    Serialization,
    /// Caller-supplied input was rejected; the message is safe to show to clients.
    Validation(String),
    Other(String),
}

/// Enum representing the various kinds of entity errors that can bubble up from the "Entity" layer (`entity_api` and `entity`).
/// These errors are translated from the `entity_api` layer to the `domain` layer and reduced to a subset of error kinds
/// that are relevant to the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum EntityErrorKind {
    NotFound,
    Invalid,
    DbTransaction,
    Other(String),
}

/// Enum representing the various kinds of external errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum ExternalErrorKind {
    Network,
    /// A model provider rejected the request or answered with something unusable.
    Provider,
    Other(String),
}

impl Error {
    pub fn validation(message: impl Into<String>) -> Self {
        Error {
            source: None,
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Validation(message.into())),
        }
    }
}

impl fmt::Display for DomainErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DomainErrorKind::Internal(kind) => match kind {
                InternalErrorKind::Entity(EntityErrorKind::NotFound) => write!(f, "record not found"),
                InternalErrorKind::Entity(EntityErrorKind::Invalid) => write!(f, "invalid record"),
                InternalErrorKind::Entity(EntityErrorKind::DbTransaction) => {
                    write!(f, "database error")
                }
                InternalErrorKind::Entity(EntityErrorKind::Other(msg)) => write!(f, "{msg}"),
                InternalErrorKind::Config => write!(f, "configuration error"),
                InternalErrorKind::Io => write!(f, "file system error"),
                InternalErrorKind::Serialization => write!(f, "serialization error"),
                InternalErrorKind::Validation(msg) => write!(f, "{msg}"),
                InternalErrorKind::Other(msg) => write!(f, "{msg}"),
            },
            DomainErrorKind::External(kind) => match kind {
                ExternalErrorKind::Network => write!(f, "network error"),
                ExternalErrorKind::Provider => write!(f, "model provider error"),
                ExternalErrorKind::Other(msg) => write!(f, "{msg}"),
            },
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.source {
            Some(source) => write!(f, "{}: {source}", self.error_kind),
            None => write!(f, "{}", self.error_kind),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

// This is where we translate errors from the `entity_api` layer to the `domain` layer.
impl From<EntityApiError> for Error {
    fn from(err: EntityApiError) -> Self {
        let entity_error_kind = match err.error_kind {
            EntityApiErrorKind::RecordNotFound => EntityErrorKind::NotFound,
            EntityApiErrorKind::InvalidQueryTerm | EntityApiErrorKind::ValidationError => {
                EntityErrorKind::Invalid
            }
            EntityApiErrorKind::SystemError => EntityErrorKind::DbTransaction,
            EntityApiErrorKind::Other => EntityErrorKind::Other("database error".to_string()),
        };

        Error {
            source: Some(Box::new(err)),
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Entity(entity_error_kind)),
        }
    }
}

impl From<ModelProviderError> for Error {
    fn from(err: ModelProviderError) -> Self {
        let error_kind = match &err {
            ModelProviderError::Network(_) | ModelProviderError::Timeout(_) => {
                DomainErrorKind::External(ExternalErrorKind::Network)
            }
            ModelProviderError::Configuration(_) => DomainErrorKind::Internal(InternalErrorKind::Config),
            ModelProviderError::Serialization(_) => {
                DomainErrorKind::Internal(InternalErrorKind::Serialization)
            }
            ModelProviderError::Authentication(_)
            | ModelProviderError::Provider(_)
            | ModelProviderError::NotFound(_)
            | ModelProviderError::RateLimited { .. }
            | ModelProviderError::Deserialization(_)
            | ModelProviderError::Other(_) => DomainErrorKind::External(ExternalErrorKind::Provider),
        };

        Error {
            source: Some(Box::new(err)),
            error_kind,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error {
            source: Some(Box::new(err)),
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Io),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error {
            source: Some(Box::new(err)),
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Serialization),
        }
    }
}
