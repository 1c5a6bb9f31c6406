//! Error types for model provider operations.

use std::fmt;

/// Provider-neutral error type shared by every embedding and generation provider.
///
/// Implementations map their native failures (HTTP status codes, SDK errors,
/// decode failures) onto these variants so callers can tell an authentication
/// problem from a rate limit or an unreadable response without knowing which
/// provider is behind the trait object.
#[derive(Debug)]
pub enum Error {
    /// API key missing, invalid, or lacking permission for the requested model.
    Authentication(String),

    /// Network connectivity issues, DNS failures, or connection resets.
    Network(String),

    /// Missing or malformed provider settings (no API key, bad model name).
    Configuration(String),

    /// The provider rejected or failed the request (non-success status, blocked prompt).
    Provider(String),

    /// Operation exceeded the configured or provider-enforced timeout period.
    Timeout(String),

    /// Requested model or endpoint does not exist.
    NotFound(String),

    /// Provider rate limit exceeded. Callers must wait before retrying.
    RateLimited { retry_after_seconds: u64 },

    /// Failed to serialize the request body.
    Serialization(String),

    /// The provider's response could not be decoded into the expected shape.
    Deserialization(String),

    /// Catch-all for errors that don't fit other categories.
    Other(Box<dyn std::error::Error + Send + Sync>),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Authentication(msg) => write!(f, "Authentication failed: {msg}"),
            Error::Network(msg) => write!(f, "Network error: {msg}"),
            Error::Configuration(msg) => write!(f, "Invalid configuration: {msg}"),
            Error::Provider(msg) => write!(f, "Provider error: {msg}"),
            Error::Timeout(msg) => write!(f, "Timeout: {msg}"),
            Error::NotFound(msg) => write!(f, "Not found: {msg}"),
            Error::RateLimited {
                retry_after_seconds,
            } => write!(f, "Rate limited: retry after {retry_after_seconds}s"),
            Error::Serialization(msg) => write!(f, "Serialization error: {msg}"),
            Error::Deserialization(msg) => write!(f, "Deserialization error: {msg}"),
            Error::Other(err) => write!(f, "Other error: {err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Other(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}
