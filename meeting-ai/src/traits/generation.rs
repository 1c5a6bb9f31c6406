//! Generative text provider trait.

use crate::Error;
use async_trait::async_trait;

/// Abstraction for large language models that answer a single text prompt.
///
/// The response is returned exactly as the model produced it; callers decide
/// how to interpret or persist it. Implementations make one request per call
/// and do not retry.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait Provider: Send + Sync {
    /// Generate a completion for `prompt`.
    async fn generate(&self, prompt: &str) -> Result<String, Error>;

    /// Return unique identifier for this provider (e.g., "gemini", "openai").
    fn provider_id(&self) -> &str;
}
