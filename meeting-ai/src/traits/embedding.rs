//! Text embedding provider trait.

use crate::Error;
use async_trait::async_trait;

/// Abstraction for sentence embedding models.
///
/// Implementations map a piece of text to a dense vector whose direction
/// captures its meaning, so that cosine similarity between two vectors
/// approximates how related the texts are. Every vector returned by one
/// provider must have the same dimension.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait Provider: Send + Sync {
    /// Embed a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, Error>;

    /// Embed several texts, preserving input order.
    ///
    /// The default calls `embed` once per text, one after another, and stops at
    /// the first failure. Providers with a batch endpoint should override it.
    async fn embed_all(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, Error> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            embeddings.push(self.embed(text).await?);
        }
        Ok(embeddings)
    }

    /// Return unique identifier for this provider (e.g., "gemini", "openai").
    fn provider_id(&self) -> &str;
}
