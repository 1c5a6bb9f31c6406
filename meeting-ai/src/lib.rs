//! Model provider abstraction layer for transcript embedding and text generation.
//!
//! This crate provides trait-based abstractions for the two model calls the
//! training pipeline depends on:
//! - Embedding providers that turn transcript text into a fixed-size vector
//! - Generation providers that turn a prompt into free-form text
//!
//! The design is provider-agnostic, enabling applications to swap between
//! different service providers (Gemini, OpenAI, a local model, a test fake)
//! without changing application code.

pub mod error;
pub mod traits;

// Re-export commonly used types
pub use error::Error;
pub use traits::{embedding, generation};
