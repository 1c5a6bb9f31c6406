//! Business logic for turning stored meeting transcripts into versioned
//! Markdown training modules.
//!
//! `web` depends on this crate alone; the items re-exported below keep it from
//! reaching into `entity_api` or `meeting-ai` directly.
pub use entity_api::{transcripts, Id};
pub use meeting_ai::{embedding, generation, Error as ModelProviderError};

pub mod cluster;
pub mod error;
pub mod gateway;
pub mod pipeline;
pub mod storage;
pub mod topic;
pub mod training_module;
pub mod transcript;
pub mod version;
