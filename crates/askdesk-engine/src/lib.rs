//! # AskDesk Engine
//!
//! The resolution cascade and suggestion generator, wrapped in a single
//! `Assistant` service object.
//!
//! ## Features
//! - **Exact match**: normalized lookup against the curated FAQ
//! - **Semantic match**: nearest neighbor under a strict distance threshold
//! - **Snippet fallback**: keyword window from the live website
//! - **Generative fallback**: remote LLM, apology + missed-query log on failure
//! - **Suggestions**: related questions from the same index
//! - **Rebuild**: atomic snapshot swap on reload

pub mod assistant;
pub mod cascade;
pub mod snapshot;
pub mod suggest;

#[cfg(test)]
mod testing;

pub use assistant::{Assistant, AssistantStats, Collaborators};
pub use snapshot::Snapshot;
pub use suggest::DEFAULT_SUGGESTION_COUNT;
