//! # AskDesk Core
//!
//! Shared building blocks for the AskDesk FAQ assistant:
//! - **Types**: knowledge entries and the tagged `ResolutionResult`
//! - **Traits**: the seams to embedding models, language models,
//!   external snippet sources and the missed-query log
//! - **Config**: TOML configuration with defaults for every field
//! - **Errors**: a single error enum shared by all crates

pub mod config;
pub mod error;
pub mod traits;
pub mod types;

pub use config::AskDeskConfig;
pub use error::{AskDeskError, Result};
pub use types::{KnowledgeEntry, ResolutionResult, Source};
