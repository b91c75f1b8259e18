//! Trait seams between the resolution engine and its collaborators.

pub mod encoder;
pub mod missed;
pub mod provider;
pub mod snippet;

pub use encoder::Encoder;
pub use missed::MissedQueryLog;
pub use provider::{GenerateParams, Provider};
pub use snippet::SnippetSource;
