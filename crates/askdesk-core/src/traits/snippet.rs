//! External snippet source trait.

use async_trait::async_trait;

use crate::error::Result;

/// A live external text source (e.g., the business website).
#[async_trait]
pub trait SnippetSource: Send + Sync {
    /// Human-readable provenance shown next to extracted snippets (e.g., "hirebie.com").
    fn provenance(&self) -> &str;

    /// Fetch the plain text behind `identifier`.
    ///
    /// Implementations bound the call with a timeout and report every failure
    /// as an `Err`; they never panic.
    async fn fetch(&self, identifier: &str) -> Result<String>;
}
