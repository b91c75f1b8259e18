//! Resolution cascade.
//!
//! Four strategies, cheapest first, first success wins:
//!
//! ```text
//! 1. exact      normalized query == normalized question (first in load order)
//! 2. semantic   nearest neighbor, squared L2 strictly below threshold
//! 3. scraped    keyword window from the live website
//! 4. generated  remote language model
//!    └─ failure → apology, source=error, query logged as missed
//! ```
//!
//! No stage is retried. Stage failures are logged and the cascade moves on;
//! nothing here returns an error to the caller.

use askdesk_core::error::{AskDeskError, Result};
use askdesk_core::types::{KnowledgeEntry, ResolutionResult, Source, normalize};
use askdesk_providers::{extract_snippet, format_snippet};

use crate::assistant::Assistant;
use crate::snapshot::Snapshot;

impl Assistant {
    /// Resolve a free-text query into exactly one tagged result.
    pub async fn resolve(&self, query: &str) -> ResolutionResult {
        let snapshot = self.snapshot();
        let normalized = normalize(query);

        // ═══ Stage 1: exact ═══
        if let Some(entry) = snapshot.exact(&normalized) {
            tracing::debug!("🎯 Exact match: {}", entry.question);
            return ResolutionResult::from_entry(entry, Source::Exact);
        }

        // ═══ Stage 2: semantic ═══
        match self.semantic_match(&snapshot, &normalized).await {
            Ok(Some(entry)) => return ResolutionResult::from_entry(entry, Source::Semantic),
            Ok(None) => {}
            Err(AskDeskError::ModelUnavailable) => {
                tracing::debug!("⏭️ Semantic stage skipped: embedding model unavailable");
            }
            Err(e) => tracing::warn!("⚠️ Semantic stage failed: {e}"),
        }

        // ═══ Stage 3: website snippet ═══
        match self.snippet_fallback(query).await {
            Ok(Some(snippet)) => {
                tracing::info!("✅ Found scraped content");
                return ResolutionResult::new(snippet, query, Source::Scraped);
            }
            Ok(None) => {}
            Err(e) => tracing::warn!("⚠️ Snippet fallback failed: {e}"),
        }

        // ═══ Stage 4: generative ═══
        match self.generative_fallback(query).await {
            Ok(text) => ResolutionResult::new(text, query, Source::Generated),
            Err(e) => {
                tracing::warn!("⚠️ Generative fallback failed: {e}");
                self.log_miss(query).await;
                ResolutionResult::new(self.settings.apology.clone(), query, Source::Error)
            }
        }
    }

    async fn semantic_match<'a>(
        &self,
        snapshot: &'a Snapshot,
        normalized: &str,
    ) -> Result<Option<&'a KnowledgeEntry>> {
        let nearest = snapshot.nearest(normalized, 1).await?.into_iter().next();
        let Some((entry, distance)) = nearest else {
            return Ok(None);
        };
        // NaN compares false and is rejected with the rest
        if distance < self.settings.threshold {
            tracing::debug!("🔍 Semantic match (d={distance:.3}): {}", entry.question);
            Ok(Some(entry))
        } else {
            tracing::debug!("🔍 Nearest FAQ too far (d={distance:.3}): {}", entry.question);
            Ok(None)
        }
    }

    async fn snippet_fallback(&self, query: &str) -> Result<Option<String>> {
        let Some(source) = &self.snippet else {
            return Ok(None);
        };
        let page = source.fetch(&self.settings.snippet_url).await?;
        Ok(extract_snippet(query, &page, self.settings.window)
            .map(|snippet| format_snippet(source.provenance(), &snippet)))
    }

    async fn generative_fallback(&self, query: &str) -> Result<String> {
        let provider = self
            .provider
            .as_ref()
            .ok_or_else(|| AskDeskError::Generative("no provider configured".into()))?;
        tracing::info!("🧠 LLM fallback via {} for: {query}", provider.name());
        let reply = provider
            .generate(&self.settings.system_prompt, query, &self.settings.params)
            .await?;
        Ok(reply.trim().to_string())
    }
}
