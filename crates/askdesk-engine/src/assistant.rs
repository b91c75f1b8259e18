//! The `Assistant` service object.
//!
//! Holds the current knowledge snapshot and the collaborators the cascade
//! calls out to. Constructed once at startup and shared behind an `Arc`.
//! Readers clone the snapshot `Arc` under a short read lock and then run
//! lock-free; `rebuild()` swaps in a new snapshot atomically, so each
//! request observes exactly one snapshot from start to finish.

use askdesk_core::config::AskDeskConfig;
use askdesk_core::error::{AskDeskError, Result};
use askdesk_core::traits::{Encoder, GenerateParams, MissedQueryLog, Provider, SnippetSource};
use askdesk_core::types::KnowledgeEntry;
use askdesk_knowledge::{KnowledgeLoader, create_encoder};
use askdesk_providers::{SnippetWindow, create_provider, create_snippet_source};
use chrono::Utc;
use serde::Serialize;
use std::sync::{Arc, RwLock};

use crate::snapshot::Snapshot;

/// Outbound dependencies of the cascade.
pub struct Collaborators {
    /// `None` means the embedding model is unavailable.
    pub encoder: Option<Arc<dyn Encoder>>,
    pub snippet: Option<Arc<dyn SnippetSource>>,
    pub provider: Option<Arc<dyn Provider>>,
    pub missed: Arc<dyn MissedQueryLog>,
}

impl Collaborators {
    /// Initialize every collaborator named in config.
    ///
    /// An unavailable encoder is not an error; an unknown LLM provider is.
    pub async fn from_config(config: &AskDeskConfig, missed: Arc<dyn MissedQueryLog>) -> Result<Self> {
        let encoder = create_encoder(&config.embedding).await;
        let snippet = create_snippet_source(&config.snippet)?;
        let provider = create_provider(&config.llm)?;
        Ok(Self {
            encoder,
            snippet,
            provider: Some(provider),
            missed,
        })
    }
}

/// Tunables copied out of config at construction.
pub(crate) struct Settings {
    pub threshold: f32,
    pub apology: String,
    pub system_prompt: String,
    pub params: GenerateParams,
    pub snippet_url: String,
    pub window: SnippetWindow,
    pub top_k: usize,
    pub fallback_suggestions: Vec<String>,
    pub dedupe_missed_log: bool,
}

impl Settings {
    fn from_config(config: &AskDeskConfig) -> Self {
        Self {
            threshold: config.cascade.semantic_threshold,
            apology: config.cascade.apology_message.clone(),
            system_prompt: config.identity.system_prompt.clone(),
            params: GenerateParams {
                model: config.llm.model.clone(),
                max_tokens: config.llm.max_tokens,
                temperature: config.llm.temperature,
            },
            snippet_url: config.snippet.url.clone(),
            window: SnippetWindow::from(&config.snippet),
            top_k: config.suggestions.top_k,
            fallback_suggestions: config.suggestions.fallback.clone(),
            dedupe_missed_log: config.cascade.dedupe_missed_log,
        }
    }
}

/// Snapshot and collaborator summary for health checks and `askdesk check`.
#[derive(Debug, Clone, Serialize)]
pub struct AssistantStats {
    pub entries: usize,
    pub semantic: bool,
    pub encoder: Option<String>,
    pub snippet_source: Option<String>,
    pub provider: Option<String>,
}

pub struct Assistant {
    snapshot: RwLock<Arc<Snapshot>>,
    rebuild_lock: tokio::sync::Mutex<()>,
    loader: Option<KnowledgeLoader>,
    pub(crate) encoder: Option<Arc<dyn Encoder>>,
    pub(crate) snippet: Option<Arc<dyn SnippetSource>>,
    pub(crate) provider: Option<Arc<dyn Provider>>,
    missed: Arc<dyn MissedQueryLog>,
    pub(crate) settings: Settings,
}

impl Assistant {
    /// Build from an already-loaded entry list.
    pub async fn new(config: &AskDeskConfig, parts: Collaborators, entries: Vec<KnowledgeEntry>) -> Self {
        let snapshot = Snapshot::build(entries, parts.encoder.clone()).await;
        Self {
            snapshot: RwLock::new(Arc::new(snapshot)),
            rebuild_lock: tokio::sync::Mutex::new(()),
            loader: None,
            encoder: parts.encoder,
            snippet: parts.snippet,
            provider: parts.provider,
            missed: parts.missed,
            settings: Settings::from_config(config),
        }
    }

    /// Load the knowledge base and initialize collaborators from config.
    pub async fn from_config(config: &AskDeskConfig, missed: Arc<dyn MissedQueryLog>) -> Result<Self> {
        let loader = KnowledgeLoader::new(&config.knowledge);
        let entries = loader.load().await;
        let parts = Collaborators::from_config(config, missed).await?;
        let assistant = Self::new(config, parts, entries).await.with_loader(loader);

        let stats = assistant.stats();
        tracing::info!(
            "🧠 Assistant ready: {} FAQ(s), semantic={}, snippet={}, provider={}",
            stats.entries,
            stats.semantic,
            stats.snippet_source.as_deref().unwrap_or("off"),
            stats.provider.as_deref().unwrap_or("off"),
        );
        Ok(assistant)
    }

    /// Attach the loader used by `rebuild()`.
    pub fn with_loader(mut self, loader: KnowledgeLoader) -> Self {
        self.loader = Some(loader);
        self
    }

    /// The snapshot current at the time of the call.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        match self.snapshot.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    fn install(&self, snapshot: Arc<Snapshot>) {
        match self.snapshot.write() {
            Ok(mut guard) => *guard = snapshot,
            Err(poisoned) => *poisoned.into_inner() = snapshot,
        }
    }

    /// Reload the knowledge base, re-encode it, and swap the snapshot.
    ///
    /// A reload that yields no entries keeps the current snapshot when it
    /// is non-empty. Returns the entry count of the installed snapshot.
    pub async fn rebuild(&self) -> Result<usize> {
        let loader = self
            .loader
            .as_ref()
            .ok_or_else(|| AskDeskError::KnowledgeBase("no knowledge source configured".into()))?;
        let _guard = self.rebuild_lock.lock().await;

        tracing::info!("🔄 Rebuilding knowledge snapshot");
        let entries = loader.load().await;
        if entries.is_empty() && !self.snapshot().is_empty() {
            return Err(AskDeskError::KnowledgeBase(
                "reload produced no entries; keeping current snapshot".into(),
            ));
        }

        let snapshot = Arc::new(Snapshot::build(entries, self.encoder.clone()).await);
        let count = snapshot.len();
        self.install(snapshot);
        tracing::info!("✅ Knowledge snapshot rebuilt ({count} FAQ(s))");
        Ok(count)
    }

    /// Record a missed query without blocking the async workers.
    pub async fn log_miss(&self, query: &str) {
        let log = Arc::clone(&self.missed);
        let query = query.to_string();
        let at = Utc::now();
        if let Err(e) = tokio::task::spawn_blocking(move || log.record(&query, at)).await {
            tracing::error!("❌ Missed-query logger task failed: {e}");
        }
    }

    pub fn stats(&self) -> AssistantStats {
        let snapshot = self.snapshot();
        AssistantStats {
            entries: snapshot.len(),
            semantic: snapshot.semantic().is_some(),
            encoder: snapshot.semantic().map(|s| s.encoder.name().to_string()),
            snippet_source: self.snippet.as_ref().map(|s| s.provenance().to_string()),
            provider: self.provider.as_ref().map(|p| p.name().to_string()),
        }
    }

    /// Configured suggestion count.
    pub fn top_k(&self) -> usize {
        self.settings.top_k
    }

    /// Suggestions offered after a knowledge-base miss.
    pub fn fallback_suggestions(&self) -> &[String] {
        &self.settings.fallback_suggestions
    }

    /// Whether callers should skip their own miss log for `error` results,
    /// which the cascade has already logged.
    pub fn dedupe_missed_log(&self) -> bool {
        self.settings.dedupe_missed_log
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingLog;
    use askdesk_core::config::KnowledgeConfig;

    fn write_faq(path: &std::path::Path, pairs: &[(&str, &str)]) {
        let docs: Vec<serde_json::Value> = pairs
            .iter()
            .map(|(q, a)| serde_json::json!({"question": q, "answer": a}))
            .collect();
        std::fs::write(path, serde_json::Value::Array(docs).to_string()).unwrap();
    }

    fn parts(log: Arc<RecordingLog>) -> Collaborators {
        Collaborators {
            encoder: Some(Arc::new(askdesk_knowledge::HashingEncoder::new(64))),
            snippet: None,
            provider: None,
            missed: log,
        }
    }

    #[tokio::test]
    async fn test_rebuild_swaps_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("faq_data.json");
        write_faq(&path, &[("Q1", "A1")]);

        let config = AskDeskConfig::default();
        let loader = KnowledgeLoader::new(&KnowledgeConfig {
            remote_url: None,
            remote_timeout_secs: 1,
            local_path: path.to_string_lossy().into_owned(),
        });
        let entries = loader.load().await;
        let assistant = Assistant::new(&config, parts(Arc::default()), entries)
            .await
            .with_loader(loader);

        let before = assistant.snapshot();
        write_faq(&path, &[("Q1", "A1"), ("Q2", "A2")]);
        assert_eq!(assistant.rebuild().await.unwrap(), 2);

        // A reader holding the old snapshot keeps seeing it
        assert_eq!(before.len(), 1);
        assert_eq!(assistant.snapshot().len(), 2);
        assert!(assistant.stats().semantic);
    }

    #[tokio::test]
    async fn test_rebuild_keeps_snapshot_when_reload_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("faq_data.json");
        write_faq(&path, &[("Q1", "A1")]);
        let loader = KnowledgeLoader::new(&KnowledgeConfig {
            remote_url: None,
            remote_timeout_secs: 1,
            local_path: path.to_string_lossy().into_owned(),
        });
        let entries = loader.load().await;
        let assistant = Assistant::new(&AskDeskConfig::default(), parts(Arc::default()), entries)
            .await
            .with_loader(loader);

        std::fs::remove_file(&path).unwrap();
        assert!(assistant.rebuild().await.is_err());
        assert_eq!(assistant.snapshot().len(), 1);
    }

    #[tokio::test]
    async fn test_rebuild_without_loader_fails() {
        let assistant = Assistant::new(&AskDeskConfig::default(), parts(Arc::default()), Vec::new()).await;
        assert!(matches!(
            assistant.rebuild().await,
            Err(AskDeskError::KnowledgeBase(_))
        ));
    }

    #[tokio::test]
    async fn test_log_miss_reaches_logger() {
        let log = Arc::new(RecordingLog::default());
        let assistant = Assistant::new(&AskDeskConfig::default(), parts(log.clone()), Vec::new()).await;
        assistant.log_miss("where is your office?").await;
        assert_eq!(log.logged(), vec!["where is your office?".to_string()]);
    }

    #[tokio::test]
    async fn test_stats_without_encoder() {
        let config = AskDeskConfig::default();
        let collaborators = Collaborators {
            encoder: None,
            snippet: None,
            provider: None,
            missed: Arc::new(RecordingLog::default()),
        };
        let assistant = Assistant::new(&config, collaborators, vec![KnowledgeEntry::new("Q", "A")]).await;
        let stats = assistant.stats();
        assert_eq!(stats.entries, 1);
        assert!(!stats.semantic);
        assert!(stats.encoder.is_none());
        assert_eq!(assistant.top_k(), 3);
        assert_eq!(assistant.fallback_suggestions().len(), 3);
    }
}
