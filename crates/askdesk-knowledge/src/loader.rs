//! Knowledge base loader: remote document store with local JSON fallback.
//!
//! Both sources deliver a JSON array of `{question, answer}` documents.
//! Documents missing either field are dropped; order is preserved.

use askdesk_core::config::{KnowledgeConfig, expand_path};
use askdesk_core::error::{AskDeskError, Result};
use askdesk_core::types::KnowledgeEntry;
use serde_json::Value;
use std::path::PathBuf;
use std::time::Duration;

/// Loads the ordered FAQ list at startup (and on explicit rebuild).
pub struct KnowledgeLoader {
    remote_url: Option<String>,
    remote_timeout: Duration,
    local_path: PathBuf,
    client: reqwest::Client,
}

impl KnowledgeLoader {
    pub fn new(config: &KnowledgeConfig) -> Self {
        Self {
            remote_url: config
                .remote_url
                .as_ref()
                .map(|u| u.trim().to_string())
                .filter(|u| !u.is_empty()),
            remote_timeout: Duration::from_secs(config.remote_timeout_secs.max(1)),
            local_path: expand_path(&config.local_path),
            client: reqwest::Client::new(),
        }
    }

    /// Load entries from whichever source succeeds first.
    ///
    /// Never fails: if both sources are unusable the knowledge base is empty.
    pub async fn load(&self) -> Vec<KnowledgeEntry> {
        if let Some(url) = &self.remote_url {
            tracing::info!("🌐 Fetching knowledge base from {url}");
            match self.load_remote(url).await {
                Ok(entries) => {
                    tracing::info!("✅ Loaded {} FAQ(s) from remote store", entries.len());
                    return entries;
                }
                Err(e) => tracing::warn!("❌ Remote knowledge base load failed: {e}"),
            }
        }

        tracing::info!("📄 Loading knowledge base from {}", self.local_path.display());
        match self.load_local() {
            Ok(entries) => {
                tracing::info!("✅ Loaded {} FAQ(s) from local JSON", entries.len());
                entries
            }
            Err(e) => {
                tracing::warn!("❌ Failed to load local knowledge base: {e}");
                Vec::new()
            }
        }
    }

    async fn load_remote(&self, url: &str) -> Result<Vec<KnowledgeEntry>> {
        let resp = self
            .client
            .get(url)
            .timeout(self.remote_timeout)
            .send()
            .await
            .map_err(|e| AskDeskError::Http(format!("knowledge store unreachable: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(AskDeskError::KnowledgeBase(format!(
                "remote store returned {status}"
            )));
        }

        let body: Value = resp
            .json()
            .await
            .map_err(|e| AskDeskError::KnowledgeBase(format!("invalid JSON from remote store: {e}")))?;
        non_empty(parse_documents(&body)?, "remote store")
    }

    fn load_local(&self) -> Result<Vec<KnowledgeEntry>> {
        let raw = std::fs::read_to_string(&self.local_path)?;
        let body: Value = serde_json::from_str(&raw)?;
        non_empty(parse_documents(&body)?, "local JSON")
    }
}

fn non_empty(entries: Vec<KnowledgeEntry>, origin: &str) -> Result<Vec<KnowledgeEntry>> {
    if entries.is_empty() {
        return Err(AskDeskError::KnowledgeBase(format!(
            "{origin} is empty or has no valid entries"
        )));
    }
    Ok(entries)
}

/// Extract valid entries from a document list.
///
/// Accepts a bare array or an object with a `documents` array.
pub fn parse_documents(body: &Value) -> Result<Vec<KnowledgeEntry>> {
    let docs = match body {
        Value::Array(docs) => docs,
        Value::Object(map) => map
            .get("documents")
            .and_then(|d| d.as_array())
            .ok_or_else(|| AskDeskError::KnowledgeBase("expected a `documents` array".into()))?,
        _ => {
            return Err(AskDeskError::KnowledgeBase(
                "expected a JSON array of documents".into(),
            ));
        }
    };

    let entries: Vec<KnowledgeEntry> = docs
        .iter()
        .filter_map(|doc| {
            let question = doc.get("question")?.as_str()?;
            let answer = doc.get("answer")?.as_str()?;
            Some(KnowledgeEntry::new(question, answer))
        })
        .collect();

    let dropped = docs.len() - entries.len();
    if dropped > 0 {
        tracing::debug!("🔍 Discarded {dropped} document(s) missing question or answer");
    }
    Ok(entries)
}
