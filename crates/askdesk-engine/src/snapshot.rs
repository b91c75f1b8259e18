//! Immutable knowledge snapshot: entries plus their vector index.

use askdesk_core::error::{AskDeskError, Result};
use askdesk_core::traits::Encoder;
use askdesk_core::types::KnowledgeEntry;
use askdesk_knowledge::{FlatIndex, Neighbor};
use std::sync::Arc;

/// Encoder paired with the index it produced. Position `i` in the index
/// is entry `i` in the snapshot.
pub struct SemanticIndex {
    pub encoder: Arc<dyn Encoder>,
    pub index: FlatIndex,
}

pub struct Snapshot {
    entries: Vec<KnowledgeEntry>,
    semantic: Option<SemanticIndex>,
}

impl Snapshot {
    /// Encode every normalized question and index the vectors.
    ///
    /// Encoding failure leaves the snapshot without semantic search
    /// rather than failing the build.
    pub async fn build(entries: Vec<KnowledgeEntry>, encoder: Option<Arc<dyn Encoder>>) -> Self {
        let semantic = match encoder {
            Some(encoder) => match Self::index_entries(&entries, encoder.as_ref()).await {
                Ok(index) => Some(SemanticIndex { encoder, index }),
                Err(e) => {
                    tracing::warn!("⚠️ Failed to index knowledge base, semantic matching disabled: {e}");
                    None
                }
            },
            None => None,
        };
        Self { entries, semantic }
    }

    async fn index_entries(entries: &[KnowledgeEntry], encoder: &dyn Encoder) -> Result<FlatIndex> {
        let questions: Vec<String> = entries
            .iter()
            .map(|e| e.normalized_question.clone())
            .collect();
        let vectors = if questions.is_empty() {
            Vec::new()
        } else {
            encoder.encode_batch(&questions).await?
        };
        if vectors.len() != entries.len() {
            return Err(AskDeskError::Index(format!(
                "encoded {} of {} questions",
                vectors.len(),
                entries.len()
            )));
        }
        FlatIndex::build(encoder.dimensions(), vectors)
    }

    pub fn entries(&self) -> &[KnowledgeEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn semantic(&self) -> Option<&SemanticIndex> {
        self.semantic.as_ref()
    }

    /// First entry whose normalized question equals `normalized`.
    pub fn exact(&self, normalized: &str) -> Option<&KnowledgeEntry> {
        self.entries
            .iter()
            .find(|e| e.normalized_question == normalized)
    }

    /// Encode `text` and return its `k` nearest entries.
    pub async fn nearest(&self, text: &str, k: usize) -> Result<Vec<(&KnowledgeEntry, f32)>> {
        let semantic = self.semantic.as_ref().ok_or(AskDeskError::ModelUnavailable)?;
        let vector = semantic.encoder.encode(text).await?;
        let hits = semantic.index.query(&vector, k)?;
        Ok(hits
            .into_iter()
            .filter_map(|Neighbor { position, distance }| {
                self.entries.get(position).map(|e| (e, distance))
            })
            .collect())
    }
}
