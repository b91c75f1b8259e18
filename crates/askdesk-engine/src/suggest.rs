//! Suggestion generator: related questions from the same vector index.

use askdesk_core::error::Result;
use askdesk_core::types::normalize;

use crate::assistant::Assistant;
use crate::snapshot::Snapshot;

/// Entries returned when no query is given, whatever `top_k` says.
pub const DEFAULT_SUGGESTION_COUNT: usize = 3;

impl Assistant {
    /// Questions related to `query`, nearest first, at most `top_k`.
    ///
    /// Without a query (or without an encoder) this returns the first
    /// `DEFAULT_SUGGESTION_COUNT` questions in load order. Internal failures
    /// yield an empty list.
    pub async fn suggest(&self, query: Option<&str>, top_k: usize) -> Vec<String> {
        let snapshot = self.snapshot();
        let query = query.filter(|q| !q.is_empty());
        let Some(query) = query else {
            return first_questions(&snapshot);
        };
        if snapshot.semantic().is_none() {
            return first_questions(&snapshot);
        }

        match related(&snapshot, query, top_k).await {
            Ok(suggestions) => suggestions,
            Err(e) => {
                tracing::warn!("⚠️ Suggestion lookup failed: {e}");
                Vec::new()
            }
        }
    }

    /// The starter list: first questions in load order.
    pub fn default_suggestions(&self) -> Vec<String> {
        first_questions(&self.snapshot())
    }
}

fn first_questions(snapshot: &Snapshot) -> Vec<String> {
    snapshot
        .entries()
        .iter()
        .take(DEFAULT_SUGGESTION_COUNT)
        .map(|e| e.question.clone())
        .collect()
}

async fn related(snapshot: &Snapshot, query: &str, top_k: usize) -> Result<Vec<String>> {
    let own = normalize(query);
    // One extra neighbor covers the query's own entry
    let hits = snapshot.nearest(query, top_k.saturating_add(1)).await?;
    Ok(hits
        .into_iter()
        .filter(|(entry, _)| entry.normalized_question != own)
        .map(|(entry, _)| entry.question.clone())
        .take(top_k)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assistant::Collaborators;
    use crate::testing::{MapEncoder, RecordingLog};
    use askdesk_core::config::AskDeskConfig;
    use askdesk_core::traits::Encoder;
    use askdesk_core::types::KnowledgeEntry;
    use askdesk_knowledge::HashingEncoder;
    use std::sync::Arc;

    fn faq() -> Vec<KnowledgeEntry> {
        [
            ("What services do you offer?", "Web design, branding and video."),
            ("Do you offer custom UI/UX design?", "Yes."),
            ("Do you offer content creation services?", "Yes, copy and social."),
            ("Can you produce marketing videos?", "Yes, short and long form."),
            ("Where is your team based?", "Remote-first."),
        ]
        .into_iter()
        .map(|(q, a)| KnowledgeEntry::new(q, a))
        .collect()
    }

    async fn assistant(entries: Vec<KnowledgeEntry>, encoder: Option<Arc<dyn Encoder>>) -> Assistant {
        let parts = Collaborators {
            encoder,
            snippet: None,
            provider: None,
            missed: Arc::new(RecordingLog::default()),
        };
        Assistant::new(&AskDeskConfig::default(), parts, entries).await
    }

    fn hashing() -> Option<Arc<dyn Encoder>> {
        Some(Arc::new(HashingEncoder::new(384)))
    }

    #[tokio::test]
    async fn test_never_suggests_own_question() {
        let a = assistant(faq(), hashing()).await;
        for entry in faq() {
            for query in [entry.question.clone(), entry.question.to_uppercase()] {
                let suggestions = a.suggest(Some(&query), 3).await;
                assert!(suggestions.len() <= 3);
                assert!(
                    !suggestions.contains(&entry.question),
                    "{query:?} suggested itself: {suggestions:?}"
                );
            }
        }
    }

    #[tokio::test]
    async fn test_no_query_returns_first_three_regardless_of_top_k() {
        let a = assistant(faq(), hashing()).await;
        let expected: Vec<String> = faq().iter().take(3).map(|e| e.question.clone()).collect();
        for top_k in [0, 1, 3, 10] {
            assert_eq!(a.suggest(None, top_k).await, expected);
        }
        assert_eq!(a.suggest(Some(""), 1).await, expected);
        assert_eq!(a.default_suggestions(), expected);
    }

    #[tokio::test]
    async fn test_nearest_first_and_truncated() {
        let encoder: Arc<dyn Encoder> = Arc::new(
            MapEncoder::new(vec![50.0])
                .with("what services do you offer?", vec![0.0])
                .with("do you offer custom ui/ux design?", vec![3.0])
                .with("do you offer content creation services?", vec![1.0])
                .with("can you produce marketing videos?", vec![2.0])
                .with("where is your team based?", vec![9.0])
                .with("Near zero", vec![0.1]),
        );
        let a = assistant(faq(), Some(encoder)).await;
        assert_eq!(
            a.suggest(Some("Near zero"), 3).await,
            vec![
                "What services do you offer?",
                "Do you offer content creation services?",
                "Can you produce marketing videos?",
            ]
        );
        assert_eq!(a.suggest(Some("Near zero"), 1).await, vec!["What services do you offer?"]);
        assert!(a.suggest(Some("Near zero"), 0).await.is_empty());
    }

    #[tokio::test]
    async fn test_unbounded_top_k_returns_every_other_question() {
        let a = assistant(faq(), hashing()).await;
        let suggestions = a.suggest(Some("What services do you offer?"), usize::MAX).await;
        assert_eq!(suggestions.len(), faq().len() - 1);
        assert!(!suggestions.contains(&"What services do you offer?".to_string()));
    }

    #[tokio::test]
    async fn test_encoder_failure_yields_empty_list() {
        let encoder: Arc<dyn Encoder> = Arc::new(MapEncoder::new(vec![0.0]).failing_on("broken"));
        let a = assistant(faq(), Some(encoder)).await;
        assert!(a.suggest(Some("broken"), 3).await.is_empty());
    }

    #[tokio::test]
    async fn test_without_encoder_falls_back_to_starter_list() {
        let a = assistant(faq(), None).await;
        assert_eq!(a.suggest(Some("video"), 3).await.len(), 3);
    }

    #[tokio::test]
    async fn test_empty_knowledge_base() {
        let a = assistant(Vec::new(), hashing()).await;
        assert!(a.suggest(None, 3).await.is_empty());
        assert!(a.suggest(Some("anything"), 3).await.is_empty());
    }
}
