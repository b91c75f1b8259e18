//! Core data types shared across AskDesk crates.

use serde::{Deserialize, Serialize};

/// Normalize text for exact matching: trim surrounding whitespace, lowercase.
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// A curated question/answer pair from the knowledge base.
///
/// Entries are immutable once loaded. Their position in the loaded list is
/// the identifier that ties an entry to its embedding vector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeEntry {
    pub question: String,
    pub normalized_question: String,
    pub answer: String,
}

impl KnowledgeEntry {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        let question = question.into();
        Self {
            normalized_question: normalize(&question),
            question,
            answer: answer.into(),
        }
    }
}

/// Which cascade stage produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Exact,
    Semantic,
    Scraped,
    Generated,
    Error,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Semantic => "semantic",
            Self::Scraped => "scraped",
            Self::Generated => "generated",
            Self::Error => "error",
        }
    }

    /// Exact and semantic matches come from the curated knowledge base;
    /// everything else counts as a miss.
    pub fn is_knowledge_base(&self) -> bool {
        matches!(self, Self::Exact | Self::Semantic)
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The single tagged result of resolving one query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionResult {
    pub answer: String,
    /// The knowledge-base question that was matched, or the raw query for
    /// results that did not come from the knowledge base.
    #[serde(rename = "question")]
    pub canonical_question: String,
    pub source: Source,
    pub resolved_from_knowledge_base: bool,
}

impl ResolutionResult {
    /// Result backed by a knowledge-base entry.
    pub fn from_entry(entry: &KnowledgeEntry, source: Source) -> Self {
        Self::new(entry.answer.clone(), entry.question.clone(), source)
    }

    pub fn new(answer: impl Into<String>, canonical_question: impl Into<String>, source: Source) -> Self {
        Self {
            answer: answer.into(),
            canonical_question: canonical_question.into(),
            resolved_from_knowledge_base: source.is_knowledge_base(),
            source,
        }
    }

    /// Whether the caller should treat this result as a knowledge-base miss.
    pub fn is_miss(&self) -> bool {
        !self.resolved_from_knowledge_base
    }
}
