//! Error types for AskDesk.

use thiserror::Error;

/// Unified error type for all AskDesk operations.
#[derive(Debug, Error)]
pub enum AskDeskError {
    /// The embedding model failed to initialize (or is disabled).
    #[error("Embedding model unavailable")]
    ModelUnavailable,

    /// The external snippet source could not be fetched or parsed.
    #[error("External fetch failed: {0}")]
    ExternalFetch(String),

    /// The generative fallback call failed (network, quota, malformed response, timeout).
    #[error("Generative fallback failed: {0}")]
    Generative(String),

    /// A request at the API boundary is missing a required field.
    #[error("{0}")]
    MalformedRequest(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("API key missing for provider: {0}")]
    ApiKeyMissing(String),

    #[error("Provider not found: {0}")]
    ProviderNotFound(String),

    #[error("Encoder error: {0}")]
    Encoder(String),

    #[error("Vector index error: {0}")]
    Index(String),

    #[error("Knowledge base error: {0}")]
    KnowledgeBase(String),

    #[error("Storage error: {0}")]
    Memory(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl AskDeskError {
    /// Whether this error may be shown to an API client verbatim.
    pub fn is_client_facing(&self) -> bool {
        matches!(self, Self::MalformedRequest(_))
    }
}

/// Result alias using `AskDeskError`.
pub type Result<T> = std::result::Result<T, AskDeskError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_malformed_request_is_client_facing() {
        assert!(AskDeskError::MalformedRequest("message".into()).is_client_facing());
        assert!(!AskDeskError::ModelUnavailable.is_client_facing());
        assert!(!AskDeskError::Generative("quota".into()).is_client_facing());
        assert!(!AskDeskError::ExternalFetch("timeout".into()).is_client_facing());
    }

    #[test]
    fn test_io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "faq.json");
        let err: AskDeskError = io.into();
        assert!(err.to_string().contains("faq.json"));
    }
}
