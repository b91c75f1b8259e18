//! Embedding encoders and the factory that picks one from config.

mod hashing;
#[cfg(feature = "onnx")]
mod onnx;
mod remote;
#[cfg(feature = "onnx")]
mod wordpiece;

pub use hashing::HashingEncoder;
#[cfg(feature = "onnx")]
pub use onnx::OnnxEncoder;
pub use remote::{RemoteEncoder, RemoteKind};

use askdesk_core::config::EmbeddingConfig;
use askdesk_core::traits::Encoder;
use std::sync::Arc;

/// Initialize the configured encoder.
///
/// `None` means the model is unavailable (disabled, unknown, or failed to
/// initialize); callers treat that as `ModelUnavailable` and skip semantic
/// matching instead of aborting.
pub async fn create_encoder(config: &EmbeddingConfig) -> Option<Arc<dyn Encoder>> {
    let kind = match config.provider.as_str() {
        "hashing" => {
            tracing::info!("🧮 Using hashing encoder ({} dims)", config.dimensions);
            return Some(Arc::new(HashingEncoder::new(config.dimensions)));
        }
        "none" | "" => {
            tracing::info!("⏭️ Embedding encoder disabled");
            return None;
        }
        "onnx" => return load_onnx(config),
        "openai" => RemoteKind::OpenAi,
        "ollama" => RemoteKind::Ollama,
        other => {
            tracing::warn!("⚠️ Unknown embedding provider '{other}', semantic matching disabled");
            return None;
        }
    };

    match RemoteEncoder::connect(kind, config).await {
        Ok(encoder) => {
            tracing::info!(
                "✅ Embedding model ready ({}, {}, {} dims)",
                encoder.name(),
                config.model,
                encoder.dimensions()
            );
            Some(Arc::new(encoder))
        }
        Err(e) => {
            tracing::warn!("⚠️ Embedding model loading failed: {e}");
            None
        }
    }
}

#[cfg(feature = "onnx")]
fn load_onnx(config: &EmbeddingConfig) -> Option<Arc<dyn Encoder>> {
    let dir = askdesk_core::config::expand_path(&config.model);
    match OnnxEncoder::load(&dir, config.dimensions) {
        Ok(encoder) => {
            tracing::info!("✅ Local ONNX model ready ({}, {} dims)", dir.display(), config.dimensions);
            Some(Arc::new(encoder))
        }
        Err(e) => {
            tracing::warn!("⚠️ Embedding model loading failed: {e}");
            None
        }
    }
}

#[cfg(not(feature = "onnx"))]
fn load_onnx(_config: &EmbeddingConfig) -> Option<Arc<dyn Encoder>> {
    tracing::warn!("⚠️ Built without the `onnx` feature, semantic matching disabled");
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_factory_choices() {
        let hashing = create_encoder(&EmbeddingConfig::default()).await;
        assert_eq!(hashing.map(|e| e.name().to_string()).as_deref(), Some("hashing"));

        let none = EmbeddingConfig {
            provider: "none".into(),
            ..Default::default()
        };
        assert!(create_encoder(&none).await.is_none());

        let unknown = EmbeddingConfig {
            provider: "word2vec".into(),
            ..Default::default()
        };
        assert!(create_encoder(&unknown).await.is_none());
    }

    #[tokio::test]
    async fn test_onnx_without_model_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let onnx = EmbeddingConfig {
            provider: "onnx".into(),
            model: dir.path().display().to_string(),
            ..Default::default()
        };
        assert!(create_encoder(&onnx).await.is_none());
    }
}
