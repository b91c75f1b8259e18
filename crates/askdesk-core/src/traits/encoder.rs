//! Embedding encoder trait.

use async_trait::async_trait;

use crate::error::Result;

/// Maps normalized text to a fixed-dimension vector.
///
/// Implementations must be deterministic within a process: encoding the same
/// text twice has to yield vectors close enough to produce the same
/// nearest-neighbor results.
#[async_trait]
pub trait Encoder: Send + Sync {
    /// Encoder name (e.g., "hashing", "openai").
    fn name(&self) -> &str;

    /// Dimensionality of produced vectors.
    fn dimensions(&self) -> usize;

    /// Encode a single text.
    async fn encode(&self, text: &str) -> Result<Vec<f32>>;

    /// Encode a batch of texts, preserving order.
    async fn encode_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.encode(text).await?);
        }
        Ok(out)
    }
}
