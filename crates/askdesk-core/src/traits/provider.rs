//! Generative fallback provider trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Parameters for a single generation call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateParams {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for GenerateParams {
    fn default() -> Self {
        Self {
            model: "gpt-3.5-turbo".into(),
            max_tokens: 200,
            temperature: 0.7,
        }
    }
}

/// A remote language model used as the last-resort answer source.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Provider name.
    fn name(&self) -> &str;

    /// Generate a reply to `user_query` under `system_prompt`.
    async fn generate(
        &self,
        system_prompt: &str,
        user_query: &str,
        params: &GenerateParams,
    ) -> Result<String>;
}
