//! Remote embedding encoders.
//!
//! OpenAI's `/embeddings` and Ollama's `/api/embed` share the same request
//! shape; they differ in response layout and authentication.

use askdesk_core::config::EmbeddingConfig;
use askdesk_core::error::{AskDeskError, Result};
use askdesk_core::traits::Encoder;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Which wire format the endpoint speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteKind {
    OpenAi,
    Ollama,
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    data: Vec<OpenAiEmbedding>,
}

#[derive(Debug, Deserialize)]
struct OpenAiEmbedding {
    embedding: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    embeddings: Vec<Vec<f32>>,
}

pub struct RemoteEncoder {
    kind: RemoteKind,
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    dims: usize,
}

impl RemoteEncoder {
    /// Build an encoder from config without touching the network.
    pub fn new(kind: RemoteKind, config: &EmbeddingConfig) -> Self {
        let endpoint = if config.endpoint.is_empty() {
            match kind {
                RemoteKind::OpenAi => "https://api.openai.com/v1".to_string(),
                RemoteKind::Ollama => std::env::var("OLLAMA_HOST")
                    .unwrap_or_else(|_| "http://localhost:11434".to_string()),
            }
        } else {
            config.endpoint.clone()
        };

        let api_key = if !config.api_key.is_empty() {
            config.api_key.clone()
        } else if kind == RemoteKind::OpenAi {
            std::env::var("OPENAI_API_KEY").unwrap_or_default()
        } else {
            String::new()
        };

        Self {
            kind,
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .unwrap_or_default(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key,
            model: config.model.clone(),
            dims: config.dimensions,
        }
    }

    /// Build and check the endpoint with one request.
    ///
    /// Fails when the endpoint is unreachable or returns vectors of a
    /// different dimension than configured.
    pub async fn connect(kind: RemoteKind, config: &EmbeddingConfig) -> Result<Self> {
        let encoder = Self::new(kind, config);
        let sample = encoder.encode("ping").await?;
        if sample.len() != encoder.dims {
            return Err(AskDeskError::Encoder(format!(
                "{} returned {} dimensions, expected {}",
                encoder.model,
                sample.len(),
                encoder.dims
            )));
        }
        Ok(encoder)
    }

    fn url(&self) -> String {
        match self.kind {
            RemoteKind::OpenAi => format!("{}/embeddings", self.endpoint),
            RemoteKind::Ollama => format!("{}/api/embed", self.endpoint),
        }
    }
}

#[async_trait]
impl Encoder for RemoteEncoder {
    fn name(&self) -> &str {
        match self.kind {
            RemoteKind::OpenAi => "openai",
            RemoteKind::Ollama => "ollama",
        }
    }

    fn dimensions(&self) -> usize {
        self.dims
    }

    async fn encode(&self, text: &str) -> Result<Vec<f32>> {
        self.encode_batch(&[text.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AskDeskError::Encoder(format!("empty response from {}", self.name())))
    }

    async fn encode_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut req = self.client.post(self.url()).json(&EmbeddingRequest {
            model: &self.model,
            input: texts,
        });
        if !self.api_key.is_empty() {
            req = req.header("Authorization", format!("Bearer {}", self.api_key));
        }

        let resp = req
            .send()
            .await
            .map_err(|e| AskDeskError::Encoder(format!("{} connection failed: {e}", self.name())))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(AskDeskError::Encoder(format!(
                "{} API error {status}: {body}",
                self.name()
            )));
        }

        let vectors = match self.kind {
            RemoteKind::OpenAi => resp
                .json::<OpenAiResponse>()
                .await
                .map(|r| r.data.into_iter().map(|d| d.embedding).collect::<Vec<_>>()),
            RemoteKind::Ollama => resp.json::<OllamaResponse>().await.map(|r| r.embeddings),
        }
        .map_err(|e| AskDeskError::Encoder(format!("malformed embedding response: {e}")))?;

        if vectors.len() != texts.len() {
            return Err(AskDeskError::Encoder(format!(
                "asked for {} embeddings, got {}",
                texts.len(),
                vectors.len()
            )));
        }
        Ok(vectors)
    }
}
