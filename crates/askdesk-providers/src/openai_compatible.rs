//! Unified OpenAI-compatible provider.
//!
//! One struct handles chat completions for every registered backend.
//! Providers are distinguished only by endpoint URL, auth style, and API key.

use askdesk_core::config::LlmConfig;
use askdesk_core::error::{AskDeskError, Result};
use askdesk_core::traits::provider::{GenerateParams, Provider};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::time::Duration;

use crate::provider_registry::{AuthStyle, ProviderConfig};

/// A unified provider that works with any OpenAI-compatible API.
pub struct OpenAiCompatibleProvider {
    /// Provider name (e.g., "openai", "groq", "ollama").
    name: String,
    api_key: String,
    /// Base URL for the API (e.g., "https://api.openai.com/v1").
    base_url: String,
    chat_path: String,
    auth_style: AuthStyle,
    /// Upper bound on a single generation call.
    timeout: Duration,
    client: reqwest::Client,
}

impl OpenAiCompatibleProvider {
    /// Create from a known provider config + `[llm]` section.
    ///
    /// Resolution order:
    /// - API key: `llm.api_key` > env vars > empty
    /// - Base URL: `llm.endpoint` > env override > registry default
    pub fn from_registry(registry: &ProviderConfig, config: &LlmConfig) -> Result<Self> {
        let api_key = if !config.api_key.is_empty() {
            config.api_key.clone()
        } else {
            registry
                .env_keys
                .iter()
                .find_map(|key| std::env::var(key).ok().filter(|v| !v.is_empty()))
                .unwrap_or_default()
        };

        let base_url = if !config.endpoint.is_empty() {
            config.endpoint.trim_end_matches('/').to_string()
        } else {
            registry
                .base_url_env
                .and_then(|env_key| {
                    let val = std::env::var(env_key).ok()?;
                    // OLLAMA_HOST / LLAMACPP_HOST are bare hosts
                    if val.ends_with("/v1") {
                        Some(val)
                    } else {
                        Some(format!("{}/v1", val.trim_end_matches('/')))
                    }
                })
                .unwrap_or_else(|| registry.base_url.to_string())
        };

        Self::build(
            registry.name,
            api_key,
            base_url,
            registry.chat_path,
            registry.auth_style,
            config.timeout_secs,
        )
    }

    /// Create for a custom endpoint (e.g., "custom:https://my-server.com/v1").
    pub fn custom(endpoint: &str, config: &LlmConfig) -> Result<Self> {
        let base_url = endpoint
            .strip_prefix("custom:")
            .unwrap_or(endpoint)
            .trim_end_matches('/')
            .to_string();

        let api_key = if !config.api_key.is_empty() {
            config.api_key.clone()
        } else {
            std::env::var("CUSTOM_API_KEY").unwrap_or_default()
        };

        let auth_style = if api_key.is_empty() {
            AuthStyle::None
        } else {
            AuthStyle::Bearer
        };

        Self::build(
            "custom",
            api_key,
            base_url,
            "/chat/completions",
            auth_style,
            config.timeout_secs,
        )
    }

    fn build(
        name: &str,
        api_key: String,
        base_url: String,
        chat_path: &str,
        auth_style: AuthStyle,
        timeout_secs: u64,
    ) -> Result<Self> {
        let timeout = Duration::from_secs(timeout_secs.max(1));
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AskDeskError::Http(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            name: name.to_string(),
            api_key,
            base_url,
            chat_path: chat_path.to_string(),
            auth_style,
            timeout,
            client,
        })
    }

    /// Build the auth header for the request.
    fn apply_auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.auth_style {
            AuthStyle::Bearer if !self.api_key.is_empty() => {
                req.header("Authorization", format!("Bearer {}", self.api_key))
            }
            _ => req,
        }
    }

    async fn complete(&self, body: &Value) -> Result<String> {
        let url = format!("{}{}", self.base_url, self.chat_path);
        let req = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(body);
        let req = self.apply_auth(req);

        let resp = req.send().await.map_err(|e| {
            AskDeskError::Generative(format!("{} connection failed ({url}): {e}", self.name))
        })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(AskDeskError::Generative(format!(
                "{} API error {status}: {text}",
                self.name
            )));
        }

        let json: Value = resp
            .json()
            .await
            .map_err(|e| AskDeskError::Generative(format!("malformed response: {e}")))?;
        extract_reply(&json)
    }
}

/// Pull the first choice's message text out of a chat completion.
pub fn extract_reply(json: &Value) -> Result<String> {
    let content = json["choices"]
        .get(0)
        .and_then(|choice| choice["message"]["content"].as_str())
        .ok_or_else(|| AskDeskError::Generative("No choices in response".into()))?;
    Ok(content.trim().to_string())
}

#[async_trait]
impl Provider for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(
        &self,
        system_prompt: &str,
        user_query: &str,
        params: &GenerateParams,
    ) -> Result<String> {
        if self.auth_style != AuthStyle::None && self.api_key.is_empty() {
            return Err(AskDeskError::ApiKeyMissing(self.name.clone()));
        }

        let body = json!({
            "model": params.model,
            "temperature": params.temperature,
            "max_tokens": params.max_tokens,
            "messages": [
                { "role": "system", "content": system_prompt },
                { "role": "user", "content": user_query },
            ],
        });

        tracing::debug!("🤖 {} generate (model={})", self.name, params.model);
        tokio::time::timeout(self.timeout, self.complete(&body))
            .await
            .map_err(|_| {
                AskDeskError::Generative(format!(
                    "{} timed out after {}s",
                    self.name,
                    self.timeout.as_secs()
                ))
            })?
    }
}
