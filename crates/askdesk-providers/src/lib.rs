//! # AskDesk Providers
//!
//! Outbound collaborators of the resolution cascade.
//!
//! All generative backends (OpenAI, DeepSeek, Gemini, Groq, OpenRouter,
//! Ollama, llama.cpp) are handled by a single `OpenAiCompatibleProvider`.
//! `WebPageSource` supplies live website text for snippet extraction.

pub mod openai_compatible;
pub mod provider_registry;
pub mod web_snippet;

#[cfg(test)]
mod testing;

use askdesk_core::config::{LlmConfig, SnippetConfig};
use askdesk_core::error::{AskDeskError, Result};
use askdesk_core::traits::{Provider, SnippetSource};
use std::sync::Arc;

pub use web_snippet::{SnippetWindow, extract_snippet, format_snippet};

/// Create the generative provider named in `[llm]`.
pub fn create_provider(config: &LlmConfig) -> Result<Arc<dyn Provider>> {
    let provider_name = config.provider.as_str();
    match provider_name {
        // Custom endpoint: "custom:https://my-server.com/v1"
        other if other.starts_with("custom:") => Ok(Arc::new(
            openai_compatible::OpenAiCompatibleProvider::custom(other, config)?,
        )),

        _ => {
            let registry = provider_registry::get_provider_config(provider_name)
                .ok_or_else(|| {
                    AskDeskError::ProviderNotFound(format!(
                        "{provider_name} (available: {})",
                        available_providers().join(", ")
                    ))
                })?;
            Ok(Arc::new(
                openai_compatible::OpenAiCompatibleProvider::from_registry(registry, config)?,
            ))
        }
    }
}

/// Create the website snippet source, or `None` when disabled in `[snippet]`.
pub fn create_snippet_source(config: &SnippetConfig) -> Result<Option<Arc<dyn SnippetSource>>> {
    if !config.enabled {
        return Ok(None);
    }
    Ok(Some(Arc::new(web_snippet::WebPageSource::new(config)?)))
}

/// List all available provider names.
pub fn available_providers() -> Vec<&'static str> {
    let mut names = provider_registry::all_provider_names();
    names.push("custom");
    names
}
