//! AskDesk configuration system.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{AskDeskError, Result};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AskDeskConfig {
    #[serde(default)]
    pub identity: IdentityConfig,
    #[serde(default)]
    pub knowledge: KnowledgeConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub cascade: CascadeConfig,
    #[serde(default)]
    pub snippet: SnippetConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub suggestions: SuggestionsConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

impl AskDeskConfig {
    /// `ASKDESK_CONFIG` if set, else the default path.
    pub fn resolve_path() -> PathBuf {
        std::env::var("ASKDESK_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| Self::default_path())
    }

    /// Load config from `ASKDESK_CONFIG` or the default path (~/.askdesk/config.toml).
    pub fn load() -> Result<Self> {
        let path = Self::resolve_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            tracing::debug!("📄 No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Load config from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AskDeskError::Config(format!("Failed to read config: {e}")))?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| AskDeskError::Config(format!("Failed to parse config: {e}")))?;
        Ok(config)
    }

    /// Save config to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| AskDeskError::Config(format!("Failed to serialize config: {e}")))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default config path.
    pub fn default_path() -> PathBuf {
        Self::home_dir().join("config.toml")
    }

    /// Get the AskDesk home directory.
    pub fn home_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".askdesk")
    }
}

/// Expand `~` and environment variables in a configured path.
pub fn expand_path(p: &str) -> PathBuf {
    PathBuf::from(shellexpand::full(p).map(|s| s.into_owned()).unwrap_or_else(|_| p.to_string()))
}

/// Assistant identity and the system instruction sent to the language model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
}

fn default_name() -> String { "AskDesk".into() }
fn default_system_prompt() -> String { "You are a helpful assistant for Hirebie.com".into() }

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            system_prompt: default_system_prompt(),
        }
    }
}

/// Knowledge base sources.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeConfig {
    /// Remote document store returning a JSON array of `{question, answer}`.
    #[serde(default)]
    pub remote_url: Option<String>,
    #[serde(default = "default_remote_timeout")]
    pub remote_timeout_secs: u64,
    /// Local JSON file used when the remote store is unset or fails.
    #[serde(default = "default_local_path")]
    pub local_path: String,
}

fn default_remote_timeout() -> u64 { 5 }
fn default_local_path() -> String { "~/.askdesk/faq_data.json".into() }

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            remote_url: None,
            remote_timeout_secs: default_remote_timeout(),
            local_path: default_local_path(),
        }
    }
}

/// Embedding encoder configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// "hashing" | "openai" | "ollama" | "onnx" | "none"
    #[serde(default = "default_embedding_provider")]
    pub provider: String,
    /// Remote model name, or for `onnx` a directory with `model.onnx` and `vocab.txt`.
    #[serde(default = "default_embedding_model")]
    pub model: String,
    #[serde(default)]
    pub endpoint: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_dimensions")]
    pub dimensions: usize,
}

fn default_embedding_provider() -> String { "hashing".into() }
fn default_embedding_model() -> String { "text-embedding-3-small".into() }
fn default_dimensions() -> usize { 384 }

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: default_embedding_provider(),
            model: default_embedding_model(),
            endpoint: String::new(),
            api_key: String::new(),
            dimensions: default_dimensions(),
        }
    }
}

/// Resolution cascade tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CascadeConfig {
    /// Squared-L2 distance a semantic match must stay strictly below.
    #[serde(default = "default_threshold")]
    pub semantic_threshold: f32,
    #[serde(default = "default_apology")]
    pub apology_message: String,
    /// Skip the caller-side miss log when the cascade already logged a failed generation.
    #[serde(default)]
    pub dedupe_missed_log: bool,
}

fn default_threshold() -> f32 { 0.8 }
fn default_apology() -> String { "Sorry, I couldn't fetch a proper answer right now.".into() }

impl Default for CascadeConfig {
    fn default() -> Self {
        Self {
            semantic_threshold: default_threshold(),
            apology_message: default_apology(),
            dedupe_missed_log: false,
        }
    }
}

/// External snippet source (the business website).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnippetConfig {
    #[serde(default = "bool_true")]
    pub enabled: bool,
    #[serde(default = "default_snippet_url")]
    pub url: String,
    /// Provenance label; derived from the URL host when empty.
    #[serde(default)]
    pub label: String,
    #[serde(default = "default_snippet_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_before_chars")]
    pub before_chars: usize,
    #[serde(default = "default_after_chars")]
    pub after_chars: usize,
    #[serde(default = "default_min_word_len")]
    pub min_word_len: usize,
}

fn bool_true() -> bool { true }
fn default_snippet_url() -> String { "https://www.hirebie.com/".into() }
fn default_snippet_timeout() -> u64 { 10 }
fn default_user_agent() -> String { "Mozilla/5.0".into() }
fn default_before_chars() -> usize { 100 }
fn default_after_chars() -> usize { 300 }
fn default_min_word_len() -> usize { 4 }

impl Default for SnippetConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            url: default_snippet_url(),
            label: String::new(),
            timeout_secs: default_snippet_timeout(),
            user_agent: default_user_agent(),
            before_chars: default_before_chars(),
            after_chars: default_after_chars(),
            min_word_len: default_min_word_len(),
        }
    }
}

/// Generative fallback (remote language model).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_llm_provider")]
    pub provider: String,
    #[serde(default = "default_llm_model")]
    pub model: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub endpoint: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
}

fn default_llm_provider() -> String { "openai".into() }
fn default_llm_model() -> String { "gpt-3.5-turbo".into() }
fn default_max_tokens() -> u32 { 200 }
fn default_temperature() -> f32 { 0.7 }
fn default_llm_timeout() -> u64 { 30 }

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_llm_provider(),
            model: default_llm_model(),
            api_key: String::new(),
            endpoint: String::new(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            timeout_secs: default_llm_timeout(),
        }
    }
}

/// Suggestion settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestionsConfig {
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    /// Offered after a knowledge-base miss.
    #[serde(default = "default_fallback_suggestions")]
    pub fallback: Vec<String>,
}

fn default_top_k() -> usize { 3 }
fn default_fallback_suggestions() -> Vec<String> {
    vec![
        "Do you offer custom UI/UX design?",
        "Do you offer content creation services?",
        "Can you produce marketing videos?",
    ]
    .into_iter().map(String::from).collect()
}

impl Default for SuggestionsConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            fallback: default_fallback_suggestions(),
        }
    }
}

/// Gateway configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_host")]
    pub host: String,
}

fn default_port() -> u16 { 5000 }
fn default_host() -> String { "127.0.0.1".into() }

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
        }
    }
}

/// SQLite storage for missed queries and feedback.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_db_path")]
    pub db_path: String,
}

fn default_db_path() -> String { "~/.askdesk/askdesk.db".into() }

impl Default for StorageConfig {
    fn default() -> Self {
        Self { db_path: default_db_path() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AskDeskConfig::default();
        assert_eq!(config.llm.provider, "openai");
        assert_eq!(config.llm.model, "gpt-3.5-turbo");
        assert_eq!(config.llm.max_tokens, 200);
        assert!((config.llm.temperature - 0.7).abs() < 0.01);
        assert!((config.cascade.semantic_threshold - 0.8).abs() < f32::EPSILON);
        assert_eq!(config.snippet.timeout_secs, 10);
        assert_eq!(config.snippet.before_chars, 100);
        assert_eq!(config.snippet.after_chars, 300);
        assert_eq!(config.suggestions.fallback.len(), 3);
    }

    #[test]
    fn test_config_from_toml() {
        let toml_str = r#"
            [identity]
            system_prompt = "You are a helpful assistant for Acme Corp"

            [knowledge]
            remote_url = "http://localhost:9000/faqs"
            local_path = "./faq_data.json"

            [embedding]
            provider = "none"

            [llm]
            provider = "ollama"
            model = "llama3.2"
        "#;

        let config: AskDeskConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.identity.system_prompt, "You are a helpful assistant for Acme Corp");
        assert_eq!(config.knowledge.remote_url.as_deref(), Some("http://localhost:9000/faqs"));
        assert_eq!(config.embedding.provider, "none");
        assert_eq!(config.llm.provider, "ollama");
        assert_eq!(config.llm.max_tokens, 200);
    }

    #[test]
    fn test_config_missing_fields_use_defaults() {
        let config: AskDeskConfig = toml::from_str("").unwrap();
        assert_eq!(config.gateway.port, 5000);
        assert_eq!(config.embedding.provider, "hashing");
        assert!(!config.cascade.dedupe_missed_log);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut config = AskDeskConfig::default();
        config.gateway.port = 8088;
        config.save_to(&path).unwrap();

        let loaded = AskDeskConfig::load_from(&path).unwrap();
        assert_eq!(loaded.gateway.port, 8088);
    }

    #[test]
    fn test_home_dir() {
        let home = AskDeskConfig::home_dir();
        assert!(home.to_string_lossy().contains("askdesk"));
    }
}
