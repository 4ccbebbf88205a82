//! Configuration loading, validation, and management for Innkeep.
//!
//! Loads configuration from an `innkeep.toml` file with environment
//! variable overrides for secrets. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// The root configuration structure.
///
/// Maps directly to `innkeep.toml`.
#[derive(Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// Language model provider settings
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Embedding service settings
    #[serde(default)]
    pub embeddings: EmbeddingsConfig,

    /// Retrieval engine settings
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Turn orchestration settings
    #[serde(default)]
    pub engine: EngineConfig,

    /// Live web search settings
    #[serde(default)]
    pub search: SearchConfig,

    /// Property identity shown in prompts and search queries
    #[serde(default)]
    pub property: PropertyConfig,

    /// Durable storage paths
    #[serde(default)]
    pub storage: StorageConfig,

    /// HTTP gateway settings
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Human-notification gateway settings
    #[serde(default)]
    pub notify: NotifyConfig,
}

/// Redact a secret for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("provider", &self.provider)
            .field("embeddings", &self.embeddings)
            .field("retrieval", &self.retrieval)
            .field("engine", &self.engine)
            .field("search", &self.search)
            .field("property", &self.property)
            .field("storage", &self.storage)
            .field("gateway", &self.gateway)
            .field("notify", &self.notify)
            .finish()
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// API key; usually supplied via `ANTHROPIC_API_KEY`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_model")]
    pub model: String,

    /// Override the API base URL (testing, proxies)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &redact(&self.api_key))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            base_url: None,
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct EmbeddingsConfig {
    /// API key; usually supplied via `OPENAI_API_KEY`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_embedding_model")]
    pub model: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl std::fmt::Debug for EmbeddingsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingsConfig")
            .field("api_key", &redact(&self.api_key))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl Default for EmbeddingsConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_embedding_model(),
            base_url: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Number of chunks to retrieve per query
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Minimum cosine similarity for a chunk to be returned
    #[serde(default = "default_threshold")]
    pub threshold: f32,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            threshold: default_threshold(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Maximum tool-invocation rounds per guest turn
    #[serde(default = "default_max_tool_rounds")]
    pub max_tool_rounds: u32,

    /// Total wall-clock budget per turn, covering all model/tool rounds
    #[serde(default = "default_turn_timeout_secs")]
    pub turn_timeout_secs: u64,

    /// How many history messages are replayed to the model
    #[serde(default = "default_history_window")]
    pub history_window: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_tool_rounds: default_max_tool_rounds(),
            turn_timeout_secs: default_turn_timeout_secs(),
            history_window: default_history_window(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// API key; usually supplied via `TAVILY_API_KEY`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_search_base_url")]
    pub base_url: String,

    /// Maximum results per lookup
    #[serde(default = "default_search_max_results")]
    pub max_results: usize,
}

impl std::fmt::Debug for SearchConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchConfig")
            .field("api_key", &redact(&self.api_key))
            .field("base_url", &self.base_url)
            .field("max_results", &self.max_results)
            .finish()
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_search_base_url(),
            max_results: default_search_max_results(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyConfig {
    /// Property name used in the assistant's role directive
    #[serde(default = "default_property_name")]
    pub name: String,

    /// Locality appended to live web-search queries
    #[serde(default = "default_locality")]
    pub locality: String,
}

impl Default for PropertyConfig {
    fn default() -> Self {
        Self {
            name: default_property_name(),
            locality: default_locality(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// SQLite file for sessions and transcripts
    #[serde(default = "default_sessions_path")]
    pub sessions_path: String,

    /// SQLite file for the knowledge corpus
    #[serde(default = "default_knowledge_path")]
    pub knowledge_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            sessions_path: default_sessions_path(),
            knowledge_path: default_knowledge_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Allowed CORS origin for the chat widget
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_origin: Option<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            allowed_origin: None,
        }
    }
}

#[derive(Clone, Serialize, Deserialize, Default)]
pub struct NotifyConfig {
    /// Twilio account SID; usually `TWILIO_ACCOUNT_SID`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_sid: Option<String>,

    /// Twilio auth token; usually `TWILIO_AUTH_TOKEN`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,

    /// Sending WhatsApp number, `whatsapp:+...` form
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_number: Option<String>,

    /// The host's WhatsApp number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_number: Option<String>,
}

impl std::fmt::Debug for NotifyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotifyConfig")
            .field("account_sid", &redact(&self.account_sid))
            .field("auth_token", &redact(&self.auth_token))
            .field("from_number", &self.from_number)
            .field("to_number", &self.to_number)
            .finish()
    }
}

// --- Defaults ---

fn default_model() -> String {
    "claude-sonnet-4-20250514".into()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_max_tokens() -> u32 {
    1024
}
fn default_embedding_model() -> String {
    "text-embedding-3-small".into()
}
fn default_top_k() -> usize {
    5
}
fn default_threshold() -> f32 {
    0.3
}
fn default_max_tool_rounds() -> u32 {
    3
}
fn default_turn_timeout_secs() -> u64 {
    60
}
fn default_history_window() -> usize {
    10
}
fn default_search_base_url() -> String {
    "https://api.tavily.com".into()
}
fn default_search_max_results() -> usize {
    3
}
fn default_property_name() -> String {
    "Lakeside Guesthouse".into()
}
fn default_locality() -> String {
    "Interlaken Switzerland".into()
}
fn default_sessions_path() -> String {
    "innkeep-sessions.db".into()
}
fn default_knowledge_path() -> String {
    "innkeep-knowledge.db".into()
}
fn default_host() -> String {
    "127.0.0.1".into()
}
fn default_port() -> u16 {
    8080
}

impl AppConfig {
    /// Load configuration from a file path, then apply environment variable
    /// overrides for secrets.
    ///
    /// A missing file is not an error — defaults are used so the service can
    /// run entirely from the environment.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?
        } else {
            tracing::info!("no config file at {}, using defaults", path.display());
            Self::default()
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Environment variables take priority for secrets; the TOML file is
    /// expected to hold only non-sensitive settings.
    fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var("ANTHROPIC_API_KEY") {
            self.provider.api_key = Some(key);
        }
        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            self.embeddings.api_key = Some(key);
        }
        if let Ok(key) = std::env::var("TAVILY_API_KEY") {
            self.search.api_key = Some(key);
        }
        if let Ok(sid) = std::env::var("TWILIO_ACCOUNT_SID") {
            self.notify.account_sid = Some(sid);
        }
        if let Ok(token) = std::env::var("TWILIO_AUTH_TOKEN") {
            self.notify.auth_token = Some(token);
        }
        if let Ok(from) = std::env::var("TWILIO_WHATSAPP_FROM") {
            self.notify.from_number = Some(from);
        }
        if let Ok(to) = std::env::var("HOST_WHATSAPP_TO") {
            self.notify.to_number = Some(to);
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.provider.temperature) {
            return Err(ConfigError::ValidationError(
                "provider.temperature must be between 0.0 and 2.0".into(),
            ));
        }
        if self.retrieval.top_k == 0 {
            return Err(ConfigError::ValidationError(
                "retrieval.top_k must be at least 1".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.retrieval.threshold) {
            return Err(ConfigError::ValidationError(
                "retrieval.threshold must be between 0.0 and 1.0".into(),
            ));
        }
        if self.engine.max_tool_rounds == 0 {
            return Err(ConfigError::ValidationError(
                "engine.max_tool_rounds must be at least 1".into(),
            ));
        }
        if self.engine.turn_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "engine.turn_timeout_secs must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Generate a default config TOML string (for first-run setup).
    pub fn default_toml() -> String {
        toml::to_string_pretty(&Self::default()).unwrap_or_default()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("failed to parse config at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("invalid configuration: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.retrieval.top_k, 5);
        assert!((config.retrieval.threshold - 0.3).abs() < f32::EPSILON);
        assert_eq!(config.engine.max_tool_rounds, 3);
        assert_eq!(config.engine.history_window, 10);
    }

    #[test]
    fn missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_from(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(config.gateway.port, 8080);
    }

    #[test]
    fn parses_partial_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("innkeep.toml");
        std::fs::write(
            &path,
            r#"
            [retrieval]
            top_k = 3
            threshold = 0.5

            [gateway]
            port = 9000
            "#,
        )
        .unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.retrieval.top_k, 3);
        assert_eq!(config.gateway.port, 9000);
        // untouched sections keep defaults
        assert_eq!(config.engine.max_tool_rounds, 3);
    }

    #[test]
    fn invalid_threshold_rejected() {
        let config = AppConfig {
            retrieval: RetrievalConfig {
                top_k: 5,
                threshold: 1.5,
            },
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn zero_rounds_rejected() {
        let config = AppConfig {
            engine: EngineConfig {
                max_tool_rounds: 0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn debug_redacts_secrets() {
        let config = AppConfig {
            provider: ProviderConfig {
                api_key: Some("sk-ant-secret".into()),
                ..Default::default()
            },
            ..Default::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-ant-secret"));
        assert!(debug.contains("[REDACTED]"));
    }
}
