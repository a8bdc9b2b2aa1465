//! Configuration loading, validation, and management for Pipewright.
//!
//! Loads configuration from `~/.pipewright/config.toml` with environment
//! variable overrides. Validates all settings at startup; the resulting
//! [`AppConfig`] is passed explicitly to every component that needs it.

use pipewright_core::document::DuplicatePolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.pipewright/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// OpenAI API key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Base URL of the OpenAI-compatible endpoint
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Default generation model
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Default temperature
    #[serde(default = "default_temperature")]
    pub default_temperature: f32,

    /// Default max tokens per reply
    #[serde(default = "default_max_tokens")]
    pub default_max_tokens: u32,

    /// Self-reflecting extraction settings
    #[serde(default)]
    pub extraction: ExtractionConfig,

    /// Interactive chat settings
    #[serde(default)]
    pub chat: ChatConfig,

    /// Embedding backend settings
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    /// Retrieval settings
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Indexing settings
    #[serde(default)]
    pub indexing: IndexingConfig,

    /// Web fetch settings
    #[serde(default)]
    pub fetch: FetchConfig,
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".into()
}
fn default_model() -> String {
    "gpt-4o-mini".into()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_max_tokens() -> u32 {
    1024
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
            .field("api_key", &redact(&self.api_key))
            .field("base_url", &self.base_url)
            .field("default_model", &self.default_model)
            .field("default_temperature", &self.default_temperature)
            .field("default_max_tokens", &self.default_max_tokens)
            .field("extraction", &self.extraction)
            .field("chat", &self.chat)
            .field("embedding", &self.embedding)
            .field("retrieval", &self.retrieval)
            .field("indexing", &self.indexing)
            .field("fetch", &self.fetch)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Upper bound on generate → validate rounds
    #[serde(default = "default_max_loops")]
    pub max_loops: u32,

    /// Token that marks a reply as final
    #[serde(default = "default_terminator")]
    pub terminator: String,

    /// Only accept the terminator when it sits on a line of its own
    #[serde(default)]
    pub standalone_terminator: bool,
}

fn default_max_loops() -> u32 {
    10
}
fn default_terminator() -> String {
    "DONE".into()
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            max_loops: default_max_loops(),
            terminator: default_terminator(),
            standalone_terminator: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    #[serde(default = "default_chat_model")]
    pub model: String,

    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    /// Extra generation rounds allowed after function results per turn
    #[serde(default = "default_max_function_rounds")]
    pub max_function_rounds: u32,
}

fn default_chat_model() -> String {
    "gpt-3.5-turbo".into()
}
fn default_system_prompt() -> String {
    "If needed, break down the user's question into simpler questions and follow-up questions \
     that you can use with your tools.\nDon't make assumptions about what values to plug into \
     functions. Ask for clarification if a user request is ambiguous."
        .into()
}
fn default_max_function_rounds() -> u32 {
    3
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            model: default_chat_model(),
            system_prompt: default_system_prompt(),
            max_function_rounds: default_max_function_rounds(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// "openai", "cohere" or "hashing"
    #[serde(default = "default_embedding_provider")]
    pub provider: String,

    /// Embedding model; `None` keeps the backend's own default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cohere_api_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cohere_api_key: Option<String>,

    /// Vector size of the offline hashing embedder
    #[serde(default = "default_dimensions")]
    pub dimensions: usize,
}

fn default_embedding_provider() -> String {
    "openai".into()
}
fn default_dimensions() -> usize {
    384
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: default_embedding_provider(),
            model: None,
            cohere_api_url: None,
            cohere_api_key: None,
            dimensions: default_dimensions(),
        }
    }
}

impl std::fmt::Debug for EmbeddingConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("cohere_api_url", &self.cohere_api_url)
            .field("cohere_api_key", &redact(&self.cohere_api_key))
            .field("dimensions", &self.dimensions)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Documents returned by plain search
    #[serde(default = "default_search_top_k")]
    pub search_top_k: usize,

    /// Documents placed into a RAG prompt
    #[serde(default = "default_rag_top_k")]
    pub rag_top_k: usize,
}

fn default_search_top_k() -> usize {
    10
}
fn default_rag_top_k() -> usize {
    1
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            search_top_k: default_search_top_k(),
            rag_top_k: default_rag_top_k(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexingConfig {
    /// Words per chunk
    #[serde(default = "default_split_length")]
    pub split_length: usize,

    /// Words shared between consecutive chunks
    #[serde(default)]
    pub split_overlap: usize,

    #[serde(default)]
    pub duplicate_policy: DuplicatePolicy,
}

fn default_split_length() -> usize {
    200
}

impl Default for IndexingConfig {
    fn default() -> Self {
        Self {
            split_length: default_split_length(),
            split_overlap: 0,
            duplicate_policy: DuplicatePolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_hacker_news_url")]
    pub hacker_news_url: String,
}

fn default_timeout_secs() -> u64 {
    10
}
fn default_user_agent() -> String {
    concat!("pipewright/", env!("CARGO_PKG_VERSION")).into()
}
fn default_hacker_news_url() -> String {
    "https://hacker-news.firebaseio.com/v0".into()
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
            hacker_news_url: default_hacker_news_url(),
        }
    }
}

/// Environment variable holding the OpenAI credential.
pub const API_KEY_VAR: &str = "OPENAI_API_KEY";

impl AppConfig {
    /// Load configuration from the default path (~/.pipewright/config.toml).
    ///
    /// Environment overrides:
    /// - `PIPEWRIGHT_API_KEY`, then `OPENAI_API_KEY` (when no key is configured)
    /// - `PIPEWRIGHT_MODEL`
    /// - `CO_API_URL`, `CO_API_KEY` / `COHERE_API_KEY`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides through `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if self.api_key.is_none() {
            self.api_key = non_empty("PIPEWRIGHT_API_KEY").or_else(|| non_empty(API_KEY_VAR));
        }

        if let Some(model) = non_empty("PIPEWRIGHT_MODEL") {
            self.default_model = model;
        }

        if let Some(url) = non_empty("CO_API_URL") {
            self.embedding.cohere_api_url = Some(url);
        }

        if self.embedding.cohere_api_key.is_none() {
            self.embedding.cohere_api_key =
                non_empty("CO_API_KEY").or_else(|| non_empty("COHERE_API_KEY"));
        }
    }

    /// The API key, or a fatal configuration error naming the variable.
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        self.api_key
            .as_deref()
            .ok_or(ConfigError::MissingCredential(API_KEY_VAR))
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".pipewright")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_temperature < 0.0 || self.default_temperature > 2.0 {
            return Err(ConfigError::ValidationError(
                "default_temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.extraction.max_loops == 0 {
            return Err(ConfigError::ValidationError(
                "extraction.max_loops must be at least 1".into(),
            ));
        }

        if self.extraction.terminator.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "extraction.terminator must not be empty".into(),
            ));
        }

        if self.indexing.split_length == 0 {
            return Err(ConfigError::ValidationError(
                "indexing.split_length must be > 0".into(),
            ));
        }

        if self.indexing.split_overlap >= self.indexing.split_length {
            return Err(ConfigError::ValidationError(
                "indexing.split_overlap must be smaller than indexing.split_length".into(),
            ));
        }

        if self.retrieval.search_top_k == 0 || self.retrieval.rag_top_k == 0 {
            return Err(ConfigError::ValidationError(
                "retrieval top_k values must be > 0".into(),
            ));
        }

        if !matches!(self.embedding.provider.as_str(), "openai" | "cohere" | "hashing") {
            return Err(ConfigError::ValidationError(format!(
                "unknown embedding provider '{}' (expected openai, cohere or hashing)",
                self.embedding.provider
            )));
        }

        if self.embedding.dimensions == 0 {
            return Err(ConfigError::ValidationError(
                "embedding.dimensions must be > 0".into(),
            ));
        }

        Ok(())
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        toml::to_string_pretty(&Self::default()).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            default_model: default_model(),
            default_temperature: default_temperature(),
            default_max_tokens: default_max_tokens(),
            extraction: ExtractionConfig::default(),
            chat: ChatConfig::default(),
            embedding: EmbeddingConfig::default(),
            retrieval: RetrievalConfig::default(),
            indexing: IndexingConfig::default(),
            fetch: FetchConfig::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),

    #[error("The {0} environment variable is not set")]
    MissingCredential(&'static str),
}
