//! Configuration management for the Lia tutoring assistant
//!
//! Supports loading configuration from:
//! - TOML/YAML/JSON files under `config/` (`default`, then `<env>`)
//! - Environment variables (`LIA__` prefix, `__` separator)
//!
//! Secrets fall back to their conventional environment variables
//! (`OPENAI_API_KEY`, `HF_API_KEY`, `GOOGLE_API_KEY`, `GCP_BUCKET_NAME`).

pub mod constants;
pub mod settings;

pub use settings::{
    load_settings, load_settings_from, AudioConfig, EmbeddingsConfig, GoogleAuthMode, LlmConfig,
    ObjectKeyMode, ObservabilityConfig, RagConfig, RuntimeEnvironment, ServerConfig, Settings,
    SpeechConfig, StorageConfig, SummarizerConfig,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        match err {
            config::ConfigError::NotFound(key) => ConfigError::MissingField(key),
            other => ConfigError::ParseError(other.to_string()),
        }
    }
}
