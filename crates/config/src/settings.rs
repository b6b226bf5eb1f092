//! Main settings module

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::constants::{endpoints, retrieval, speech, storage, summarizer, timeouts};
use crate::ConfigError;

/// Runtime environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    /// Relaxed validation
    #[default]
    Development,
    Staging,
    /// All validations enforced
    Production,
}

impl RuntimeEnvironment {
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub environment: RuntimeEnvironment,

    /// HTTP server
    #[serde(default)]
    pub server: ServerConfig,

    /// Retrieval gate and vector index
    #[serde(default)]
    pub rag: RagConfig,

    /// Query embeddings
    #[serde(default)]
    pub embeddings: EmbeddingsConfig,

    /// Answer generation
    #[serde(default)]
    pub llm: LlmConfig,

    /// Query summarization
    #[serde(default)]
    pub summarizer: SummarizerConfig,

    /// Speech recognition and synthesis
    #[serde(default)]
    pub speech: SpeechConfig,

    /// Published audio
    #[serde(default)]
    pub storage: StorageConfig,

    /// Fetch and transcode
    #[serde(default)]
    pub audio: AudioConfig,

    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_server()?;
        self.validate_rag()?;
        self.validate_llm()?;
        self.validate_audio()?;
        self.validate_storage()?;
        self.validate_google_auth()?;
        Ok(())
    }

    fn validate_server(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(invalid("server.port", "Port must be non-zero"));
        }
        Ok(())
    }

    fn validate_rag(&self) -> Result<(), ConfigError> {
        let rag = &self.rag;

        if !(0.0..=1.0).contains(&rag.relevance_threshold) {
            return Err(invalid(
                "rag.relevance_threshold",
                format!("Must be between 0.0 and 1.0, got {}", rag.relevance_threshold),
            ));
        }

        if rag.top_k == 0 {
            return Err(invalid("rag.top_k", "Must be at least 1"));
        }

        if rag.quiz_top_k == 0 {
            return Err(invalid("rag.quiz_top_k", "Must be at least 1"));
        }

        if rag.collection.trim().is_empty() {
            return Err(invalid("rag.collection", "Collection name cannot be empty"));
        }

        Ok(())
    }

    fn validate_llm(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(invalid(
                "llm.temperature",
                format!("Must be between 0.0 and 2.0, got {}", self.llm.temperature),
            ));
        }
        Ok(())
    }

    fn validate_audio(&self) -> Result<(), ConfigError> {
        if self.audio.fetch_timeout_seconds == 0 {
            return Err(invalid("audio.fetch_timeout_seconds", "Must be non-zero"));
        }
        if self.audio.transcode_timeout_seconds == 0 {
            return Err(invalid("audio.transcode_timeout_seconds", "Must be non-zero"));
        }
        Ok(())
    }

    fn validate_storage(&self) -> Result<(), ConfigError> {
        if self.environment.is_production() && self.storage.bucket.trim().is_empty() {
            return Err(invalid(
                "storage.bucket",
                "Bucket name is required in production (set GCP_BUCKET_NAME)",
            ));
        }
        Ok(())
    }

    fn validate_google_auth(&self) -> Result<(), ConfigError> {
        let modes = [
            ("speech.credentials_path", self.speech.auth_mode, &self.speech.credentials_path),
            ("storage.credentials_path", self.storage.auth_mode, &self.storage.credentials_path),
        ];

        for (field, mode, path) in modes {
            if mode == GoogleAuthMode::ServiceAccount && path.trim().is_empty() {
                return Err(invalid(
                    field,
                    "Required for service_account auth (set GOOGLE_APPLICATION_CREDENTIALS)",
                ));
            }
        }
        Ok(())
    }
}

fn invalid(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        message: message.into(),
    }
}

fn env_or_empty(key: &str) -> String {
    std::env::var(key).unwrap_or_default()
}

fn default_true() -> bool {
    true
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// CORS allowed origins
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_enabled: true,
            cors_origins: Vec::new(),
        }
    }
}

/// RAG configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagConfig {
    /// Qdrant endpoint (gRPC)
    #[serde(default = "default_qdrant_endpoint")]
    pub qdrant_endpoint: String,

    #[serde(default)]
    pub qdrant_api_key: Option<String>,

    #[serde(default = "default_collection")]
    pub collection: String,

    /// Passages requested per text query
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Passages below this score are discarded
    #[serde(default = "default_relevance_threshold")]
    pub relevance_threshold: f32,

    /// Passages requested per quiz question
    #[serde(default = "default_quiz_top_k")]
    pub quiz_top_k: usize,
}

fn default_qdrant_endpoint() -> String {
    std::env::var("QDRANT_URL").unwrap_or_else(|_| endpoints::QDRANT_DEFAULT.to_string())
}
fn default_collection() -> String {
    retrieval::COLLECTION.to_string()
}
fn default_top_k() -> usize {
    retrieval::TOP_K
}
fn default_relevance_threshold() -> f32 {
    retrieval::RELEVANCE_THRESHOLD
}
fn default_quiz_top_k() -> usize {
    retrieval::QUIZ_TOP_K
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            qdrant_endpoint: default_qdrant_endpoint(),
            qdrant_api_key: std::env::var("QDRANT_API_KEY").ok(),
            collection: default_collection(),
            top_k: default_top_k(),
            relevance_threshold: default_relevance_threshold(),
            quiz_top_k: default_quiz_top_k(),
        }
    }
}

/// Embeddings configuration (OpenAI-compatible `/embeddings`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingsConfig {
    #[serde(default = "default_openai_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_openai_key")]
    pub api_key: String,

    #[serde(default = "default_embedding_model")]
    pub model: String,

    #[serde(default = "default_http_timeout")]
    pub timeout_seconds: u64,
}

fn default_openai_endpoint() -> String {
    endpoints::OPENAI_DEFAULT.to_string()
}
fn default_openai_key() -> String {
    env_or_empty("OPENAI_API_KEY")
}
fn default_embedding_model() -> String {
    "text-embedding-ada-002".to_string()
}
fn default_http_timeout() -> u64 {
    timeouts::HTTP_DEFAULT_SECS
}

impl Default for EmbeddingsConfig {
    fn default() -> Self {
        Self {
            endpoint: default_openai_endpoint(),
            api_key: default_openai_key(),
            model: default_embedding_model(),
            timeout_seconds: default_http_timeout(),
        }
    }
}

/// Generative model configuration (OpenAI-compatible chat completions)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_openai_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_openai_key")]
    pub api_key: String,

    #[serde(default = "default_llm_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_llm_timeout")]
    pub timeout_seconds: u64,
}

fn default_llm_model() -> String {
    "gpt-3.5-turbo".to_string()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_max_tokens() -> u32 {
    512
}
fn default_llm_timeout() -> u64 {
    timeouts::LLM_REQUEST_SECS
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: default_openai_endpoint(),
            api_key: default_openai_key(),
            model: default_llm_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_seconds: default_llm_timeout(),
        }
    }
}

/// Query summarizer (Hugging Face inference API)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummarizerConfig {
    /// When disabled the raw question is used as the search string
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_hf_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_hf_key")]
    pub api_key: String,

    #[serde(default = "default_summarizer_model")]
    pub model: String,

    #[serde(default = "default_summary_max")]
    pub max_length: u32,

    #[serde(default = "default_summary_min")]
    pub min_length: u32,

    #[serde(default = "default_http_timeout")]
    pub timeout_seconds: u64,
}

fn default_hf_endpoint() -> String {
    endpoints::HF_INFERENCE_DEFAULT.to_string()
}
fn default_hf_key() -> String {
    env_or_empty("HF_API_KEY")
}
fn default_summarizer_model() -> String {
    summarizer::MODEL.to_string()
}
fn default_summary_max() -> u32 {
    summarizer::MAX_LENGTH
}
fn default_summary_min() -> u32 {
    summarizer::MIN_LENGTH
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: default_hf_endpoint(),
            api_key: default_hf_key(),
            model: default_summarizer_model(),
            max_length: default_summary_max(),
            min_length: default_summary_min(),
            timeout_seconds: default_http_timeout(),
        }
    }
}

/// How Google APIs are authenticated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GoogleAuthMode {
    /// `key=` query parameter
    #[default]
    ApiKey,
    /// Pre-issued OAuth access token
    StaticToken,
    /// Token from the GCE metadata server
    Metadata,
    /// Token exchanged for a JWT signed with a service account key file
    ServiceAccount,
}

/// Speech recognition and synthesis (Google Cloud REST)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    #[serde(default = "default_stt_endpoint")]
    pub stt_endpoint: String,

    #[serde(default = "default_tts_endpoint")]
    pub tts_endpoint: String,

    /// Recognition locale
    #[serde(default = "default_locale")]
    pub locale: String,

    #[serde(default = "default_language_code")]
    pub language_code: String,

    #[serde(default = "default_voice_name")]
    pub voice_name: String,

    #[serde(default)]
    pub auth_mode: GoogleAuthMode,

    #[serde(default = "default_google_key")]
    pub api_key: String,

    #[serde(default = "default_google_token")]
    pub access_token: String,

    /// Service account key file, for `service_account` auth
    #[serde(default = "default_credentials_path")]
    pub credentials_path: String,

    #[serde(default = "default_http_timeout")]
    pub timeout_seconds: u64,
}

fn default_stt_endpoint() -> String {
    endpoints::GOOGLE_SPEECH_DEFAULT.to_string()
}
fn default_tts_endpoint() -> String {
    endpoints::GOOGLE_TTS_DEFAULT.to_string()
}
fn default_locale() -> String {
    speech::LOCALE.to_string()
}
fn default_language_code() -> String {
    speech::LANGUAGE_CODE.to_string()
}
fn default_voice_name() -> String {
    speech::VOICE_NAME.to_string()
}
fn default_google_key() -> String {
    env_or_empty("GOOGLE_API_KEY")
}
fn default_google_token() -> String {
    env_or_empty("GOOGLE_ACCESS_TOKEN")
}
fn default_credentials_path() -> String {
    env_or_empty("GOOGLE_APPLICATION_CREDENTIALS")
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            stt_endpoint: default_stt_endpoint(),
            tts_endpoint: default_tts_endpoint(),
            locale: default_locale(),
            language_code: default_language_code(),
            voice_name: default_voice_name(),
            auth_mode: GoogleAuthMode::default(),
            api_key: default_google_key(),
            access_token: default_google_token(),
            credentials_path: default_credentials_path(),
            timeout_seconds: default_http_timeout(),
        }
    }
}

/// Object key layout for published audio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKeyMode {
    /// `<prefix>/<YYYYMMDDHHMMSS>.mp3`
    #[default]
    Timestamp,
    /// `<prefix>/<YYYYMMDDHHMMSS>-<8 hex>.mp3`
    TimestampUnique,
}

/// Object storage (Google Cloud Storage)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_bucket")]
    pub bucket: String,

    #[serde(default = "default_upload_endpoint")]
    pub upload_endpoint: String,

    #[serde(default = "default_public_url_base")]
    pub public_url_base: String,

    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,

    #[serde(default)]
    pub key_mode: ObjectKeyMode,

    /// Uploads need OAuth; API keys are not accepted
    #[serde(default = "default_storage_auth")]
    pub auth_mode: GoogleAuthMode,

    #[serde(default = "default_google_token")]
    pub access_token: String,

    #[serde(default = "default_credentials_path")]
    pub credentials_path: String,

    #[serde(default = "default_http_timeout")]
    pub timeout_seconds: u64,
}

fn default_bucket() -> String {
    env_or_empty("GCP_BUCKET_NAME")
}
fn default_upload_endpoint() -> String {
    endpoints::GCS_UPLOAD_DEFAULT.to_string()
}
fn default_public_url_base() -> String {
    storage::PUBLIC_URL_BASE.to_string()
}
fn default_key_prefix() -> String {
    storage::KEY_PREFIX.to_string()
}
fn default_storage_auth() -> GoogleAuthMode {
    if default_credentials_path().is_empty() {
        GoogleAuthMode::Metadata
    } else {
        GoogleAuthMode::ServiceAccount
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            bucket: default_bucket(),
            upload_endpoint: default_upload_endpoint(),
            public_url_base: default_public_url_base(),
            key_prefix: default_key_prefix(),
            key_mode: ObjectKeyMode::default(),
            auth_mode: default_storage_auth(),
            access_token: default_google_token(),
            credentials_path: default_credentials_path(),
            timeout_seconds: default_http_timeout(),
        }
    }
}

/// Audio fetch and transcode
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_seconds: u64,

    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: String,

    #[serde(default = "default_transcode_timeout")]
    pub transcode_timeout_seconds: u64,

    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    /// Directory for per-request temp files (system temp dir when unset)
    #[serde(default)]
    pub scratch_dir: Option<String>,
}

fn default_fetch_timeout() -> u64 {
    timeouts::AUDIO_FETCH_SECS
}
fn default_ffmpeg_path() -> String {
    "ffmpeg".to_string()
}
fn default_transcode_timeout() -> u64 {
    timeouts::TRANSCODE_SECS
}
fn default_sample_rate() -> u32 {
    speech::SAMPLE_RATE_HZ
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_seconds: default_fetch_timeout(),
            ffmpeg_path: default_ffmpeg_path(),
            transcode_timeout_seconds: default_transcode_timeout(),
            sample_rate: default_sample_rate(),
            scratch_dir: None,
        }
    }
}

/// Observability configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub log_json: bool,

    /// Expose `/metrics`
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_json: false,
            metrics_enabled: true,
        }
    }
}

/// Load settings from `config/` in the working directory
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    load_settings_from(Path::new("config"), env)
}

/// Load settings from a config directory
///
/// Sources in increasing priority: `<dir>/default.*`, `<dir>/<env>.*`,
/// then `LIA__SECTION__FIELD` environment variables.
pub fn load_settings_from(dir: &Path, env: Option<&str>) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder();

    builder = builder.add_source(File::from(dir.join("default")).required(false));

    if let Some(env_name) = env {
        builder = builder.add_source(File::from(dir.join(env_name)).required(false));
    }

    builder = builder.add_source(
        Environment::with_prefix("LIA")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;
    let settings: Settings = config.try_deserialize()?;

    settings.validate()?;

    Ok(settings)
}
