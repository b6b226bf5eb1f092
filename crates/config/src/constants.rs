//! Centralized defaults
//!
//! Single source of truth for values that the settings layer, the pipelines
//! and the tests all need to agree on.

/// Retrieval gate
pub mod retrieval {
    /// Minimum similarity score for a passage to count as relevant
    pub const RELEVANCE_THRESHOLD: f32 = 0.7;

    /// Passages requested per text query
    pub const TOP_K: usize = 3;

    /// Passages requested when grounding a quiz question
    pub const QUIZ_TOP_K: usize = 5;

    /// Default Qdrant collection
    pub const COLLECTION: &str = "lia_documents";
}

/// Speech defaults
pub mod speech {
    /// Recognition locale
    pub const LOCALE: &str = "pt-BR";

    /// Synthesis language
    pub const LANGUAGE_CODE: &str = "pt-BR";

    /// Synthesis voice
    pub const VOICE_NAME: &str = "pt-BR-Neural2-C";

    /// Sample rate fed to the recognizer
    pub const SAMPLE_RATE_HZ: u32 = 16_000;
}

/// Published audio
pub mod storage {
    /// Prefix for synthesized replies
    pub const KEY_PREFIX: &str = "agent_responses";

    /// Public URL base for Cloud Storage objects
    pub const PUBLIC_URL_BASE: &str = "https://storage.googleapis.com";
}

/// Query summarizer
pub mod summarizer {
    pub const MODEL: &str = "facebook/bart-large-cnn";
    pub const MAX_LENGTH: u32 = 100;
    pub const MIN_LENGTH: u32 = 2;
}

/// Service endpoints
pub mod endpoints {
    /// Qdrant REST endpoint
    pub const QDRANT_DEFAULT: &str = "http://127.0.0.1:6334";

    /// OpenAI API endpoint
    pub const OPENAI_DEFAULT: &str = "https://api.openai.com/v1";

    /// Hugging Face inference endpoint
    pub const HF_INFERENCE_DEFAULT: &str = "https://api-inference.huggingface.co/models";

    pub const GOOGLE_SPEECH_DEFAULT: &str = "https://speech.googleapis.com/v1";
    pub const GOOGLE_TTS_DEFAULT: &str = "https://texttospeech.googleapis.com/v1";
    pub const GCS_UPLOAD_DEFAULT: &str = "https://storage.googleapis.com/upload/storage/v1";

    /// GCE metadata server token endpoint
    pub const GCE_METADATA_TOKEN: &str =
        "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token";
}

/// Timeouts (seconds)
pub mod timeouts {
    /// Remote audio download
    pub const AUDIO_FETCH_SECS: u64 = 30;

    /// LLM request
    pub const LLM_REQUEST_SECS: u64 = 60;

    /// Any other outbound HTTP call
    pub const HTTP_DEFAULT_SECS: u64 = 30;

    /// ffmpeg run
    pub const TRANSCODE_SECS: u64 = 60;
}
