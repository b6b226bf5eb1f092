//! Audio stages of the voice pipeline
//!
//! Production implementations of the core collaborator traits:
//! - [`HttpAudioSource`]: bearer-authenticated download
//! - [`FfmpegTranscoder`]: any container to mono 16 kHz PCM WAV
//! - [`GoogleSpeechToText`] / [`GoogleTextToSpeech`]: Cloud Speech REST APIs
//! - [`GcsStorage`]: public uploads to Cloud Storage
//!
//! Plus the helpers the pipeline needs around them: scoped scratch files,
//! the speech sanitizer and object key generation.

pub mod fetch;
pub mod google;
pub mod sanitize;
pub mod scratch;
pub mod storage;
pub mod stt;
pub mod transcode;
pub mod tts;

pub use fetch::HttpAudioSource;
pub use google::{GoogleAuth, ServiceAccountKey};
pub use sanitize::strip_unspeakable;
pub use scratch::ScratchDir;
pub use storage::{object_key, GcsConfig, GcsStorage, ObjectKeyStrategy};
pub use stt::{GoogleSpeechToText, GoogleSttConfig};
pub use transcode::{FfmpegConfig, FfmpegTranscoder};
pub use tts::{GoogleTextToSpeech, GoogleTtsConfig};

use thiserror::Error;

/// Pipeline errors
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Transcode error: {0}")]
    Transcode(String),

    #[error("STT error: {0}")]
    Stt(String),

    #[error("TTS error: {0}")]
    Tts(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Audio error: {0}")]
    Audio(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<hound::Error> for PipelineError {
    fn from(err: hound::Error) -> Self {
        PipelineError::Audio(err.to_string())
    }
}

impl From<PipelineError> for lia_core::Error {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::Transcode(e) => lia_core::Error::Transcode(e),
            PipelineError::Stt(e) => lia_core::Error::Stt(e),
            PipelineError::Tts(e) => lia_core::Error::Tts(e),
            PipelineError::Storage(e) => lia_core::Error::Storage(e),
            PipelineError::Audio(e) => lia_core::Error::Transcode(e),
            PipelineError::Auth(e) => lia_core::Error::Config(e),
            PipelineError::Io(e) => lia_core::Error::Io(e),
        }
    }
}
