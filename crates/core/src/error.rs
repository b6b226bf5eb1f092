//! Error types shared across the workspace
//!
//! Every crate keeps its own error enum and converts into [`Error`] at the
//! crate boundary. The HTTP layer only needs [`Error::is_validation`] to pick
//! between a client error and a server error.

use thiserror::Error;

/// Result alias using the core [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Workspace-wide error
#[derive(Error, Debug)]
pub enum Error {
    /// The remote audio answered with a non-success status
    #[error("Error downloading audio: {0}")]
    AudioFetch(u16),

    /// Caller-supplied input cannot be processed
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Retrieval error: {0}")]
    Retrieval(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Summarization error: {0}")]
    Summarization(String),

    #[error("Transcode error: {0}")]
    Transcode(String),

    #[error("STT error: {0}")]
    Stt(String),

    #[error("TTS error: {0}")]
    Tts(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether the caller is responsible for this failure (HTTP 400)
    ///
    /// Everything else is a server-side failure (HTTP 500).
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::AudioFetch(_) | Self::Validation(_))
    }

    /// HTTP status carried by a failed audio fetch, if any
    pub fn fetch_status(&self) -> Option<u16> {
        match self {
            Self::AudioFetch(status) => Some(*status),
            _ => None,
        }
    }
}
