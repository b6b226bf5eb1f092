//! LLM integration
//!
//! Features:
//! - OpenAI-compatible chat completions backend
//! - Prompt construction for the tutoring persona and quiz generation
//! - Hugging Face inference summarizer for search-string compression

pub mod backend;
pub mod prompt;
pub mod summarizer;

pub use backend::{FinishReason, GenerationResult, LlmBackend, OpenAIBackend, OpenAIConfig};
pub use prompt::{Message, PromptBuilder, Role};
pub use summarizer::{HuggingFaceConfig, HuggingFaceSummarizer};

use thiserror::Error;

/// LLM errors
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("API error: {0}")]
    Api(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout")]
    Timeout,

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Timeout
        } else {
            LlmError::Network(err.to_string())
        }
    }
}

impl From<LlmError> for lia_core::Error {
    fn from(err: LlmError) -> Self {
        lia_core::Error::Llm(err.to_string())
    }
}
