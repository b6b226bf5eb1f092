//! Core traits and types for the Lia tutoring assistant
//!
//! This crate provides foundational types used across all other crates:
//! - Query, passage and answer types shared by the text and voice pipelines
//! - Collaborator traits for pluggable backends (index, summarizer, STT, TTS,
//!   object storage, audio fetch and transcode)
//! - Voice selection for speech synthesis
//! - Error types

pub mod error;
pub mod query;
pub mod traits;
pub mod voice_config;

pub use error::{Error, Result};
pub use query::{Answer, Query, RetrievedPassage, VoiceAnswer, UNKNOWN_SOURCE};
pub use voice_config::{AudioEncoding, VoiceConfig};

// Trait re-exports
pub use traits::{
    AudioSource, AudioTranscoder, ObjectStorage, SpeechToText, Summarizer, TextToSpeech,
    VectorIndex,
};
