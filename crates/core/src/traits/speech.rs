//! Speech processing traits

use crate::{Result, VoiceConfig};
use async_trait::async_trait;
use std::path::Path;

/// Speech-to-Text interface
///
/// Implementations recognize a complete 16-bit linear PCM WAV file.
#[async_trait]
pub trait SpeechToText: Send + Sync + 'static {
    /// Transcribe a WAV file
    ///
    /// # Arguments
    /// * `wav_path` - Mono 16-bit PCM WAV file
    /// * `locale` - BCP-47 recognition locale, e.g. `pt-BR`
    async fn transcribe(&self, wav_path: &Path, locale: &str) -> Result<String>;

    /// Get model/service name
    fn model_name(&self) -> &str;
}

/// Text-to-Speech interface
#[async_trait]
pub trait TextToSpeech: Send + Sync + 'static {
    /// Synthesize text into encoded audio bytes
    ///
    /// # Arguments
    /// * `text` - Text to speak, already stripped of unspeakable symbols
    /// * `voice` - Voice and output encoding
    async fn synthesize(&self, text: &str, voice: &VoiceConfig) -> Result<Vec<u8>>;

    /// Get model/service name
    fn model_name(&self) -> &str;
}
