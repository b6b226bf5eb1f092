//! Voice configuration types for TTS

use serde::{Deserialize, Serialize};

/// Encoding requested from the synthesis service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AudioEncoding {
    #[default]
    Mp3,
    OggOpus,
    Linear16,
}

impl AudioEncoding {
    /// File extension for artifacts in this encoding
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::OggOpus => "ogg",
            Self::Linear16 => "wav",
        }
    }

    /// MIME type used when uploading
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Mp3 => "audio/mpeg",
            Self::OggOpus => "audio/ogg",
            Self::Linear16 => "audio/wav",
        }
    }
}

/// Voice configuration for TTS
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceConfig {
    /// BCP-47 language code
    pub language_code: String,
    /// Voice identifier
    pub voice_name: String,
    #[serde(default)]
    pub encoding: AudioEncoding,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            language_code: "pt-BR".to_string(),
            voice_name: "pt-BR-Neural2-C".to_string(),
            encoding: AudioEncoding::Mp3,
        }
    }
}

impl VoiceConfig {
    pub fn new(language_code: impl Into<String>, voice_name: impl Into<String>) -> Self {
        Self {
            language_code: language_code.into(),
            voice_name: voice_name.into(),
            ..Default::default()
        }
    }

    /// Set the output encoding
    pub fn with_encoding(mut self, encoding: AudioEncoding) -> Self {
        self.encoding = encoding;
        self
    }
}
