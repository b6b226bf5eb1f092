//! Google Cloud Speech-to-Text backend
//!
//! Synchronous `speech:recognize` over a complete WAV file. The WAV header is
//! read locally so the request declares the real sample rate and channel
//! count.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use lia_core::{Result, SpeechToText};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::google::GoogleAuth;
use crate::PipelineError;

/// Google STT configuration
#[derive(Debug, Clone)]
pub struct GoogleSttConfig {
    /// API base, e.g. https://speech.googleapis.com/v1
    pub endpoint: String,
    pub timeout: Duration,
}

impl Default for GoogleSttConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://speech.googleapis.com/v1".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RecognizeRequest<'a> {
    config: RecognitionConfig<'a>,
    audio: RecognitionAudio,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RecognitionConfig<'a> {
    encoding: &'static str,
    sample_rate_hertz: u32,
    audio_channel_count: u16,
    language_code: &'a str,
}

#[derive(Debug, Serialize)]
struct RecognitionAudio {
    content: String,
}

#[derive(Debug, Deserialize)]
struct RecognizeResponse {
    #[serde(default)]
    results: Vec<RecognitionResult>,
}

#[derive(Debug, Deserialize)]
struct RecognitionResult {
    #[serde(default)]
    alternatives: Vec<RecognitionAlternative>,
}

#[derive(Debug, Deserialize)]
struct RecognitionAlternative {
    #[serde(default)]
    transcript: String,
}

/// Google Cloud Speech-to-Text client
pub struct GoogleSpeechToText {
    config: GoogleSttConfig,
    auth: GoogleAuth,
    client: Client,
}

impl GoogleSpeechToText {
    pub fn new(config: GoogleSttConfig, auth: GoogleAuth) -> std::result::Result<Self, PipelineError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PipelineError::Stt(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            config,
            auth,
            client,
        })
    }

    fn recognize_url(&self) -> String {
        format!("{}/speech:recognize", self.config.endpoint.trim_end_matches('/'))
    }

    async fn recognize(&self, wav_path: &Path, locale: &str) -> std::result::Result<String, PipelineError> {
        let spec = hound::WavReader::open(wav_path)?.spec();
        if spec.bits_per_sample != 16 || spec.sample_format != hound::SampleFormat::Int {
            return Err(PipelineError::Audio(format!(
                "Expected 16-bit PCM, got {} bits {:?}",
                spec.bits_per_sample, spec.sample_format
            )));
        }

        let bytes = tokio::fs::read(wav_path).await?;

        let request = RecognizeRequest {
            config: RecognitionConfig {
                encoding: "LINEAR16",
                sample_rate_hertz: spec.sample_rate,
                audio_channel_count: spec.channels,
                language_code: locale,
            },
            audio: RecognitionAudio {
                content: STANDARD.encode(&bytes),
            },
        };

        let builder = self.client.post(self.recognize_url()).json(&request);
        let response = self
            .auth
            .authorize(builder)
            .await?
            .send()
            .await
            .map_err(|e| PipelineError::Stt(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PipelineError::Stt(format!("HTTP {}: {}", status, body)));
        }

        let parsed: RecognizeResponse = response
            .json()
            .await
            .map_err(|e| PipelineError::Stt(format!("Invalid response: {}", e)))?;

        let transcript = parsed
            .results
            .into_iter()
            .filter_map(|r| r.alternatives.into_iter().next())
            .map(|a| a.transcript.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        if transcript.is_empty() {
            return Err(PipelineError::Stt("No speech recognized".to_string()));
        }

        Ok(transcript)
    }
}

#[async_trait]
impl SpeechToText for GoogleSpeechToText {
    async fn transcribe(&self, wav_path: &Path, locale: &str) -> Result<String> {
        self.recognize(wav_path, locale)
            .await
            .map_err(|e| lia_core::Error::Stt(e.to_string()))
    }

    fn model_name(&self) -> &str {
        "google-speech-v1"
    }
}
