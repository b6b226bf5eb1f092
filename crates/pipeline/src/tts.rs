//! Google Cloud Text-to-Speech backend

use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use lia_core::{AudioEncoding, Result, TextToSpeech, VoiceConfig};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::google::GoogleAuth;
use crate::PipelineError;

/// Google TTS configuration
#[derive(Debug, Clone)]
pub struct GoogleTtsConfig {
    /// API base, e.g. https://texttospeech.googleapis.com/v1
    pub endpoint: String,
    pub timeout: Duration,
}

impl Default for GoogleTtsConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://texttospeech.googleapis.com/v1".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeRequest<'a> {
    input: SynthesisInput<'a>,
    voice: VoiceSelection<'a>,
    audio_config: OutputConfig,
}

#[derive(Debug, Serialize)]
struct SynthesisInput<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceSelection<'a> {
    language_code: &'a str,
    name: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OutputConfig {
    audio_encoding: AudioEncoding,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeResponse {
    audio_content: String,
}

/// Google Cloud Text-to-Speech client
pub struct GoogleTextToSpeech {
    config: GoogleTtsConfig,
    auth: GoogleAuth,
    client: Client,
}

impl GoogleTextToSpeech {
    pub fn new(config: GoogleTtsConfig, auth: GoogleAuth) -> std::result::Result<Self, PipelineError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PipelineError::Tts(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            config,
            auth,
            client,
        })
    }

    async fn request_audio(
        &self,
        text: &str,
        voice: &VoiceConfig,
    ) -> std::result::Result<Vec<u8>, PipelineError> {
        let request = SynthesizeRequest {
            input: SynthesisInput { text },
            voice: VoiceSelection {
                language_code: &voice.language_code,
                name: &voice.voice_name,
            },
            audio_config: OutputConfig {
                audio_encoding: voice.encoding,
            },
        };

        let url = format!("{}/text:synthesize", self.config.endpoint.trim_end_matches('/'));
        let builder = self.client.post(url).json(&request);
        let response = self
            .auth
            .authorize(builder)
            .await?
            .send()
            .await
            .map_err(|e| PipelineError::Tts(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PipelineError::Tts(format!("HTTP {}: {}", status, body)));
        }

        let parsed: SynthesizeResponse = response
            .json()
            .await
            .map_err(|e| PipelineError::Tts(format!("Invalid response: {}", e)))?;

        STANDARD
            .decode(parsed.audio_content)
            .map_err(|e| PipelineError::Tts(format!("Invalid audio content: {}", e)))
    }
}

#[async_trait]
impl TextToSpeech for GoogleTextToSpeech {
    async fn synthesize(&self, text: &str, voice: &VoiceConfig) -> Result<Vec<u8>> {
        let audio = self
            .request_audio(text, voice)
            .await
            .map_err(|e| lia_core::Error::Tts(e.to_string()))?;

        tracing::debug!(voice = %voice.voice_name, bytes = audio.len(), "Synthesized speech");
        Ok(audio)
    }

    fn model_name(&self) -> &str {
        "google-tts-v1"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_synthesize_decodes_audio() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/text:synthesize"))
            .and(body_json(serde_json::json!({
                "input": {"text": "Olá, turma"},
                "voice": {"languageCode": "pt-BR", "name": "pt-BR-Neural2-C"},
                "audioConfig": {"audioEncoding": "MP3"}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "audioContent": STANDARD.encode(b"ID3fake-mp3")
            })))
            .mount(&server)
            .await;

        let tts = GoogleTextToSpeech::new(
            GoogleTtsConfig {
                endpoint: server.uri(),
                ..Default::default()
            },
            GoogleAuth::static_token("ya29.test"),
        )
        .unwrap();

        let audio = tts
            .synthesize("Olá, turma", &VoiceConfig::default())
            .await
            .unwrap();
        assert_eq!(audio, b"ID3fake-mp3");
    }

    #[tokio::test]
    async fn test_synthesize_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_string("invalid voice"))
            .mount(&server)
            .await;

        let tts = GoogleTextToSpeech::new(
            GoogleTtsConfig {
                endpoint: server.uri(),
                ..Default::default()
            },
            GoogleAuth::api_key("k"),
        )
        .unwrap();

        let err = tts
            .synthesize("x", &VoiceConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, lia_core::Error::Tts(_)));
    }
}
