//! Remote audio download

use std::time::Duration;

use async_trait::async_trait;
use lia_core::{AudioSource, Error, Result};
use reqwest::Client;

/// Downloads audio over HTTP(S) with a bearer token
///
/// Every failure here is attributed to the caller: a bad URL, a rejected
/// token or an unreachable host all surface as validation errors.
pub struct HttpAudioSource {
    client: Client,
}

impl HttpAudioSource {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl AudioSource for HttpAudioSource {
    async fn fetch(&self, url: &str, token: &str) -> Result<Vec<u8>> {
        let mut request = self.client.get(url);
        if !token.is_empty() {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                Error::Validation("Error downloading audio: timed out".to_string())
            } else {
                Error::Validation(format!("Error downloading audio: {}", e))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(%url, status = status.as_u16(), "Audio download rejected");
            return Err(Error::AudioFetch(status.as_u16()));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::Validation(format!("Error downloading audio: {}", e)))?;

        tracing::debug!(%url, bytes = bytes.len(), "Audio downloaded");
        Ok(bytes.to_vec())
    }
}
