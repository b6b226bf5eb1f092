//! Google Cloud Storage publisher
//!
//! Uploads through the JSON API media endpoint with
//! `predefinedAcl=publicRead` and returns the public object URL.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lia_core::{ObjectStorage, Result};
use reqwest::Client;

use crate::google::GoogleAuth;
use crate::PipelineError;

/// How object keys are derived from the upload time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ObjectKeyStrategy {
    /// `<prefix>/<YYYYMMDDHHMMSS>.<ext>`; two uploads in the same second collide
    #[default]
    Timestamp,
    /// `<prefix>/<YYYYMMDDHHMMSS>-<8 hex>.<ext>`
    TimestampUnique,
}

impl From<lia_config::ObjectKeyMode> for ObjectKeyStrategy {
    fn from(mode: lia_config::ObjectKeyMode) -> Self {
        match mode {
            lia_config::ObjectKeyMode::Timestamp => Self::Timestamp,
            lia_config::ObjectKeyMode::TimestampUnique => Self::TimestampUnique,
        }
    }
}

/// Build the object key for an artifact created at `now` (UTC)
pub fn object_key(
    prefix: &str,
    extension: &str,
    now: DateTime<Utc>,
    strategy: ObjectKeyStrategy,
) -> String {
    let stamp = now.format("%Y%m%d%H%M%S");
    let prefix = prefix.trim_end_matches('/');

    match strategy {
        ObjectKeyStrategy::Timestamp => format!("{}/{}.{}", prefix, stamp, extension),
        ObjectKeyStrategy::TimestampUnique => format!(
            "{}/{}-{:08x}.{}",
            prefix,
            stamp,
            rand::random::<u32>(),
            extension
        ),
    }
}

/// GCS configuration
#[derive(Debug, Clone)]
pub struct GcsConfig {
    pub bucket: String,
    /// Upload API base, e.g. https://storage.googleapis.com/upload/storage/v1
    pub upload_endpoint: String,
    /// Public URL base, e.g. https://storage.googleapis.com
    pub public_url_base: String,
    pub timeout: Duration,
}

impl Default for GcsConfig {
    fn default() -> Self {
        Self {
            bucket: String::new(),
            upload_endpoint: "https://storage.googleapis.com/upload/storage/v1".to_string(),
            public_url_base: "https://storage.googleapis.com".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Cloud Storage client for publishing synthesized replies
pub struct GcsStorage {
    config: GcsConfig,
    auth: GoogleAuth,
    client: Client,
}

impl GcsStorage {
    pub fn new(config: GcsConfig, auth: GoogleAuth) -> std::result::Result<Self, PipelineError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PipelineError::Storage(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            config,
            auth,
            client,
        })
    }

    /// Public URL for `key`
    pub fn public_url(&self, key: &str) -> String {
        format!(
            "{}/{}/{}",
            self.config.public_url_base.trim_end_matches('/'),
            self.config.bucket,
            key
        )
    }

    async fn put(
        &self,
        file: &Path,
        key: &str,
        content_type: &str,
    ) -> std::result::Result<String, PipelineError> {
        let bytes = tokio::fs::read(file).await?;

        let url = format!(
            "{}/b/{}/o",
            self.config.upload_endpoint.trim_end_matches('/'),
            self.config.bucket
        );

        let builder = self
            .client
            .post(url)
            .query(&[
                ("uploadType", "media"),
                ("name", key),
                ("predefinedAcl", "publicRead"),
            ])
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes);

        let response = self
            .auth
            .authorize(builder)
            .await?
            .send()
            .await
            .map_err(|e| PipelineError::Storage(format!("Upload failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PipelineError::Storage(format!("HTTP {}: {}", status, body)));
        }

        Ok(self.public_url(key))
    }
}

#[async_trait]
impl ObjectStorage for GcsStorage {
    async fn upload(&self, file: &Path, key: &str, content_type: &str) -> Result<String> {
        let url = self
            .put(file, key, content_type)
            .await
            .map_err(|e| lia_core::Error::Storage(e.to_string()))?;

        tracing::info!(bucket = %self.config.bucket, %key, %url, "Published audio");
        Ok(url)
    }
}
