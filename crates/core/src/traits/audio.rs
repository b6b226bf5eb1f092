//! Audio acquisition and conversion traits

use crate::Result;
use async_trait::async_trait;
use std::path::Path;

/// Downloads caller-supplied audio
#[async_trait]
pub trait AudioSource: Send + Sync + 'static {
    /// Fetch the bytes behind `url` using `token` as a bearer credential
    ///
    /// Non-success statuses must surface as [`crate::Error::AudioFetch`].
    async fn fetch(&self, url: &str, token: &str) -> Result<Vec<u8>>;
}

/// Converts an audio file into mono 16 kHz 16-bit PCM WAV
#[async_trait]
pub trait AudioTranscoder: Send + Sync + 'static {
    /// Transcode `input` into `output`, overwriting it
    async fn transcode(&self, input: &Path, output: &Path) -> Result<()>;
}
