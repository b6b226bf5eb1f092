//! ffmpeg-based transcoding to recognizer input

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use lia_core::{AudioTranscoder, Result};
use tokio::process::Command;

use crate::PipelineError;

/// ffmpeg transcoder configuration
#[derive(Debug, Clone)]
pub struct FfmpegConfig {
    /// ffmpeg binary (resolved through PATH when not absolute)
    pub binary: String,
    pub sample_rate: u32,
    pub timeout: Duration,
}

impl Default for FfmpegConfig {
    fn default() -> Self {
        Self {
            binary: "ffmpeg".to_string(),
            sample_rate: 16_000,
            timeout: Duration::from_secs(60),
        }
    }
}

/// Decodes any container ffmpeg understands into mono s16le WAV
pub struct FfmpegTranscoder {
    config: FfmpegConfig,
}

impl FfmpegTranscoder {
    pub fn new(config: FfmpegConfig) -> Self {
        Self { config }
    }

    fn args(&self, input: &Path, output: &Path) -> Vec<String> {
        vec![
            "-y".to_string(),
            "-loglevel".to_string(),
            "error".to_string(),
            "-i".to_string(),
            input.display().to_string(),
            "-ar".to_string(),
            self.config.sample_rate.to_string(),
            "-ac".to_string(),
            "1".to_string(),
            "-acodec".to_string(),
            "pcm_s16le".to_string(),
            "-f".to_string(),
            "wav".to_string(),
            output.display().to_string(),
        ]
    }

    async fn run(&self, input: &Path, output: &Path) -> std::result::Result<(), PipelineError> {
        let child = Command::new(&self.config.binary)
            .args(self.args(input, output))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                PipelineError::Transcode(format!("Failed to spawn {}: {}", self.config.binary, e))
            })?;

        let output_status = tokio::time::timeout(self.config.timeout, child.wait_with_output())
            .await
            .map_err(|_| {
                PipelineError::Transcode(format!(
                    "ffmpeg timed out after {}s",
                    self.config.timeout.as_secs()
                ))
            })??;

        if !output_status.status.success() {
            let stderr = String::from_utf8_lossy(&output_status.stderr);
            tracing::error!("FFmpeg error: {}", stderr);
            return Err(PipelineError::Transcode(format!(
                "FFmpeg conversion failed: {}",
                stderr.trim()
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl AudioTranscoder for FfmpegTranscoder {
    async fn transcode(&self, input: &Path, output: &Path) -> Result<()> {
        self.run(input, output).await?;
        tracing::debug!(input = %input.display(), output = %output.display(), "Transcoded audio");
        Ok(())
    }
}
