//! Query summarization through the Hugging Face inference API
//!
//! Runs `facebook/bart-large-cnn` remotely with the same decoding bounds the
//! search string needs (`max_length` 100, `min_length` 2, greedy).

use std::time::Duration;

use async_trait::async_trait;
use lia_core::{Result, Summarizer};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::LlmError;

/// Hugging Face summarizer configuration
#[derive(Debug, Clone)]
pub struct HuggingFaceConfig {
    /// Inference endpoint base, the model id is appended
    pub endpoint: String,
    pub api_key: String,
    pub model: String,
    pub max_length: u32,
    pub min_length: u32,
    pub timeout: Duration,
}

impl Default for HuggingFaceConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api-inference.huggingface.co/models".to_string(),
            api_key: String::new(),
            model: "facebook/bart-large-cnn".to_string(),
            max_length: 100,
            min_length: 2,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Summarizer backed by a hosted seq2seq model
pub struct HuggingFaceSummarizer {
    config: HuggingFaceConfig,
    client: Client,
}

impl HuggingFaceSummarizer {
    pub fn new(config: HuggingFaceConfig) -> std::result::Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LlmError::Network(e.to_string()))?;

        Ok(Self { config, client })
    }

    fn model_url(&self) -> String {
        format!(
            "{}/{}",
            self.config.endpoint.trim_end_matches('/'),
            self.config.model
        )
    }

    async fn request_summary(&self, text: &str) -> std::result::Result<String, LlmError> {
        let request = SummarizationRequest {
            inputs: text,
            parameters: SummarizationParameters {
                max_length: self.config.max_length,
                min_length: self.config.min_length,
                do_sample: false,
            },
        };

        let mut builder = self.client.post(self.model_url()).json(&request);
        if !self.config.api_key.is_empty() {
            builder = builder.bearer_auth(&self.config.api_key);
        }

        let response = builder.send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(LlmError::Api(format!("HTTP {}: {}", status, error_text)));
        }

        let summaries: Vec<SummarizationOutput> = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        summaries
            .into_iter()
            .next()
            .map(|s| s.summary_text)
            .ok_or_else(|| LlmError::InvalidResponse("Empty summary list".to_string()))
    }
}

#[async_trait]
impl Summarizer for HuggingFaceSummarizer {
    async fn summarize(&self, text: &str) -> Result<String> {
        self.request_summary(text)
            .await
            .map_err(|e| lia_core::Error::Summarization(e.to_string()))
    }
}

#[derive(Debug, Serialize)]
struct SummarizationRequest<'a> {
    inputs: &'a str,
    parameters: SummarizationParameters,
}

#[derive(Debug, Serialize)]
struct SummarizationParameters {
    max_length: u32,
    min_length: u32,
    do_sample: bool,
}

#[derive(Debug, Deserialize)]
struct SummarizationOutput {
    summary_text: String,
}
