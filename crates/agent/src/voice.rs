//! Voice query pipeline
//!
//! Fetch -> transcode -> transcribe -> answer -> sanitize -> synthesize ->
//! publish. Stages run strictly in order. Each intermediate file is a scoped
//! temp file owned by the stage that needs it, so it is removed on every exit
//! path, including `?` propagation.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use lia_core::{
    AudioSource, AudioTranscoder, ObjectStorage, Query, Result, SpeechToText, TextToSpeech,
    VoiceAnswer, VoiceConfig,
};
use lia_pipeline::{object_key, strip_unspeakable, ObjectKeyStrategy, ScratchDir};
use tempfile::NamedTempFile;

use crate::query::QueryPipeline;
use crate::telemetry::record_stage;

/// External collaborators of the voice pipeline
#[derive(Clone)]
pub struct VoiceStages {
    pub source: Arc<dyn AudioSource>,
    pub transcoder: Arc<dyn AudioTranscoder>,
    pub stt: Arc<dyn SpeechToText>,
    pub tts: Arc<dyn TextToSpeech>,
    pub storage: Arc<dyn ObjectStorage>,
}

/// Voice pipeline settings
#[derive(Debug, Clone)]
pub struct VoicePipelineConfig {
    /// Recognition locale
    pub locale: String,
    pub voice: VoiceConfig,
    pub key_prefix: String,
    pub key_strategy: ObjectKeyStrategy,
    /// Suffix for the downloaded file; ffmpeg probes the real format
    pub source_suffix: String,
}

impl Default for VoicePipelineConfig {
    fn default() -> Self {
        Self {
            locale: "pt-BR".to_string(),
            voice: VoiceConfig::default(),
            key_prefix: "agent_responses".to_string(),
            key_strategy: ObjectKeyStrategy::Timestamp,
            source_suffix: ".ogg".to_string(),
        }
    }
}

pub struct VoicePipeline {
    stages: VoiceStages,
    query: Arc<QueryPipeline>,
    scratch: ScratchDir,
    config: VoicePipelineConfig,
}

impl VoicePipeline {
    pub fn new(
        stages: VoiceStages,
        query: Arc<QueryPipeline>,
        scratch: ScratchDir,
        config: VoicePipelineConfig,
    ) -> Self {
        Self {
            stages,
            query,
            scratch,
            config,
        }
    }

    /// Answer a spoken question stored at `audio_url`
    ///
    /// Fetch failures are validation errors; every later failure is internal.
    /// The returned answer text is the composed text, not the sanitized one.
    pub async fn answer_voice_query(
        &self,
        audio_url: &str,
        auth_token: &str,
        conversation_context: &str,
    ) -> Result<VoiceAnswer> {
        let started = Instant::now();
        let audio = self.stages.source.fetch(audio_url, auth_token).await?;
        record_stage("fetch", started);

        let wav = self.transcode(audio).await?;

        let started = Instant::now();
        let transcribed = self
            .stages
            .stt
            .transcribe(wav.path(), &self.config.locale)
            .await?;
        record_stage("transcribe", started);
        drop(wav);

        tracing::info!(transcript = %transcribed, "Voice question transcribed");

        let query = Query::new(transcribed.clone(), conversation_context);
        let answer = self.query.answer_query(&query).await;

        let speakable = strip_unspeakable(&answer.text);

        let started = Instant::now();
        let speech = self
            .stages
            .tts
            .synthesize(&speakable, &self.config.voice)
            .await?;
        record_stage("synthesize", started);

        let encoding = self.config.voice.encoding;
        let reply = self
            .scratch
            .write(&format!(".{}", encoding.extension()), &speech)
            .await?;
        drop(speech);

        let key = object_key(
            &self.config.key_prefix,
            encoding.extension(),
            Utc::now(),
            self.config.key_strategy,
        );

        let started = Instant::now();
        let audio_url = self
            .stages
            .storage
            .upload(reply.path(), &key, encoding.content_type())
            .await?;
        record_stage("publish", started);
        tracing::info!(url = %audio_url, "Spoken answer published");

        Ok(VoiceAnswer {
            answer,
            transcribed_query: transcribed,
            audio_url,
        })
    }

    /// Write the fetched bytes to a source file and transcode it to WAV
    ///
    /// The source file is dropped when this returns, on success or failure.
    async fn transcode(&self, audio: Vec<u8>) -> Result<NamedTempFile> {
        let started = Instant::now();

        let source = self
            .scratch
            .write(&self.config.source_suffix, &audio)
            .await?;
        drop(audio);

        let wav = self.scratch.create(".wav")?;
        self.stages
            .transcoder
            .transcode(source.path(), wav.path())
            .await?;

        record_stage("transcode", started);
        Ok(wav)
    }
}
