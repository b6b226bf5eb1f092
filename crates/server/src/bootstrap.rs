//! Startup wiring
//!
//! Every production client is built once here from [`Settings`] and injected
//! into the pipelines.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use lia_agent::{
    AnswerComposer, FallbackResponder, QueryPipeline, QuizGenerator, VoicePipeline,
    VoicePipelineConfig, VoiceStages,
};
use lia_config::{constants::endpoints, GoogleAuthMode, Settings};
use lia_core::{Summarizer, VectorIndex, VoiceConfig};
use lia_llm::{HuggingFaceConfig, HuggingFaceSummarizer, LlmBackend, OpenAIBackend, OpenAIConfig};
use lia_pipeline::{
    FfmpegConfig, FfmpegTranscoder, GcsConfig, GcsStorage, GoogleAuth, GoogleSpeechToText,
    GoogleSttConfig, GoogleTextToSpeech, GoogleTtsConfig, HttpAudioSource, ScratchDir,
    ServiceAccountKey,
};
use lia_rag::{
    OpenAIEmbedder, OpenAIEmbeddingConfig, QdrantIndex, RelevanceGatedRetriever, VectorStore,
    VectorStoreConfig,
};

use crate::state::AppState;

/// Build the application state from settings
pub fn build_state(settings: Settings) -> anyhow::Result<AppState> {
    let index = build_index(&settings)?;

    let llm: Arc<dyn LlmBackend> = Arc::new(
        OpenAIBackend::new(OpenAIConfig {
            endpoint: settings.llm.endpoint.clone(),
            api_key: settings.llm.api_key.clone(),
            model: settings.llm.model.clone(),
            max_tokens: settings.llm.max_tokens,
            temperature: settings.llm.temperature,
            timeout: Duration::from_secs(settings.llm.timeout_seconds),
        })
        .context("failed to create chat model client")?,
    );

    let summarizer: Option<Arc<dyn Summarizer>> = if settings.summarizer.enabled {
        let summarizer = HuggingFaceSummarizer::new(HuggingFaceConfig {
            endpoint: settings.summarizer.endpoint.clone(),
            api_key: settings.summarizer.api_key.clone(),
            model: settings.summarizer.model.clone(),
            max_length: settings.summarizer.max_length,
            min_length: settings.summarizer.min_length,
            timeout: Duration::from_secs(settings.summarizer.timeout_seconds),
        })
        .context("failed to create summarizer client")?;
        Some(Arc::new(summarizer))
    } else {
        tracing::info!("Query summarization disabled");
        None
    };

    let query = Arc::new(QueryPipeline::new(
        summarizer,
        RelevanceGatedRetriever::new(
            index.clone(),
            settings.rag.top_k,
            settings.rag.relevance_threshold,
        ),
        AnswerComposer::new(llm.clone()),
        FallbackResponder::default(),
    ));

    let voice = Arc::new(build_voice_pipeline(&settings, query.clone())?);

    let quiz = Arc::new(QuizGenerator::new(index, llm).with_top_k(settings.rag.quiz_top_k));

    tracing::info!(
        collection = %settings.rag.collection,
        top_k = settings.rag.top_k,
        threshold = settings.rag.relevance_threshold,
        model = %settings.llm.model,
        "Pipelines initialized"
    );

    Ok(AppState::new(settings, query, voice, quiz))
}

fn build_index(settings: &Settings) -> anyhow::Result<Arc<dyn VectorIndex>> {
    let embedder = OpenAIEmbedder::new(OpenAIEmbeddingConfig {
        endpoint: settings.embeddings.endpoint.clone(),
        api_key: settings.embeddings.api_key.clone(),
        model: settings.embeddings.model.clone(),
        timeout: Duration::from_secs(settings.embeddings.timeout_seconds),
    })
    .context("failed to create embeddings client")?;

    let store = VectorStore::new(VectorStoreConfig {
        endpoint: settings.rag.qdrant_endpoint.clone(),
        collection: settings.rag.collection.clone(),
        api_key: settings.rag.qdrant_api_key.clone(),
    })
    .with_context(|| format!("failed to connect to Qdrant at {}", settings.rag.qdrant_endpoint))?;

    Ok(Arc::new(QdrantIndex::new(Arc::new(embedder), store)))
}

fn build_voice_pipeline(
    settings: &Settings,
    query: Arc<QueryPipeline>,
) -> anyhow::Result<VoicePipeline> {
    let speech = &settings.speech;
    let storage = &settings.storage;
    let audio = &settings.audio;

    let speech_timeout = Duration::from_secs(speech.timeout_seconds);
    let stt = GoogleSpeechToText::new(
        GoogleSttConfig {
            endpoint: speech.stt_endpoint.clone(),
            timeout: speech_timeout,
        },
        google_auth(speech.auth_mode, &speech.api_key, &speech.access_token, &speech.credentials_path)?,
    )
    .context("failed to create speech recognition client")?;

    let tts = GoogleTextToSpeech::new(
        GoogleTtsConfig {
            endpoint: speech.tts_endpoint.clone(),
            timeout: speech_timeout,
        },
        google_auth(speech.auth_mode, &speech.api_key, &speech.access_token, &speech.credentials_path)?,
    )
    .context("failed to create speech synthesis client")?;

    let gcs = GcsStorage::new(
        GcsConfig {
            bucket: storage.bucket.clone(),
            upload_endpoint: storage.upload_endpoint.clone(),
            public_url_base: storage.public_url_base.clone(),
            timeout: Duration::from_secs(storage.timeout_seconds),
        },
        google_auth(
            storage.auth_mode,
            &speech.api_key,
            &storage.access_token,
            &storage.credentials_path,
        )?,
    )
    .context("failed to create object storage client")?;

    let source = HttpAudioSource::new(Duration::from_secs(audio.fetch_timeout_seconds))
        .context("failed to create audio download client")?;

    let transcoder = FfmpegTranscoder::new(FfmpegConfig {
        binary: audio.ffmpeg_path.clone(),
        sample_rate: audio.sample_rate,
        timeout: Duration::from_secs(audio.transcode_timeout_seconds),
    });

    let stages = VoiceStages {
        source: Arc::new(source),
        transcoder: Arc::new(transcoder),
        stt: Arc::new(stt),
        tts: Arc::new(tts),
        storage: Arc::new(gcs),
    };

    let config = VoicePipelineConfig {
        locale: speech.locale.clone(),
        voice: VoiceConfig::new(speech.language_code.clone(), speech.voice_name.clone()),
        key_prefix: storage.key_prefix.clone(),
        key_strategy: storage.key_mode.into(),
        ..Default::default()
    };

    let scratch = ScratchDir::from_config(audio.scratch_dir.as_deref());
    tracing::debug!(scratch = %scratch.path().display(), "Voice pipeline scratch directory");

    Ok(VoicePipeline::new(stages, query, scratch, config))
}

fn google_auth(
    mode: GoogleAuthMode,
    api_key: &str,
    token: &str,
    credentials_path: &str,
) -> anyhow::Result<GoogleAuth> {
    let auth = match mode {
        GoogleAuthMode::ApiKey => GoogleAuth::api_key(api_key),
        GoogleAuthMode::StaticToken => GoogleAuth::static_token(token),
        GoogleAuthMode::Metadata => GoogleAuth::metadata(token_client()?, endpoints::GCE_METADATA_TOKEN),
        GoogleAuthMode::ServiceAccount => {
            let key = ServiceAccountKey::from_file(credentials_path)?;
            tracing::info!(account = %key.client_email, "Using service account credentials");
            GoogleAuth::service_account(token_client()?, key)?
        }
    };
    Ok(auth)
}

fn token_client() -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
        .context("failed to create token client")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_account_auth_from_key_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lia-sa.json");
        std::fs::write(
            &path,
            serde_json::json!({
                "client_email": "lia-voice@lia-tutor.iam.gserviceaccount.com",
                "private_key": include_str!("../../pipeline/testdata/service_account_key.pem"),
            })
            .to_string(),
        )
        .unwrap();

        let auth = google_auth(GoogleAuthMode::ServiceAccount, "", "", path.to_str().unwrap()).unwrap();
        assert_eq!(
            format!("{:?}", auth),
            "GoogleAuth::ServiceAccount(lia-voice@lia-tutor.iam.gserviceaccount.com)"
        );
    }

    #[test]
    fn test_service_account_auth_missing_key_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        assert!(google_auth(GoogleAuthMode::ServiceAccount, "", "", path.to_str().unwrap()).is_err());
    }

    #[test]
    fn test_api_key_auth_needs_no_file() {
        let auth = google_auth(GoogleAuthMode::ApiKey, "AIza-test", "", "").unwrap();
        assert_eq!(format!("{:?}", auth), "GoogleAuth::ApiKey(..)");
    }
}
