//! Router tests with fake collaborators behind the real pipelines

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use tower::ServiceExt;

use lia_agent::{
    AnswerComposer, FallbackResponder, QueryPipeline, QuizGenerator, VoicePipeline,
    VoicePipelineConfig, VoiceStages, NO_MATCH_RESPONSES,
};
use lia_config::Settings;
use lia_core::{
    AudioSource, AudioTranscoder, Error, ObjectStorage, Result, RetrievedPassage, SpeechToText,
    TextToSpeech, VectorIndex, VoiceConfig,
};
use lia_llm::{FinishReason, GenerationResult, LlmBackend, LlmError, Message};
use lia_pipeline::ScratchDir;
use lia_rag::RelevanceGatedRetriever;
use lia_server::{create_router, AppState};

struct FakeIndex(Vec<RetrievedPassage>);

#[async_trait]
impl VectorIndex for FakeIndex {
    async fn similarity_search(&self, _query: &str, k: usize) -> Result<Vec<RetrievedPassage>> {
        Ok(self.0.iter().take(k).cloned().collect())
    }
}

/// Model that answers after an optional delay
#[derive(Default)]
struct FakeLlm {
    delay: Duration,
}

#[async_trait]
impl LlmBackend for FakeLlm {
    async fn generate(&self, _messages: &[Message]) -> std::result::Result<GenerationResult, LlmError> {
        tokio::time::sleep(self.delay).await;
        Ok(GenerationResult {
            text: "Oxidação é a perda de elétrons.".to_string(),
            tokens: 6,
            total_time_ms: self.delay.as_millis() as u64,
            finish_reason: FinishReason::Stop,
        })
    }

    fn model_name(&self) -> &str {
        "fake"
    }
}

/// Source that answers by URL: `/missing` is a 404, `/broken` breaks STT
struct FakeSource;

#[async_trait]
impl AudioSource for FakeSource {
    async fn fetch(&self, url: &str, _token: &str) -> Result<Vec<u8>> {
        if url.ends_with("/missing") {
            return Err(Error::AudioFetch(404));
        }
        Ok(url.as_bytes().to_vec())
    }
}

struct CopyTranscoder;

#[async_trait]
impl AudioTranscoder for CopyTranscoder {
    async fn transcode(&self, input: &Path, output: &Path) -> Result<()> {
        tokio::fs::copy(input, output).await?;
        Ok(())
    }
}

struct FakeStt;

#[async_trait]
impl SpeechToText for FakeStt {
    async fn transcribe(&self, wav_path: &Path, _locale: &str) -> Result<String> {
        let content = tokio::fs::read_to_string(wav_path).await?;
        if content.ends_with("/broken") {
            return Err(Error::Stt("No speech recognized".into()));
        }
        Ok("O que é oxidação?".to_string())
    }

    fn model_name(&self) -> &str {
        "fake"
    }
}

struct FakeTts;

#[async_trait]
impl TextToSpeech for FakeTts {
    async fn synthesize(&self, _text: &str, _voice: &VoiceConfig) -> Result<Vec<u8>> {
        Ok(b"ID3".to_vec())
    }

    fn model_name(&self) -> &str {
        "fake"
    }
}

struct FakeStorage;

#[async_trait]
impl ObjectStorage for FakeStorage {
    async fn upload(&self, _file: &Path, key: &str, _content_type: &str) -> Result<String> {
        Ok(format!("https://storage.googleapis.com/lia-audio/{}", key))
    }
}

fn app(passages: Vec<RetrievedPassage>, scratch: &Path) -> Router {
    app_with_llm(passages, scratch, FakeLlm::default())
}

fn app_with_llm(passages: Vec<RetrievedPassage>, scratch: &Path, llm: FakeLlm) -> Router {
    let index: Arc<dyn VectorIndex> = Arc::new(FakeIndex(passages));
    let llm: Arc<dyn LlmBackend> = Arc::new(llm);

    let query = Arc::new(QueryPipeline::new(
        None,
        RelevanceGatedRetriever::new(index.clone(), 3, 0.7),
        AnswerComposer::new(llm.clone()),
        FallbackResponder::default(),
    ));

    let voice = Arc::new(VoicePipeline::new(
        VoiceStages {
            source: Arc::new(FakeSource),
            transcoder: Arc::new(CopyTranscoder),
            stt: Arc::new(FakeStt),
            tts: Arc::new(FakeTts),
            storage: Arc::new(FakeStorage),
        },
        query.clone(),
        ScratchDir::new(scratch),
        VoicePipelineConfig::default(),
    ));

    let quiz = Arc::new(QuizGenerator::new(index, llm));

    create_router(AppState::new(Settings::default(), query, voice, quiz))
}

fn relevant() -> Vec<RetrievedPassage> {
    vec![RetrievedPassage::new("Oxidação é a perda de elétrons.", 0.85).with_source("doc1.pdf")]
}

async fn post(app: Router, uri: &str, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null))
}

#[tokio::test]
async fn test_root_liveness() {
    let dir = tempfile::tempdir().unwrap();
    let request = Request::builder().uri("/").body(Body::empty()).unwrap();

    let response = app(relevant(), dir.path()).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["message"], "API is running!");
}

#[tokio::test]
async fn test_query_grounded_answer() {
    let dir = tempfile::tempdir().unwrap();
    let (status, body) = post(
        app(relevant(), dir.path()),
        "/query",
        serde_json::json!({ "query_text": "O que é oxidação?", "message_context": "" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(!body["response"].as_str().unwrap().is_empty());
    assert_eq!(body["sources"], serde_json::json!(["doc1.pdf"]));
}

#[tokio::test]
async fn test_slow_model_is_not_cut_off() {
    let dir = tempfile::tempdir().unwrap();
    let slow = FakeLlm {
        delay: Duration::from_millis(1200),
    };
    let (status, body) = post(
        app_with_llm(relevant(), dir.path(), slow),
        "/query",
        serde_json::json!({ "query_text": "O que é oxidação?", "message_context": "" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"], "Oxidação é a perda de elétrons.");
}

#[tokio::test]
async fn test_query_without_match_uses_fallback() {
    let dir = tempfile::tempdir().unwrap();
    let (status, body) = post(
        app(Vec::new(), dir.path()),
        "/query",
        serde_json::json!({ "query_text": "Quem venceu a Copa?", "message_context": "" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(NO_MATCH_RESPONSES.contains(&body["response"].as_str().unwrap()));
    assert_eq!(body["sources"], serde_json::json!([]));
}

#[tokio::test]
async fn test_query_rejects_invalid_body() {
    let dir = tempfile::tempdir().unwrap();

    let (status, body) = post(
        app(relevant(), dir.path()),
        "/query",
        serde_json::json!({ "query_text": "", "message_context": "" }),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["detail"].is_string());

    let (status, _) = post(
        app(relevant(), dir.path()),
        "/query",
        serde_json::json!({ "message_context": "" }),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_voice_query_success_and_alias() {
    let dir = tempfile::tempdir().unwrap();

    for uri in ["/voice-query", "/voiceQuery"] {
        let (status, body) = post(
            app(relevant(), dir.path()),
            uri,
            serde_json::json!({
                "audio_url": "https://media.example/audio/ok",
                "audio_auth": "token",
                "message_context": ""
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK, "{}", uri);
        assert_eq!(body["query_text"], "O que é oxidação?");
        assert_eq!(body["sources"], serde_json::json!(["doc1.pdf"]));
        assert!(body["audio_link"]
            .as_str()
            .unwrap()
            .contains("/agent_responses/"));
    }

    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_voice_query_fetch_404_is_bad_request() {
    let dir = tempfile::tempdir().unwrap();
    let (status, body) = post(
        app(relevant(), dir.path()),
        "/voice-query",
        serde_json::json!({
            "audio_url": "https://media.example/audio/missing",
            "audio_auth": "token",
            "message_context": ""
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().contains("404"));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_voice_query_stage_failure_is_internal() {
    let dir = tempfile::tempdir().unwrap();
    let (status, body) = post(
        app(relevant(), dir.path()),
        "/voice-query",
        serde_json::json!({
            "audio_url": "https://media.example/audio/broken",
            "audio_auth": "token",
            "message_context": ""
        }),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["detail"], "Internal server error");
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_quiz_returns_question() {
    let dir = tempfile::tempdir().unwrap();
    let (status, body) = post(
        app(relevant(), dir.path()),
        "/quiz",
        serde_json::json!({ "topic": "Química", "used_questions": [] }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(!body["question"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_metrics_disabled_without_recorder() {
    let dir = tempfile::tempdir().unwrap();
    let request = Request::builder().uri("/metrics").body(Body::empty()).unwrap();

    let response = app(relevant(), dir.path()).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
