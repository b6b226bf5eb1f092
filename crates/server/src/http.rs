//! HTTP Endpoints
//!
//! REST API for the tutoring assistant.

use axum::{
    extract::{rejection::JsonRejection, MatchedPath, Request, State},
    http::{HeaderValue, Method},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use lia_core::Query;

use crate::metrics::metrics_handler;
use crate::state::AppState;
use crate::ServerError;

const DEV_ORIGIN: &str = "http://localhost:3000";

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let cors_layer = build_cors_layer(
        &state.settings.server.cors_origins,
        state.settings.server.cors_enabled,
    );

    Router::new()
        .route("/", get(root))
        .route("/query", post(query))
        .route("/voice-query", post(voice_query))
        .route("/voiceQuery", post(voice_query))
        .route("/quiz", post(quiz))
        .route("/metrics", get(metrics_handler))
        .route_layer(middleware::from_fn(track_requests))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(state)
}

/// Build CORS layer from configured origins
///
/// Permissive when disabled; falls back to the local dev origin when no
/// configured origin parses.
fn build_cors_layer(origins: &[String], enabled: bool) -> CorsLayer {
    if !enabled {
        tracing::warn!("CORS is disabled - allowing all origins");
        return CorsLayer::permissive();
    }

    let parsed_origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| {
            origin.parse::<HeaderValue>().ok().or_else(|| {
                tracing::warn!("Invalid CORS origin: {}", origin);
                None
            })
        })
        .collect();

    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    if parsed_origins.is_empty() {
        tracing::info!("No usable CORS origins configured, defaulting to {}", DEV_ORIGIN);
        return layer.allow_origin(HeaderValue::from_static(DEV_ORIGIN));
    }

    tracing::info!("CORS configured with {} origins", parsed_origins.len());
    layer.allow_origin(parsed_origins)
}

/// Count every routed request by path and status
async fn track_requests(request: Request, next: Next) -> Response {
    let endpoint = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_string())
        .unwrap_or_default();

    let response = next.run(request).await;

    ::metrics::counter!(
        "lia_requests_total",
        "endpoint" => endpoint,
        "status" => response.status().as_u16().to_string()
    )
    .increment(1);

    response
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ServerError> {
    payload
        .map(|Json(request)| request)
        .map_err(|rejection| ServerError::Unprocessable(rejection.body_text()))
}

async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "message": "API is running!" }))
}

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub query_text: String,
    pub message_context: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QueryResponse {
    pub response: String,
    pub sources: Vec<String>,
}

/// Text question
async fn query(
    State(state): State<AppState>,
    payload: Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Json<QueryResponse>, ServerError> {
    let request = body(payload)?;
    if request.query_text.is_empty() {
        return Err(ServerError::Unprocessable(
            "query_text must not be empty".to_string(),
        ));
    }

    let answer = state
        .query
        .answer_query(&Query::new(request.query_text, request.message_context))
        .await;

    Ok(Json(QueryResponse {
        response: answer.text,
        sources: answer.sources,
    }))
}

#[derive(Debug, Deserialize)]
pub struct VoiceQueryRequest {
    pub audio_url: String,
    pub audio_auth: String,
    pub message_context: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VoiceQueryResponse {
    pub query_text: String,
    pub response: String,
    pub audio_link: String,
    pub sources: Vec<String>,
}

/// Spoken question stored at a URL
async fn voice_query(
    State(state): State<AppState>,
    payload: Result<Json<VoiceQueryRequest>, JsonRejection>,
) -> Result<Json<VoiceQueryResponse>, ServerError> {
    let request = body(payload)?;

    let result = state
        .voice
        .answer_voice_query(
            &request.audio_url,
            &request.audio_auth,
            &request.message_context,
        )
        .await;

    let voice = match result {
        Ok(voice) => voice,
        Err(e) => {
            if e.is_validation() {
                tracing::warn!(error = %e, url = %request.audio_url, "Voice query rejected");
            }
            return Err(e.into());
        }
    };

    Ok(Json(VoiceQueryResponse {
        query_text: voice.transcribed_query,
        response: voice.answer.text,
        audio_link: voice.audio_url,
        sources: voice.answer.sources,
    }))
}

#[derive(Debug, Deserialize)]
pub struct QuizRequest {
    pub topic: String,
    #[serde(default)]
    pub used_questions: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QuizResponse {
    pub question: String,
}

/// Multiple-choice question about a topic
async fn quiz(
    State(state): State<AppState>,
    payload: Result<Json<QuizRequest>, JsonRejection>,
) -> Result<Json<QuizResponse>, ServerError> {
    let request = body(payload)?;
    if request.topic.trim().is_empty() {
        return Err(ServerError::Unprocessable("topic must not be empty".to_string()));
    }

    let question = state
        .quiz
        .generate(&request.topic, &request.used_questions)
        .await?;

    Ok(Json(QuizResponse { question }))
}
