//! Lia Server
//!
//! HTTP endpoints for text, voice and quiz requests.

pub mod bootstrap;
pub mod http;
pub mod metrics;
pub mod state;

pub use bootstrap::build_state;
pub use http::create_router;
pub use metrics::{init_metrics, metrics_handler};
pub use state::AppState;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

/// Server errors
#[derive(Error, Debug)]
pub enum ServerError {
    /// Caller input could not be processed
    #[error("{0}")]
    InvalidRequest(String),

    /// Request body failed validation
    #[error("{0}")]
    Unprocessable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<lia_core::Error> for ServerError {
    fn from(err: lia_core::Error) -> Self {
        if err.is_validation() {
            ServerError::InvalidRequest(err.to_string())
        } else {
            ServerError::Internal(err.to_string())
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = match self {
            ServerError::InvalidRequest(msg) | ServerError::Unprocessable(msg) => msg,
            ServerError::Internal(msg) => {
                tracing::error!(error = %msg, "Request failed");
                "Internal server error".to_string()
            }
        };

        (status, Json(serde_json::json!({ "detail": detail }))).into_response()
    }
}
