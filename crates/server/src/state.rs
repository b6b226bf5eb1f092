//! Application State
//!
//! Shared state across all handlers.

use std::sync::Arc;

use lia_agent::{QueryPipeline, QuizGenerator, VoicePipeline};
use lia_config::Settings;
use metrics_exporter_prometheus::PrometheusHandle;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub query: Arc<QueryPipeline>,
    pub voice: Arc<VoicePipeline>,
    pub quiz: Arc<QuizGenerator>,
    /// Prometheus render handle, `None` when metrics are disabled
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(
        settings: Settings,
        query: Arc<QueryPipeline>,
        voice: Arc<VoicePipeline>,
        quiz: Arc<QuizGenerator>,
    ) -> Self {
        Self {
            settings: Arc::new(settings),
            query,
            voice,
            quiz,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}
