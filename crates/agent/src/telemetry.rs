use std::time::Instant;

pub(crate) const STAGE_DURATION: &str = "lia_stage_duration_seconds";
pub(crate) const FALLBACK_RESPONSES: &str = "lia_fallback_responses_total";

/// Record how long `stage` took since `started`
pub(crate) fn record_stage(stage: &'static str, started: Instant) {
    metrics::histogram!(STAGE_DURATION, "stage" => stage).record(started.elapsed().as_secs_f64());
}

pub(crate) fn record_fallback() {
    metrics::counter!(FALLBACK_RESPONSES).increment(1);
}
