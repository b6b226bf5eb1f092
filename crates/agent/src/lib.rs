//! Question answering pipelines
//!
//! Features:
//! - Text pipeline: summarize, retrieve behind a relevance gate, compose or
//!   fall back, never fail
//! - Voice pipeline: fetch, transcode, transcribe, answer, sanitize,
//!   synthesize, publish, with scoped temp files
//! - Retrieval-grounded quiz questions

pub mod composer;
pub mod fallback;
pub mod query;
pub mod quiz;
pub mod voice;

mod telemetry;

pub use composer::AnswerComposer;
pub use fallback::{Chooser, FallbackResponder, RandomChooser, APOLOGY, NO_MATCH_RESPONSES};
pub use query::QueryPipeline;
pub use quiz::{first_line, QuizGenerator};
pub use voice::{VoicePipeline, VoicePipelineConfig, VoiceStages};
