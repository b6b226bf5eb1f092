//! Collaborator traits
//!
//! The pipelines only ever talk to these traits. Production clients live in
//! `lia-rag`, `lia-llm` and `lia-pipeline`; tests plug in fakes.

mod audio;
mod retriever;
mod speech;
mod storage;
mod summarizer;

pub use audio::{AudioSource, AudioTranscoder};
pub use retriever::VectorIndex;
pub use speech::{SpeechToText, TextToSpeech};
pub use storage::ObjectStorage;
pub use summarizer::Summarizer;
