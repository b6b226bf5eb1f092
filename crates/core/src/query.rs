//! Query, passage and answer types

use serde::{Deserialize, Serialize};

/// Source label used when a passage carries no source identifier
pub const UNKNOWN_SOURCE: &str = "Unknown";

/// A question plus the conversation it belongs to
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    /// The question as asked (typed or transcribed)
    pub text: String,
    /// Free-form conversation history supplied by the caller
    #[serde(default)]
    pub conversation_context: String,
}

impl Query {
    pub fn new(text: impl Into<String>, conversation_context: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            conversation_context: conversation_context.into(),
        }
    }

    /// Text handed to the query summarizer
    pub fn summarization_input(&self) -> String {
        format!("Context: {}. Query: {}", self.conversation_context, self.text)
    }
}

/// A passage returned by the vector index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedPassage {
    /// Passage text
    pub content: String,
    /// Originating document, when the index stored one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,
    /// Similarity score (0.0 - 1.0)
    pub score: f32,
}

impl RetrievedPassage {
    pub fn new(content: impl Into<String>, score: f32) -> Self {
        Self {
            content: content.into(),
            source_id: None,
            score,
        }
    }

    /// Set source
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source_id = Some(source.into());
        self
    }

    /// Source label reported to callers
    pub fn source_label(&self) -> &str {
        self.source_id.as_deref().unwrap_or(UNKNOWN_SOURCE)
    }
}

/// Answer to a text query
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub text: String,
    /// Source of every passage used as context, in retrieval order
    pub sources: Vec<String>,
}

impl Answer {
    /// Answer with no grounding sources (fallback and apology replies)
    pub fn unsourced(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sources: Vec::new(),
        }
    }
}

/// Answer to a voice query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceAnswer {
    /// Answer text as composed (not sanitized for speech)
    pub answer: Answer,
    /// What the recognizer heard
    pub transcribed_query: String,
    /// Public URL of the spoken reply
    pub audio_url: String,
}
