//! Retrieval-grounded quiz questions

use std::sync::Arc;
use std::time::Instant;

use lia_config::constants::retrieval;
use lia_core::{Result, VectorIndex};
use lia_llm::{LlmBackend, PromptBuilder};

use crate::telemetry::record_stage;

/// Question line of a generated quiz item, for the caller's used list
pub fn first_line(question: &str) -> &str {
    question
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("")
}

/// Generates multiple-choice questions about a topic
pub struct QuizGenerator {
    index: Arc<dyn VectorIndex>,
    llm: Arc<dyn LlmBackend>,
    top_k: usize,
    max_attempts: usize,
}

impl QuizGenerator {
    pub fn new(index: Arc<dyn VectorIndex>, llm: Arc<dyn LlmBackend>) -> Self {
        Self {
            index,
            llm,
            top_k: retrieval::QUIZ_TOP_K,
            max_attempts: 3,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k.max(1);
        self
    }

    pub fn with_max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    /// One question with options A-D and the correct answer
    ///
    /// Regenerates while the output repeats a used question, up to
    /// `max_attempts`; the last output is returned as is.
    pub async fn generate(&self, topic: &str, used_questions: &[String]) -> Result<String> {
        let started = Instant::now();
        let passages = self.index.similarity_search(topic, self.top_k).await?;
        let context = passages
            .iter()
            .map(|p| p.content.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        let used: Vec<&str> = used_questions
            .iter()
            .map(|q| q.trim())
            .filter(|q| !q.is_empty())
            .collect();

        let messages = PromptBuilder::new()
            .quiz_prompt(topic, &context, &used)
            .build();

        let mut attempt = 0;
        loop {
            attempt += 1;
            let result = self.llm.generate(&messages).await?;
            let question = result.text.trim().to_string();

            let repeated = used.iter().any(|q| question.contains(q));
            if !repeated || attempt >= self.max_attempts {
                if repeated {
                    tracing::warn!(topic, attempt, "Quiz question still repeats a used one");
                }
                record_stage("quiz", started);
                return Ok(question);
            }

            tracing::debug!(topic, attempt, "Quiz question repeated, regenerating");
        }
    }
}
