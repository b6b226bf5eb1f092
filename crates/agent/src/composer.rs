//! Grounded answer composition

use std::sync::Arc;

use lia_core::{Answer, Query, RetrievedPassage};
use lia_llm::{LlmBackend, LlmError, PromptBuilder};

/// Builds the tutoring prompt and calls the model once
pub struct AnswerComposer {
    llm: Arc<dyn LlmBackend>,
}

impl AnswerComposer {
    pub fn new(llm: Arc<dyn LlmBackend>) -> Self {
        Self { llm }
    }

    /// Compose an answer from `passages`
    ///
    /// The question goes in as the user turn, unsummarized. Sources follow
    /// passage order.
    pub async fn compose(
        &self,
        query: &Query,
        passages: &[RetrievedPassage],
    ) -> Result<Answer, LlmError> {
        let contents: Vec<&str> = passages.iter().map(|p| p.content.as_str()).collect();

        let messages = PromptBuilder::new()
            .tutor_system_prompt(&contents, &query.conversation_context)
            .user_message(query.text.clone())
            .build();

        let result = self.llm.generate(&messages).await?;

        Ok(Answer {
            text: result.text.trim().to_string(),
            sources: passages
                .iter()
                .map(|p| p.source_label().to_string())
                .collect(),
        })
    }

    pub fn model_name(&self) -> &str {
        self.llm.model_name()
    }
}
