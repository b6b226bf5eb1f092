//! Text query pipeline
//!
//! Summarizer -> relevance-gated retriever -> composer, with two degraded
//! paths that still produce a 200: a summarizer failure falls back to the raw
//! question, and an empty gate yields a canned no-match reply. Any failure
//! after the summarizer becomes the apology.

use std::sync::Arc;
use std::time::Instant;

use lia_core::{Answer, Query, Summarizer};
use lia_rag::RelevanceGatedRetriever;

use crate::composer::AnswerComposer;
use crate::fallback::FallbackResponder;
use crate::telemetry::{record_fallback, record_stage};

pub struct QueryPipeline {
    summarizer: Option<Arc<dyn Summarizer>>,
    retriever: RelevanceGatedRetriever,
    composer: AnswerComposer,
    fallback: FallbackResponder,
}

impl QueryPipeline {
    pub fn new(
        summarizer: Option<Arc<dyn Summarizer>>,
        retriever: RelevanceGatedRetriever,
        composer: AnswerComposer,
        fallback: FallbackResponder,
    ) -> Self {
        Self {
            summarizer,
            retriever,
            composer,
            fallback,
        }
    }

    /// Answer a question; never fails
    pub async fn answer_query(&self, query: &Query) -> Answer {
        let search = self.search_string(query).await;

        let started = Instant::now();
        let passages = match self.retriever.retrieve(&search).await {
            Ok(passages) => passages,
            Err(e) => {
                tracing::error!(error = %e, query = %query.text, "Retrieval failed");
                return Answer::unsourced(self.fallback.apology());
            }
        };
        record_stage("retrieve", started);

        let top_score = passages.first().map(|p| p.score);
        if passages.is_empty() {
            tracing::debug!(
                search = %search,
                threshold = self.retriever.threshold(),
                "No passage cleared the relevance gate"
            );
            record_fallback();
            return Answer::unsourced(self.fallback.no_match());
        }
        tracing::debug!(passages = passages.len(), ?top_score, "Relevance gate passed");

        let started = Instant::now();
        let result = self.composer.compose(query, &passages).await;
        record_stage("compose", started);

        match result {
            Ok(answer) => answer,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    model = self.composer.model_name(),
                    query = %query.text,
                    "Answer composition failed"
                );
                Answer::unsourced(self.fallback.apology())
            }
        }
    }

    /// Search string for `query`, the raw text when summarization is off or fails
    pub async fn search_string(&self, query: &Query) -> String {
        let Some(summarizer) = &self.summarizer else {
            return query.text.clone();
        };

        let started = Instant::now();
        let result = summarizer.summarize(&query.summarization_input()).await;
        record_stage("summarize", started);

        match result {
            Ok(summary) if !summary.trim().is_empty() => summary,
            Ok(_) => {
                tracing::warn!("Summarizer returned an empty string. Using original query.");
                query.text.clone()
            }
            Err(e) => {
                tracing::warn!(error = %e, "Error summarizing query. Using original query.");
                query.text.clone()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use lia_core::{Error, RetrievedPassage, VectorIndex};
    use lia_llm::{FinishReason, GenerationResult, LlmBackend, LlmError, Message};
    use parking_lot::Mutex;

    use crate::fallback::{APOLOGY, NO_MATCH_RESPONSES};

    struct FakeIndex {
        passages: Vec<RetrievedPassage>,
        fail: bool,
        queries: Mutex<Vec<String>>,
    }

    impl FakeIndex {
        fn with(passages: Vec<RetrievedPassage>) -> Arc<Self> {
            Arc::new(Self {
                passages,
                fail: false,
                queries: Mutex::new(Vec::new()),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                passages: Vec::new(),
                fail: true,
                queries: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl VectorIndex for FakeIndex {
        async fn similarity_search(
            &self,
            query: &str,
            k: usize,
        ) -> lia_core::Result<Vec<RetrievedPassage>> {
            self.queries.lock().push(query.to_string());
            if self.fail {
                return Err(Error::Retrieval("index offline".into()));
            }
            Ok(self.passages.iter().take(k).cloned().collect())
        }
    }

    struct FakeLlm(Option<&'static str>);

    #[async_trait]
    impl LlmBackend for FakeLlm {
        async fn generate(&self, _messages: &[Message]) -> Result<GenerationResult, LlmError> {
            match self.0 {
                Some(text) => Ok(GenerationResult {
                    text: text.to_string(),
                    tokens: 1,
                    total_time_ms: 1,
                    finish_reason: FinishReason::Stop,
                }),
                None => Err(LlmError::Api("HTTP 500".into())),
            }
        }

        fn model_name(&self) -> &str {
            "fake"
        }
    }

    struct FailingSummarizer;

    #[async_trait]
    impl Summarizer for FailingSummarizer {
        async fn summarize(&self, _text: &str) -> lia_core::Result<String> {
            Err(Error::Summarization("model loading".into()))
        }
    }

    struct BlankSummarizer;

    #[async_trait]
    impl Summarizer for BlankSummarizer {
        async fn summarize(&self, _text: &str) -> lia_core::Result<String> {
            Ok("   ".to_string())
        }
    }

    struct UpperSummarizer;

    #[async_trait]
    impl Summarizer for UpperSummarizer {
        async fn summarize(&self, text: &str) -> lia_core::Result<String> {
            Ok(text.to_uppercase())
        }
    }

    fn pipeline(
        summarizer: Option<Arc<dyn Summarizer>>,
        index: Arc<FakeIndex>,
        llm: FakeLlm,
    ) -> QueryPipeline {
        QueryPipeline::new(
            summarizer,
            RelevanceGatedRetriever::new(index, 3, 0.7),
            AnswerComposer::new(Arc::new(llm)),
            FallbackResponder::new(Arc::new(|_: usize| 0)),
        )
    }

    #[tokio::test]
    async fn test_relevant_passage_is_answered() {
        let index = FakeIndex::with(vec![
            RetrievedPassage::new("Oxidação é a perda de elétrons.", 0.85).with_source("doc1.pdf")
        ]);
        let pipeline = pipeline(None, index, FakeLlm(Some(" Oxidação é perder elétrons. ")));

        let answer = pipeline.answer_query(&Query::new("O que é oxidação?", "")).await;
        assert_eq!(answer.text, "Oxidação é perder elétrons.");
        assert_eq!(answer.sources, vec!["doc1.pdf"]);
    }

    #[tokio::test]
    async fn test_empty_retrieval_falls_back() {
        let pipeline = pipeline(None, FakeIndex::with(Vec::new()), FakeLlm(Some("unused")));

        let answer = pipeline.answer_query(&Query::new("Quem foi Pedro?", "")).await;
        assert!(NO_MATCH_RESPONSES.contains(&answer.text.as_str()));
        assert!(answer.sources.is_empty());
    }

    #[tokio::test]
    async fn test_below_threshold_falls_back() {
        let index = FakeIndex::with(vec![
            RetrievedPassage::new("vago", 0.69).with_source("doc1.pdf"),
            RetrievedPassage::new("mais vago", 0.5).with_source("doc2.pdf"),
        ]);
        let pipeline = pipeline(None, index, FakeLlm(Some("unused")));

        let answer = pipeline.answer_query(&Query::new("q", "")).await;
        assert_eq!(answer.text, NO_MATCH_RESPONSES[0]);
        assert!(answer.sources.is_empty());
    }

    #[tokio::test]
    async fn test_sources_match_gated_passages() {
        let index = FakeIndex::with(vec![
            RetrievedPassage::new("a", 0.95).with_source("a.pdf"),
            RetrievedPassage::new("b", 0.80),
            RetrievedPassage::new("c", 0.60).with_source("c.pdf"),
        ]);
        let pipeline = pipeline(None, index, FakeLlm(Some("ok")));

        let answer = pipeline.answer_query(&Query::new("q", "")).await;
        assert_eq!(answer.sources, vec!["a.pdf", "Unknown"]);
    }

    #[tokio::test]
    async fn test_failing_summarizer_uses_raw_text() {
        let index = FakeIndex::with(vec![RetrievedPassage::new("p", 0.9).with_source("d.pdf")]);
        let pipeline = pipeline(
            Some(Arc::new(FailingSummarizer)),
            index.clone(),
            FakeLlm(Some("resposta")),
        );

        let answer = pipeline
            .answer_query(&Query::new("O que é oxidação?", "contexto"))
            .await;
        assert_eq!(answer.text, "resposta");
        assert_eq!(index.queries.lock().as_slice(), ["O que é oxidação?"]);
    }

    #[tokio::test]
    async fn test_blank_summary_uses_raw_text() {
        let index = FakeIndex::with(vec![RetrievedPassage::new("p", 0.9).with_source("d.pdf")]);
        let pipeline = pipeline(
            Some(Arc::new(BlankSummarizer)),
            index.clone(),
            FakeLlm(Some("resposta")),
        );

        let answer = pipeline
            .answer_query(&Query::new("O que é oxidação?", "contexto"))
            .await;
        assert_eq!(answer.text, "resposta");
        assert_eq!(answer.sources, vec!["d.pdf"]);
        assert_eq!(index.queries.lock().as_slice(), ["O que é oxidação?"]);
    }

    #[tokio::test]
    async fn test_summary_drives_retrieval() {
        let index = FakeIndex::with(Vec::new());
        let pipeline = pipeline(Some(Arc::new(UpperSummarizer)), index.clone(), FakeLlm(None));

        pipeline.answer_query(&Query::new("oxidação", "química")).await;
        assert_eq!(
            index.queries.lock().as_slice(),
            ["CONTEXT: QUÍMICA. QUERY: OXIDAÇÃO"]
        );
    }

    #[tokio::test]
    async fn test_llm_failure_becomes_apology() {
        let index = FakeIndex::with(vec![RetrievedPassage::new("p", 0.9).with_source("d.pdf")]);
        let pipeline = pipeline(None, index, FakeLlm(None));

        let answer = pipeline.answer_query(&Query::new("q", "")).await;
        assert_eq!(answer.text, APOLOGY);
        assert!(answer.sources.is_empty());
    }

    #[tokio::test]
    async fn test_index_failure_becomes_apology() {
        let pipeline = pipeline(None, FakeIndex::failing(), FakeLlm(Some("unused")));

        let answer = pipeline.answer_query(&Query::new("q", "")).await;
        assert_eq!(answer.text, APOLOGY);
        assert!(answer.sources.is_empty());
    }
}
