//! Passage retrieval
//!
//! [`QdrantIndex`] adapts the embedder and vector store to the core
//! [`VectorIndex`] trait. [`RelevanceGatedRetriever`] sits on top of any
//! index and keeps only passages whose score clears the threshold.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use lia_core::{Result, RetrievedPassage, VectorIndex};
use qdrant_client::qdrant::{value::Kind, Value};

use crate::embeddings::Embedder;
use crate::vector_store::VectorStore;

/// Payload keys that may hold the passage text
const CONTENT_KEYS: [&str; 2] = ["text", "page_content"];

/// Payload key for the originating document
const SOURCE_KEY: &str = "source";

/// Nested metadata object written by common ingestion tools
const METADATA_KEY: &str = "metadata";

/// Build a passage from a Qdrant payload
///
/// The source is looked up at the top level first, then inside a nested
/// `metadata` object.
pub fn passage_from_payload(payload: &HashMap<String, Value>, score: f32) -> RetrievedPassage {
    let content = CONTENT_KEYS
        .iter()
        .find_map(|key| payload.get(*key).and_then(string_value))
        .unwrap_or_default();

    let source = payload.get(SOURCE_KEY).and_then(string_value).or_else(|| {
        payload.get(METADATA_KEY).and_then(|meta| match &meta.kind {
            Some(Kind::StructValue(s)) => s.fields.get(SOURCE_KEY).and_then(string_value),
            _ => None,
        })
    });

    let passage = RetrievedPassage::new(content, score);
    match source {
        Some(source) => passage.with_source(source),
        None => passage,
    }
}

fn string_value(value: &Value) -> Option<String> {
    match &value.kind {
        Some(Kind::StringValue(s)) => Some(s.clone()),
        _ => None,
    }
}

/// Qdrant-backed similarity index
pub struct QdrantIndex {
    embedder: Arc<dyn Embedder>,
    store: VectorStore,
}

impl QdrantIndex {
    pub fn new(embedder: Arc<dyn Embedder>, store: VectorStore) -> Self {
        Self { embedder, store }
    }
}

#[async_trait]
impl VectorIndex for QdrantIndex {
    async fn similarity_search(&self, query: &str, k: usize) -> Result<Vec<RetrievedPassage>> {
        let embedding = self.embedder.embed_query(query).await?;
        let hits = self.store.search(embedding, k).await?;

        Ok(hits
            .iter()
            .map(|hit| passage_from_payload(&hit.payload, hit.score))
            .collect())
    }

    fn name(&self) -> &str {
        self.store.collection()
    }
}

/// Top-K retrieval with a relevance floor
pub struct RelevanceGatedRetriever {
    index: Arc<dyn VectorIndex>,
    top_k: usize,
    threshold: f32,
}

impl RelevanceGatedRetriever {
    pub fn new(index: Arc<dyn VectorIndex>, top_k: usize, threshold: f32) -> Self {
        Self {
            index,
            top_k,
            threshold,
        }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Up to `top_k` passages scoring at least `threshold`, in index order
    pub async fn retrieve(&self, query: &str) -> Result<Vec<RetrievedPassage>> {
        let candidates = self.index.similarity_search(query, self.top_k).await?;
        let total = candidates.len();

        let kept: Vec<RetrievedPassage> = candidates
            .into_iter()
            .take(self.top_k)
            .filter(|p| p.score >= self.threshold)
            .collect();

        tracing::debug!(
            index = self.index.name(),
            candidates = total,
            kept = kept.len(),
            threshold = self.threshold,
            "Relevance gate applied"
        );

        Ok(kept)
    }
}
