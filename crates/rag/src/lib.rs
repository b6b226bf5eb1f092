//! Retrieval layer
//!
//! - Query embeddings through an OpenAI-compatible `/embeddings` endpoint
//! - Dense similarity search over a Qdrant collection
//! - Relevance gate that drops passages below the configured threshold

pub mod embeddings;
pub mod retriever;
pub mod vector_store;

pub use embeddings::{Embedder, OpenAIEmbedder, OpenAIEmbeddingConfig};
pub use retriever::{passage_from_payload, QdrantIndex, RelevanceGatedRetriever};
pub use vector_store::{VectorSearchResult, VectorStore, VectorStoreConfig};

use thiserror::Error;

/// RAG errors
#[derive(Error, Debug)]
pub enum RagError {
    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Search error: {0}")]
    Search(String),

    #[error("Connection error: {0}")]
    Connection(String),
}

impl From<RagError> for lia_core::Error {
    fn from(err: RagError) -> Self {
        lia_core::Error::Retrieval(err.to_string())
    }
}
