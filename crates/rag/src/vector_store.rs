//! Vector Store using Qdrant
//!
//! Read-only access: the corpus is indexed by a separate batch job.

use std::collections::HashMap;

use lia_config::constants::{endpoints, retrieval};
use qdrant_client::{
    qdrant::{SearchPointsBuilder, Value},
    Qdrant,
};

use crate::RagError;

/// Vector store configuration
#[derive(Debug, Clone)]
pub struct VectorStoreConfig {
    /// Qdrant endpoint
    pub endpoint: String,
    pub collection: String,
    /// API key (optional)
    pub api_key: Option<String>,
}

impl Default for VectorStoreConfig {
    fn default() -> Self {
        Self {
            endpoint: endpoints::QDRANT_DEFAULT.to_string(),
            collection: retrieval::COLLECTION.to_string(),
            api_key: None,
        }
    }
}

/// Search hit with its raw payload
#[derive(Debug, Clone)]
pub struct VectorSearchResult {
    pub score: f32,
    pub payload: HashMap<String, Value>,
}

/// Vector store client
pub struct VectorStore {
    client: Qdrant,
    config: VectorStoreConfig,
}

impl VectorStore {
    /// Create a new vector store connection
    pub fn new(config: VectorStoreConfig) -> Result<Self, RagError> {
        let mut builder = Qdrant::from_url(&config.endpoint);

        if let Some(ref api_key) = config.api_key {
            builder = builder.api_key(api_key.clone());
            tracing::info!("Qdrant connection using API key authentication");
        }

        let client = builder
            .build()
            .map_err(|e| RagError::Connection(e.to_string()))?;

        Ok(Self { client, config })
    }

    pub fn collection(&self) -> &str {
        &self.config.collection
    }

    /// Search by vector, highest score first
    pub async fn search(
        &self,
        query_embedding: Vec<f32>,
        top_k: usize,
    ) -> Result<Vec<VectorSearchResult>, RagError> {
        let request =
            SearchPointsBuilder::new(&self.config.collection, query_embedding, top_k as u64)
                .with_payload(true);

        let results = self
            .client
            .search_points(request)
            .await
            .map_err(|e| RagError::Search(e.to_string()))?;

        Ok(results
            .result
            .into_iter()
            .map(|point| VectorSearchResult {
                score: point.score,
                payload: point.payload,
            })
            .collect())
    }
}
