//! Vector index interface

use crate::{Result, RetrievedPassage};
use async_trait::async_trait;

/// Similarity search over a pre-indexed corpus
///
/// Implementations return at most `k` passages ordered by descending score.
/// No threshold is applied at this level.
///
/// # Example
///
/// ```ignore
/// let passages = index.similarity_search("oxidação", 3).await?;
/// for passage in passages {
///     println!("{:.2} {}", passage.score, passage.source_label());
/// }
/// ```
#[async_trait]
pub trait VectorIndex: Send + Sync + 'static {
    /// Find the `k` passages most similar to `query`
    async fn similarity_search(&self, query: &str, k: usize) -> Result<Vec<RetrievedPassage>>;

    /// Index name for logs
    fn name(&self) -> &str {
        "vector-index"
    }
}
