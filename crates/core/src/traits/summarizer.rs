use crate::Result;
use async_trait::async_trait;

/// Compresses free text into a short search string
///
/// Failures are expected and tolerated by callers; the text pipeline falls
/// back to the raw question.
#[async_trait]
pub trait Summarizer: Send + Sync + 'static {
    async fn summarize(&self, text: &str) -> Result<String>;
}
