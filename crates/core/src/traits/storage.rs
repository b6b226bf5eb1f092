use crate::Result;
use async_trait::async_trait;
use std::path::Path;

/// Object storage for published audio
#[async_trait]
pub trait ObjectStorage: Send + Sync + 'static {
    /// Upload `file` under `key`, make it publicly readable and return its URL
    async fn upload(&self, file: &Path, key: &str, content_type: &str) -> Result<String>;
}
