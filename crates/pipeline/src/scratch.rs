//! Scoped scratch files
//!
//! Every intermediate audio artifact is a [`NamedTempFile`]; the file is
//! removed when the value is dropped, including on error paths.

use std::io;
use std::path::{Path, PathBuf};

use tempfile::{Builder, NamedTempFile};

/// Directory that hosts per-request temp files
#[derive(Debug, Clone)]
pub struct ScratchDir {
    root: PathBuf,
}

impl Default for ScratchDir {
    fn default() -> Self {
        Self {
            root: std::env::temp_dir(),
        }
    }
}

impl ScratchDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Use `root` when configured, the system temp dir otherwise
    pub fn from_config(root: Option<&str>) -> Self {
        match root {
            Some(dir) if !dir.trim().is_empty() => Self::new(dir),
            _ => Self::default(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Create an empty temp file ending in `suffix` (e.g. `.wav`)
    pub fn create(&self, suffix: &str) -> io::Result<NamedTempFile> {
        Builder::new()
            .prefix("lia-")
            .suffix(suffix)
            .tempfile_in(&self.root)
    }

    /// Create a temp file holding `bytes`
    pub async fn write(&self, suffix: &str, bytes: &[u8]) -> io::Result<NamedTempFile> {
        let file = self.create(suffix)?;
        tokio::fs::write(file.path(), bytes).await?;
        Ok(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_file_removed_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let scratch = ScratchDir::new(dir.path());

        let file = scratch.write(".ogg", b"OggS").await.unwrap();
        let path = file.path().to_path_buf();
        assert!(path.exists());
        assert_eq!(path.extension().unwrap(), "ogg");
        assert!(path.starts_with(dir.path()));

        drop(file);
        assert!(!path.exists());
    }

    #[test]
    fn test_from_config() {
        assert_eq!(ScratchDir::from_config(None).path(), std::env::temp_dir());
        assert_eq!(ScratchDir::from_config(Some("  ")).path(), std::env::temp_dir());
        assert_eq!(
            ScratchDir::from_config(Some("/var/tmp/lia")).path(),
            Path::new("/var/tmp/lia")
        );
    }
}
