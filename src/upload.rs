//! Ephemeral spool files for in-flight uploads.

use std::path::{Path, PathBuf};

use tokio::fs;
use uuid::Uuid;

use crate::errors::Result;

/// One upload's transient spool file, owned exclusively by a single
/// ingestion call.
///
/// The file is removed when the value drops, whatever path the call exits
/// through. Cleanup is best-effort: a failed removal is logged and never
/// replaces the ingestion result.
#[derive(Debug)]
pub struct EphemeralUpload {
    path: PathBuf,
    original_filename: String,
}

impl EphemeralUpload {
    /// Materialize upload bytes as a spool file under `spool_dir`.
    pub async fn spool(spool_dir: &Path, original_filename: &str, bytes: &[u8]) -> Result<Self> {
        fs::create_dir_all(spool_dir).await?;
        let path = spool_dir.join(Uuid::new_v4().to_string());
        fs::write(&path, bytes).await?;
        Ok(Self {
            path,
            original_filename: original_filename.to_string(),
        })
    }

    /// Adopt an existing temp file. The upload takes ownership: the file is
    /// removed when this value drops.
    pub fn from_parts(path: PathBuf, original_filename: impl Into<String>) -> Self {
        Self {
            path,
            original_filename: original_filename.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn original_filename(&self) -> &str {
        &self.original_filename
    }

    pub async fn read(&self) -> std::io::Result<Vec<u8>> {
        fs::read(&self.path).await
    }
}

impl Drop for EphemeralUpload {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path)
            && e.kind() != std::io::ErrorKind::NotFound
        {
            tracing::warn!(path = %self.path.display(), error = %e, "Failed to remove spooled upload");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn spool_writes_and_drop_removes() {
        let dir = tempfile::tempdir().unwrap();

        let upload = EphemeralUpload::spool(dir.path(), "photo.png", b"bytes")
            .await
            .unwrap();
        let path = upload.path().to_path_buf();

        assert!(path.exists());
        assert_eq!(upload.original_filename(), "photo.png");
        assert_eq!(upload.read().await.unwrap(), b"bytes");

        drop(upload);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn from_parts_takes_ownership() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("spooled");
        std::fs::write(&path, b"bytes").unwrap();

        let upload = EphemeralUpload::from_parts(path.clone(), "photo.png");
        drop(upload);

        assert!(!path.exists());
    }
}
