//! Filesystem-backed asset storage, one directory per category.
//!
//! The directory tree is the only persistence layer: no metadata index is
//! kept, so every listing reflects the filesystem at call time. Assets are
//! addressed by (category, filename) and the stored filename is the uploaded
//! name verbatim - writing the same name twice overwrites the prior file.

use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::errors::{Error, Result};

/// Reject names that are not a bare directory entry. Category and file names
/// are joined onto the data root, so anything that could traverse out of its
/// directory is refused.
pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\', '\0']) {
        return Err(Error::BadRequest {
            message: format!("invalid name {name:?}"),
        });
    }
    Ok(())
}

/// Directory-per-category image store.
pub struct AssetStore {
    root: PathBuf,
}

impl AssetStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn category_dir(&self, category: &str) -> PathBuf {
        self.root.join(category)
    }

    fn asset_path(&self, category: &str, filename: &str) -> PathBuf {
        self.category_dir(category).join(filename)
    }

    /// Whether the category's directory exists.
    pub async fn exists(&self, category: &str) -> bool {
        if validate_name(category).is_err() {
            return false;
        }
        fs::metadata(self.category_dir(category))
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false)
    }

    /// Whether the asset file exists.
    pub async fn contains(&self, category: &str, filename: &str) -> bool {
        if validate_name(category).is_err() || validate_name(filename).is_err() {
            return false;
        }
        fs::metadata(self.asset_path(category, filename))
            .await
            .map(|m| m.is_file())
            .unwrap_or(false)
    }

    /// List stored filenames in directory order (not sorted, but stable while
    /// the directory is unchanged). Hidden entries are skipped: in-flight
    /// writes live in the same directory under dotted temp names.
    pub async fn list(&self, category: &str) -> Result<Vec<String>> {
        validate_name(category)?;
        let dir = self.category_dir(category);
        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::CategoryNotFound {
                    category: category.to_string(),
                });
            }
            Err(e) => return Err(e.into()),
        };

        let mut filenames = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if name.starts_with('.') {
                continue;
            }
            if entry.file_type().await?.is_file() {
                filenames.push(name.to_string());
            }
        }
        Ok(filenames)
    }

    /// Write an asset, overwriting any previous file under the same name.
    ///
    /// Bytes land in a hidden temp file in the destination directory and are
    /// renamed into place after an fsync, so a concurrent reader observes
    /// either the old content or the new content, never a torn write. The
    /// category directory is created lazily on first write.
    pub async fn write(&self, category: &str, filename: &str, bytes: &[u8]) -> Result<()> {
        validate_name(category)?;
        validate_name(filename)?;
        let dir = self.category_dir(category);
        fs::create_dir_all(&dir).await?;

        let tmp = dir.join(format!(".{}.tmp", Uuid::new_v4()));
        let result = write_and_rename(&tmp, &self.asset_path(category, filename), bytes).await;
        if result.is_err() {
            if let Err(e) = fs::remove_file(&tmp).await {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!(path = %tmp.display(), error = %e, "Failed to remove temp file after write error");
                }
            }
        }
        result
    }

    /// Remove an asset file. Deleting an absent file reports `AssetNotFound`,
    /// including on the second of two consecutive deletes.
    pub async fn delete(&self, category: &str, filename: &str) -> Result<()> {
        validate_name(category)?;
        validate_name(filename)?;
        match fs::remove_file(self.asset_path(category, filename)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(Error::AssetNotFound {
                category: category.to_string(),
                filename: filename.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    /// Read an asset's stored bytes.
    pub async fn read(&self, category: &str, filename: &str) -> Result<Vec<u8>> {
        validate_name(category)?;
        validate_name(filename)?;
        match fs::read(self.asset_path(category, filename)).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(Error::AssetNotFound {
                category: category.to_string(),
                filename: filename.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }
}

async fn write_and_rename(tmp: &Path, dest: &Path, bytes: &[u8]) -> Result<()> {
    let mut file = fs::File::create(tmp).await?;
    file.write_all(bytes).await?;
    file.sync_all().await?;
    drop(file);
    fs::rename(tmp, dest).await?;
    Ok(())
}
