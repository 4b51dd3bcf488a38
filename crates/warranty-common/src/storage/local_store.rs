//! Local filesystem file store
//!
//! Stores uploads under a configured directory with uuid-prefixed
//! filenames. Rows reference the returned path; the store never deletes.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use uuid::Uuid;
use warranty_core::{DomainError, FileStore, RepoResult};

/// File store writing to a local upload directory
#[derive(Debug, Clone)]
pub struct LocalFileStore {
    upload_dir: PathBuf,
}

impl LocalFileStore {
    /// Create a store rooted at the given directory
    #[must_use]
    pub fn new(upload_dir: impl Into<PathBuf>) -> Self {
        Self {
            upload_dir: upload_dir.into(),
        }
    }

    /// Create the upload directory if it does not exist yet
    ///
    /// # Errors
    /// Returns a storage error if the directory cannot be created
    pub async fn ensure_dir(&self) -> RepoResult<()> {
        tokio::fs::create_dir_all(&self.upload_dir)
            .await
            .map_err(|e| DomainError::StorageError(format!("Failed to create upload dir: {e}")))
    }

    /// Unique on-disk filename preserving the original extension
    fn disk_name(original_filename: &str) -> String {
        let ext = Path::new(original_filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);

        match ext {
            Some(ext) if !ext.is_empty() => format!("{}.{ext}", Uuid::new_v4()),
            _ => Uuid::new_v4().to_string(),
        }
    }
}

#[async_trait]
impl FileStore for LocalFileStore {
    async fn store(&self, original_filename: &str, bytes: &[u8]) -> RepoResult<String> {
        let path = self.upload_dir.join(Self::disk_name(original_filename));

        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| DomainError::StorageError(format!("Failed to write upload: {e}")))?;

        Ok(path.to_string_lossy().into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disk_name_keeps_extension() {
        let name = LocalFileStore::disk_name("Invoice Scan.JPG");
        assert!(name.ends_with(".jpg"));
        assert_eq!(name.len(), 36 + 4);
    }

    #[test]
    fn test_disk_name_without_extension() {
        let name = LocalFileStore::disk_name("invoice");
        assert_eq!(name.len(), 36);
    }

    #[test]
    fn test_disk_names_are_unique() {
        assert_ne!(
            LocalFileStore::disk_name("a.png"),
            LocalFileStore::disk_name("a.png")
        );
    }

    #[tokio::test]
    async fn test_store_writes_file() {
        let dir = std::env::temp_dir().join(format!("warranty-store-{}", Uuid::new_v4()));
        let store = LocalFileStore::new(&dir);
        store.ensure_dir().await.unwrap();

        let path = store.store("label.png", b"label bytes").await.unwrap();
        let written = tokio::fs::read(&path).await.unwrap();
        assert_eq!(written, b"label bytes");

        tokio::fs::remove_dir_all(&dir).await.ok();
    }
}
