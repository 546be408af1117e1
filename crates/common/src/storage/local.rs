//! Filesystem blob store

use super::{join_url, BlobStore, Bucket, StoredObject};
use crate::errors::{AppError, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// Stores objects as files below a root directory
pub struct LocalBlobStore {
    root: PathBuf,
    public_base_url: String,
}

impl LocalBlobStore {
    /// Create the store, making sure the root directory exists
    pub async fn new(root: impl AsRef<Path>, public_base_url: &str) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&root).await.map_err(|e| AppError::Storage {
            message: format!("Cannot create storage root {}: {}", root.display(), e),
        })?;

        tracing::info!(root = %root.display(), "Local blob store ready");

        Ok(Self {
            root,
            public_base_url: public_base_url.to_string(),
        })
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn put(
        &self,
        bucket: Bucket,
        object_name: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<StoredObject> {
        let dir = self.root.join(bucket.as_str());
        tokio::fs::create_dir_all(&dir).await?;

        let path = dir.join(object_name);
        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|e| AppError::Storage {
                message: format!("Cannot create {}: {}", path.display(), e),
            })?;
        file.write_all(bytes).await?;
        file.flush().await?;

        let full_path = format!("{}/{}", bucket, object_name);
        tracing::debug!(
            path = %full_path,
            bytes = bytes.len(),
            content_type = content_type,
            "Object written"
        );

        Ok(StoredObject {
            download_url: join_url(&self.public_base_url, &full_path),
            full_path,
        })
    }

    async fn ping(&self) -> Result<()> {
        let meta = tokio::fs::metadata(&self.root).await?;
        if meta.permissions().readonly() {
            return Err(AppError::Storage {
                message: format!("{} is read-only", self.root.display()),
            });
        }
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "local"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_writes_identical_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path(), "http://localhost:8080/files")
            .await
            .unwrap();

        let bytes = b"\x89PNG\r\n\x1a\nfake".to_vec();
        let stored = store
            .put(Bucket::Notes, "1-abcd1234-page.png", &bytes, "image/png")
            .await
            .unwrap();

        assert_eq!(stored.full_path, "notes/1-abcd1234-page.png");
        assert_eq!(
            stored.download_url,
            "http://localhost:8080/files/notes/1-abcd1234-page.png"
        );
        let on_disk = std::fs::read(dir.path().join("notes/1-abcd1234-page.png")).unwrap();
        assert_eq!(on_disk, bytes);
    }

    #[tokio::test]
    async fn test_put_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path(), "http://h/files").await.unwrap();

        store.put(Bucket::Books, "same.pdf", b"one", "application/pdf").await.unwrap();
        let second = store.put(Bucket::Books, "same.pdf", b"two", "application/pdf").await;

        assert!(matches!(second, Err(AppError::Storage { .. })));
        assert_eq!(std::fs::read(dir.path().join("books/same.pdf")).unwrap(), b"one");
    }
}
