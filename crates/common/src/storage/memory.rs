//! In-process blob store

use super::{join_url, BlobStore, Bucket, StoredObject};
use crate::errors::{AppError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::RwLock;

/// A stored object with its declared content type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryObject {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// Blob store backed by a map of full path to bytes
pub struct MemoryBlobStore {
    public_base_url: String,
    objects: RwLock<HashMap<String, MemoryObject>>,
    calls: AtomicUsize,
    unavailable: AtomicBool,
}

impl MemoryBlobStore {
    pub fn new(public_base_url: &str) -> Self {
        Self {
            public_base_url: public_base_url.to_string(),
            objects: RwLock::new(HashMap::new()),
            calls: AtomicUsize::new(0),
            unavailable: AtomicBool::new(false),
        }
    }

    /// Fetch an object by full path
    pub async fn get(&self, full_path: &str) -> Option<MemoryObject> {
        self.objects.read().await.get(full_path).cloned()
    }

    /// Resolve a download URL produced by this store
    pub async fn resolve(&self, download_url: &str) -> Option<MemoryObject> {
        let prefix = format!("{}/", self.public_base_url.trim_end_matches('/'));
        let full_path = download_url.strip_prefix(&prefix)?;
        self.get(full_path).await
    }

    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }

    /// Number of `put` calls attempted so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Make every subsequent `put` fail
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(
        &self,
        bucket: Bucket,
        object_name: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<StoredObject> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AppError::Storage {
                message: "blob store unavailable".to_string(),
            });
        }

        let full_path = format!("{}/{}", bucket, object_name);
        let mut objects = self.objects.write().await;
        if objects.contains_key(&full_path) {
            return Err(AppError::Storage {
                message: format!("Object already exists: {}", full_path),
            });
        }
        objects.insert(
            full_path.clone(),
            MemoryObject {
                bytes: bytes.to_vec(),
                content_type: content_type.to_string(),
            },
        );

        Ok(StoredObject {
            download_url: join_url(&self.public_base_url, &full_path),
            full_path,
        })
    }

    async fn ping(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AppError::Storage {
                message: "blob store unavailable".to_string(),
            });
        }
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
