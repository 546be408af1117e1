//! Blob storage for uploaded files
//!
//! Objects live under `<bucket>/<object name>` and are addressed by a
//! durable download URL. Backends:
//! - [`LocalBlobStore`]: files on disk, served back by the gateway
//! - [`MemoryBlobStore`]: in-process map for tests

mod local;
mod memory;

pub use local::LocalBlobStore;
pub use memory::MemoryBlobStore;

use crate::config::StorageConfig;
use crate::errors::{AppError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use regex_lite::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::{Arc, OnceLock};
use uuid::Uuid;

/// Longest sanitised file name kept in an object name
const MAX_NAME_LEN: usize = 120;

/// Logical bucket an upload is namespaced under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Bucket {
    Notes,
    Books,
}

impl Bucket {
    pub fn as_str(&self) -> &'static str {
        match self {
            Bucket::Notes => "notes",
            Bucket::Books => "books",
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Location of a stored object
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredObject {
    /// `<bucket>/<object name>`
    pub full_path: String,
    /// Publicly resolvable URL of the object
    pub download_url: String,
}

/// Binary object storage
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `bytes` as `<bucket>/<object_name>`; never overwrites
    async fn put(
        &self,
        bucket: Bucket,
        object_name: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<StoredObject>;

    /// Check the store is writable
    async fn ping(&self) -> Result<()>;

    /// Backend name for logs and readiness output
    fn backend(&self) -> &'static str;
}

fn unsafe_chars() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[^A-Za-z0-9._-]+").expect("valid object name pattern"))
}

/// Reduce a client-supplied file name to a single safe path segment
pub fn sanitize_file_name(original: &str) -> String {
    let base = original.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned = unsafe_chars().replace_all(base.trim(), "_");
    let cleaned = cleaned.trim_start_matches('.');

    let mut name: String = cleaned.chars().take(MAX_NAME_LEN).collect();
    if name.is_empty() || name.chars().all(|c| c == '_') {
        name = "upload".to_string();
    }
    name
}

/// Collision-avoiding object name: `<unix millis>-<8 hex>-<file name>`
pub fn object_name_for(original: &str, now: DateTime<Utc>) -> String {
    let nonce = Uuid::new_v4().simple().to_string();
    format!(
        "{}-{}-{}",
        now.timestamp_millis(),
        &nonce[..8],
        sanitize_file_name(original)
    )
}

pub(crate) fn join_url(base: &str, full_path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), full_path)
}

/// Build the blob store selected by configuration
pub async fn create_blob_store(config: &StorageConfig) -> Result<Arc<dyn BlobStore>> {
    match config.backend.as_str() {
        "local" => {
            let store = LocalBlobStore::new(&config.root_dir, &config.public_base_url).await?;
            Ok(Arc::new(store))
        }
        "memory" => Ok(Arc::new(MemoryBlobStore::new(&config.public_base_url))),
        other => Err(AppError::Configuration {
            message: format!("Unknown storage backend: {}", other),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_sanitize_strips_directories_and_symbols() {
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("C:\\Users\\me\\week 3 notes.png"), "week_3_notes.png");
        assert_eq!(sanitize_file_name(".hidden.jpg"), "hidden.jpg");
        assert_eq!(sanitize_file_name("   "), "upload");
        assert_eq!(sanitize_file_name("???"), "upload");
    }

    #[test]
    fn test_object_name_has_timestamp_prefix() {
        let now = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        let name = object_name_for("board.jpg", now);

        let parts: Vec<&str> = name.splitn(3, '-').collect();
        assert_eq!(parts[0], "1700000000123");
        assert_eq!(parts[1].len(), 8);
        assert_eq!(parts[2], "board.jpg");
    }

    #[test]
    fn test_same_file_same_instant_gets_distinct_names() {
        let now = Utc::now();
        assert_ne!(object_name_for("a.png", now), object_name_for("a.png", now));
    }

    #[test]
    fn test_join_url_trims_slash() {
        assert_eq!(join_url("http://host/files/", "notes/x.png"), "http://host/files/notes/x.png");
    }
}
