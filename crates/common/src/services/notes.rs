//! Upload-and-persist pipeline for note images
//!
//! 1. Validate the file (non-empty, `image/*`)
//! 2. Write the bytes to the `notes` bucket
//! 3. Append a record pointing at the download URL
//!
//! The two writes are independent: if step 3 fails the object from step 2
//! stays in the bucket with nothing referencing it.

use super::UploadedFile;
use crate::db::{DocumentStore, Note};
use crate::errors::{AppError, Result};
use crate::metrics;
use crate::storage::{object_name_for, BlobStore, Bucket};
use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;

pub const NOTE_FILE_FIELD: &str = "noteFile";

pub struct NoteService {
    store: Arc<dyn DocumentStore>,
    blobs: Arc<dyn BlobStore>,
}

impl NoteService {
    pub fn new(store: Arc<dyn DocumentStore>, blobs: Arc<dyn BlobStore>) -> Self {
        Self { store, blobs }
    }

    /// Validate and save one image as a note
    pub async fn upload(&self, file: Option<UploadedFile>) -> Result<Note> {
        let file = validate_note_image(file)?;
        self.save_image(&file).await
    }

    /// All notes, newest first
    pub async fn list(&self) -> Result<Vec<Note>> {
        self.store.list_notes().await
    }

    /// Store an already validated image and record it
    pub(crate) async fn save_image(&self, file: &UploadedFile) -> Result<Note> {
        let start = Instant::now();
        let object_name = object_name_for(&file.file_name, Utc::now());

        let stored = self
            .blobs
            .put(Bucket::Notes, &object_name, &file.bytes, &file.mime())
            .await?;
        metrics::record_upload(Bucket::Notes.as_str(), file.bytes.len());

        let note = match self.store.add_note(stored.download_url.clone()).await {
            Ok(note) => note,
            Err(e) => {
                tracing::warn!(
                    path = %stored.full_path,
                    error = %e,
                    "Note record not written; uploaded object is unreferenced"
                );
                return Err(e);
            }
        };
        metrics::record_document_write("notes");

        tracing::info!(
            note_id = %note.id,
            path = %stored.full_path,
            bytes = file.bytes.len(),
            total_ms = start.elapsed().as_millis() as u64,
            "Note saved"
        );

        Ok(note)
    }
}

/// Accept only a non-empty image
pub fn validate_note_image(file: Option<UploadedFile>) -> Result<UploadedFile> {
    let file = match file {
        Some(f) if !f.is_empty() => f,
        _ => return Err(AppError::field(NOTE_FILE_FIELD, "Image is required.")),
    };
    if !file.is_image() {
        return Err(AppError::field(NOTE_FILE_FIELD, "Only image files are allowed."));
    }
    Ok(file)
}
