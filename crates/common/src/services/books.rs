//! Book catalog submissions
//!
//! An optional PDF is uploaded to the `books` bucket first and its URL is
//! threaded into the new catalog entry.

use super::{non_empty, UploadedFile};
use crate::db::{BookResource, DocumentStore, NewBook};
use crate::errors::{field_errors_from, AppError, Result};
use crate::metrics;
use crate::storage::{object_name_for, BlobStore, Bucket};
use chrono::Utc;
use std::sync::Arc;
use validator::Validate;

pub const PDF_FILE_FIELD: &str = "pdfFile";

/// Book form as submitted
#[derive(Debug, Clone, Default, Validate)]
pub struct BookForm {
    #[validate(length(min = 1, message = "Title is required."))]
    pub title: String,

    #[validate(length(min = 1, message = "Subject is required."))]
    pub subject: String,

    #[validate(length(min = 1, message = "Description is required."))]
    pub description: String,

    pub pdf_file: Option<UploadedFile>,
}

impl BookForm {
    fn normalized(self) -> Self {
        Self {
            title: self.title.trim().to_string(),
            subject: self.subject.trim().to_string(),
            description: self.description.trim().to_string(),
            pdf_file: non_empty(self.pdf_file),
        }
    }
}

pub struct BookService {
    store: Arc<dyn DocumentStore>,
    blobs: Arc<dyn BlobStore>,
}

impl BookService {
    pub fn new(store: Arc<dyn DocumentStore>, blobs: Arc<dyn BlobStore>) -> Self {
        Self { store, blobs }
    }

    /// Validate the form, upload the PDF if any, and append the entry
    pub async fn add(&self, form: BookForm) -> Result<BookResource> {
        let form = form.normalized();

        let mut fields = match form.validate() {
            Ok(()) => Default::default(),
            Err(e) => field_errors_from(&e),
        };
        if form.pdf_file.as_ref().is_some_and(|f| !f.is_pdf()) {
            fields.insert(
                PDF_FILE_FIELD.to_string(),
                vec!["Only PDF files are allowed.".to_string()],
            );
        }
        if !fields.is_empty() {
            return Err(AppError::InvalidFields { fields });
        }

        let pdf_url = match &form.pdf_file {
            Some(pdf) => {
                let object_name = object_name_for(&pdf.file_name, Utc::now());
                let stored = self
                    .blobs
                    .put(Bucket::Books, &object_name, &pdf.bytes, &pdf.mime())
                    .await?;
                metrics::record_upload(Bucket::Books.as_str(), pdf.bytes.len());
                Some(stored.download_url)
            }
            None => None,
        };

        let book = self
            .store
            .add_book(NewBook {
                title: form.title,
                subject: form.subject,
                description: form.description,
                pdf_url,
            })
            .await?;
        metrics::record_document_write("books");

        tracing::info!(
            book_id = %book.id,
            title = %book.title,
            has_pdf = book.link != crate::db::NO_ATTACHMENT_LINK,
            "Book added"
        );

        Ok(book)
    }

    /// All catalog entries in insertion order
    pub async fn list(&self) -> Result<Vec<BookResource>> {
        self.store.list_books().await
    }
}
