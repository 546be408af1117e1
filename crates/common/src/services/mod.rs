//! Request pipelines behind the form actions
//!
//! Every service receives its collaborators as trait objects, so the
//! gateway wires real clients and tests wire in-memory fakes.

use crate::db::DocumentStore;
use crate::llm::LanguageModel;
use crate::storage::BlobStore;
use std::sync::Arc;

pub mod books;
pub mod notes;
pub mod questions;
pub mod summarize;

pub use books::{BookForm, BookService};
pub use notes::NoteService;
pub use questions::QuestionService;
pub use summarize::{SummarizeInput, SummarizeService, SummaryOutcome};

pub const PDF_MIME: &str = "application/pdf";

/// A file received in a form submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(file_name: &str, content_type: &str, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.to_string(),
            content_type: content_type.to_string(),
            bytes,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Media type without parameters, lowercased
    pub fn mime(&self) -> String {
        self.content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase()
    }

    pub fn is_image(&self) -> bool {
        self.mime().starts_with("image/")
    }

    pub fn is_pdf(&self) -> bool {
        self.mime() == PDF_MIME
    }
}

/// Drop a file that was submitted without content
pub(crate) fn non_empty(file: Option<UploadedFile>) -> Option<UploadedFile> {
    file.filter(|f| !f.is_empty())
}

// A container for all services to be injected into routes
#[derive(Clone)]
pub struct Services {
    pub notes: Arc<NoteService>,
    pub books: Arc<BookService>,
    pub summarizer: Arc<SummarizeService>,
    pub questions: Arc<QuestionService>,
}

impl Services {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        blobs: Arc<dyn BlobStore>,
        model: Arc<dyn LanguageModel>,
    ) -> Self {
        let notes = Arc::new(NoteService::new(store.clone(), blobs.clone()));

        Self {
            books: Arc::new(BookService::new(store, blobs)),
            summarizer: Arc::new(SummarizeService::new(model.clone(), notes.clone())),
            questions: Arc::new(QuestionService::new(model)),
            notes,
        }
    }
}
