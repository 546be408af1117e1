//! Notes summarizer
//!
//! Text, an image, or a PDF goes through the fixed summarizer prompt.
//! Binary input is sent as a data URI. After a successful summary an image
//! input is also saved as a note; text and PDFs are never persisted.

use super::{non_empty, NoteService, UploadedFile};
use crate::db::Note;
use crate::errors::{AppError, Result};
use crate::llm::{permissive_safety_settings, DataUri, GenerateRequest, LanguageModel};
use crate::prompts::{summarize_notes_prompt, SUMMARIZE_NOTES};
use std::sync::Arc;

pub const NOTES_TEXT_FIELD: &str = "notesText";
pub const NOTES_FILE_FIELD: &str = "notesFile";

#[derive(Debug, Clone, Default)]
pub struct SummarizeInput {
    pub text: Option<String>,
    pub file: Option<UploadedFile>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryOutcome {
    pub summary: String,
    /// The note created from an image input
    pub note: Option<Note>,
    /// Why an image input could not be saved
    pub note_error: Option<String>,
}

pub struct SummarizeService {
    model: Arc<dyn LanguageModel>,
    notes: Arc<NoteService>,
}

impl SummarizeService {
    pub fn new(model: Arc<dyn LanguageModel>, notes: Arc<NoteService>) -> Self {
        Self { model, notes }
    }

    pub async fn summarize(&self, input: SummarizeInput) -> Result<SummaryOutcome> {
        let text = input
            .text
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        let file = non_empty(input.file);

        if text.is_none() && file.is_none() {
            return Err(AppError::field(
                NOTES_TEXT_FIELD,
                "Please enter some notes or upload a file to summarize.",
            ));
        }
        if let Some(f) = &file {
            if !f.is_image() && !f.is_pdf() {
                return Err(AppError::field(
                    NOTES_FILE_FIELD,
                    "Only image or PDF files are allowed.",
                ));
            }
        }

        let media = file.as_ref().map(|f| DataUri::encode(&f.mime(), &f.bytes));
        let request = GenerateRequest::text(
            SUMMARIZE_NOTES,
            summarize_notes_prompt(text.as_deref(), media.as_ref()),
        )
        .with_safety(permissive_safety_settings());

        let summary = self
            .model
            .generate(request)
            .await?
            .filter(|s| !s.trim().is_empty())
            .ok_or(AppError::NoModelOutput)?;

        let mut outcome = SummaryOutcome {
            summary,
            note: None,
            note_error: None,
        };

        if let Some(image) = file.filter(UploadedFile::is_image) {
            match self.notes.save_image(&image).await {
                Ok(note) => outcome.note = Some(note),
                Err(e) => {
                    tracing::warn!(error = %e, "Summary produced but source image not saved");
                    outcome.note_error = Some(e.user_message());
                }
            }
        }

        tracing::info!(
            summary_chars = outcome.summary.chars().count(),
            note_saved = outcome.note.is_some(),
            "Notes summarized"
        );

        Ok(outcome)
    }
}
