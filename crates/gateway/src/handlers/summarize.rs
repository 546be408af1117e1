//! Notes summarizer handler

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use studyhub_common::{
    db::Note,
    errors::{AppError, FieldErrors, Result},
    llm::DataUri,
    services::{
        summarize::{NOTES_FILE_FIELD, NOTES_TEXT_FIELD},
        SummarizeInput, SummaryOutcome, UploadedFile,
    },
};

use super::{form::FormData, record_success, ActionFailure};
use crate::AppState;

const ACTION: &str = "summarize_notes";

/// Alternative to `notesFile`: the image already encoded by the client
pub const PHOTO_DATA_URI_FIELD: &str = "photoDataUri";

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryState {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Present only when the input was an image
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note_saved: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<Note>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_errors: Option<FieldErrors>,
}

impl From<SummaryOutcome> for SummaryState {
    fn from(outcome: SummaryOutcome) -> Self {
        let image_input = outcome.note.is_some() || outcome.note_error.is_some();
        Self {
            summary: Some(outcome.summary),
            error: outcome.note_error,
            note_saved: image_input.then_some(outcome.note.is_some()),
            note: outcome.note,
            field_errors: None,
        }
    }
}

/// Summarize typed notes, an uploaded image or PDF
pub async fn summarize_notes(
    State(state): State<AppState>,
    multipart: Multipart,
) -> (StatusCode, Json<SummaryState>) {
    let result = async {
        let mut form = FormData::parse(multipart, state.config.server.max_upload_bytes).await?;
        let input = SummarizeInput {
            text: form.text(NOTES_TEXT_FIELD).map(str::to_string),
            file: match form.take_file(NOTES_FILE_FIELD).filter(|f| !f.is_empty()) {
                Some(file) => Some(file),
                None => photo_from_data_uri(form.text(PHOTO_DATA_URI_FIELD))?,
            },
        };
        state.services.summarizer.summarize(input).await
    }
    .await;

    match result {
        Ok(outcome) => {
            record_success(ACTION);
            (StatusCode::OK, Json(outcome.into()))
        }
        Err(e) => {
            let failure = ActionFailure::from_error(ACTION, e);
            (
                failure.status,
                Json(SummaryState {
                    error: Some(failure.message),
                    field_errors: failure.field_errors,
                    ..SummaryState::default()
                }),
            )
        }
    }
}

fn photo_from_data_uri(value: Option<&str>) -> Result<Option<UploadedFile>> {
    let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    let uri: DataUri = value.parse().map_err(photo_field_error)?;
    let bytes = uri.decode().map_err(photo_field_error)?;
    let file_name = format!("photo.{}", uri.extension());
    Ok(Some(UploadedFile::new(&file_name, &uri.mime_type, bytes)))
}

fn photo_field_error(err: AppError) -> AppError {
    let message = match err {
        AppError::InvalidFormat { message } => message,
        other => other.user_message(),
    };
    AppError::field(PHOTO_DATA_URI_FIELD, message)
}
