//! Notes gallery handlers

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};
use studyhub_common::{db::Note, errors::Result, services::notes::NOTE_FILE_FIELD};

use super::{form::FormData, FormState};
use crate::AppState;

const ACTION: &str = "add_note";

/// Upload a note image and record it in the gallery
pub async fn add_note(
    State(state): State<AppState>,
    multipart: Multipart,
) -> (StatusCode, Json<FormState>) {
    let result = async {
        let mut form = FormData::parse(multipart, state.config.server.max_upload_bytes).await?;
        state.services.notes.upload(form.take_file(NOTE_FILE_FIELD)).await
    }
    .await;

    FormState::respond(ACTION, result)
}

/// All notes, newest first
pub async fn list_notes(State(state): State<AppState>) -> Result<Json<Vec<Note>>> {
    Ok(Json(state.services.notes.list().await?))
}
