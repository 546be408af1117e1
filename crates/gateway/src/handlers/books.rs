//! Book catalog handlers

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};
use studyhub_common::{
    db::BookResource,
    errors::Result,
    services::{books::PDF_FILE_FIELD, BookForm},
};

use super::{form::FormData, FormState};
use crate::AppState;

const ACTION: &str = "add_book";

/// Add a catalog entry with an optional PDF
pub async fn add_book(
    State(state): State<AppState>,
    multipart: Multipart,
) -> (StatusCode, Json<FormState>) {
    let result = async {
        let mut form = FormData::parse(multipart, state.config.server.max_upload_bytes).await?;
        let book = BookForm {
            title: form.text_or_empty("title"),
            subject: form.text_or_empty("subject"),
            description: form.text_or_empty("description"),
            pdf_file: form.take_file(PDF_FILE_FIELD),
        };
        state.services.books.add(book).await
    }
    .await;

    FormState::respond(ACTION, result)
}

/// Catalog entries in insertion order
pub async fn list_books(State(state): State<AppState>) -> Result<Json<Vec<BookResource>>> {
    Ok(Json(state.services.books.list().await?))
}
