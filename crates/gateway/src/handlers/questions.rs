//! Important-questions handler

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use studyhub_common::{errors::FieldErrors, services::questions::MATERIAL_FIELD};

use super::{form::FormData, record_success, ActionFailure};
use crate::AppState;

const ACTION: &str = "important_questions";

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionsState {
    /// The submitted material, echoed back in every outcome
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub questions: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_errors: Option<FieldErrors>,
}

pub async fn identify_questions(
    State(state): State<AppState>,
    multipart: Multipart,
) -> (StatusCode, Json<QuestionsState>) {
    let mut input = None;
    let result = async {
        let form = FormData::parse(multipart, state.config.server.max_upload_bytes).await?;
        let material = form.text_or_empty(MATERIAL_FIELD);
        input = Some(material.clone());
        state.services.questions.identify(&material).await
    }
    .await;

    match result {
        Ok(questions) => {
            record_success(ACTION);
            (
                StatusCode::OK,
                Json(QuestionsState {
                    input,
                    questions: Some(questions),
                    ..QuestionsState::default()
                }),
            )
        }
        Err(e) => {
            let failure = ActionFailure::from_error(ACTION, e);
            (
                failure.status,
                Json(QuestionsState {
                    input,
                    error: Some(failure.message),
                    field_errors: failure.field_errors,
                    ..QuestionsState::default()
                }),
            )
        }
    }
}
