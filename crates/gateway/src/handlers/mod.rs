//! API handlers module
//!
//! Form actions always answer with their state object; the status code
//! tells success, validation failure and upstream failure apart.

pub mod books;
pub mod content;
pub mod form;
pub mod health;
pub mod notes;
pub mod questions;
pub mod summarize;
pub mod tools;

use axum::{http::StatusCode, Json};
use serde::Serialize;
use studyhub_common::errors::{AppError, FieldErrors};
use studyhub_common::metrics::{record_action, ActionOutcome};

/// What a failed form action reports
pub(crate) struct ActionFailure {
    pub status: StatusCode,
    pub message: String,
    pub field_errors: Option<FieldErrors>,
}

impl ActionFailure {
    pub fn from_error(action: &str, err: AppError) -> Self {
        let status = err.status_code();
        if err.is_server_error() {
            tracing::error!(action, error = %err, code = ?err.code(), "Form action failed");
            record_action(action, ActionOutcome::Failed);
        } else {
            tracing::info!(action, error = %err, "Form action rejected");
            record_action(action, ActionOutcome::Invalid);
        }

        Self {
            status,
            message: err.user_message(),
            field_errors: err.field_errors().cloned(),
        }
    }
}

pub(crate) fn record_success(action: &str) {
    record_action(action, ActionOutcome::Success);
}

/// State returned by the add-note and add-book actions
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormState {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_errors: Option<FieldErrors>,
}

impl FormState {
    pub(crate) fn respond<T>(
        action: &str,
        result: studyhub_common::Result<T>,
    ) -> (StatusCode, Json<Self>) {
        match result {
            Ok(_) => {
                record_success(action);
                (
                    StatusCode::OK,
                    Json(Self {
                        success: true,
                        ..Self::default()
                    }),
                )
            }
            Err(e) => {
                let failure = ActionFailure::from_error(action, e);
                (
                    failure.status,
                    Json(Self {
                        success: false,
                        error: Some(failure.message),
                        field_errors: failure.field_errors,
                    }),
                )
            }
        }
    }
}
