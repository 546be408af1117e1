//! Error types for StudyHub services
//!
//! Provides a single error enum with:
//! - Per-field validation failures that never reach an external collaborator
//! - Upstream failures (document store, blob store, model endpoint)
//! - HTTP status code mapping and structured error responses
//! - A flattening step into the one message string a form action reports

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

/// Field name to the messages reported beneath that field
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Message used whenever an error carries nothing a user can act on
pub const UNKNOWN_ERROR_MESSAGE: &str = "An unknown error occurred.";

/// Error codes for machine-readable error identification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Validation errors (1xxx)
    ValidationError,
    InvalidFormat,
    PayloadTooLarge,

    // Resource errors (4xxx)
    NotFound,

    // Rate limiting (6xxx)
    RateLimited,

    // Persistence errors (7xxx)
    DatabaseError,
    ConnectionError,
    StorageError,

    // External service errors (8xxx)
    ModelError,
    NoModelOutput,

    // Internal errors (9xxx)
    InternalError,
    ConfigurationError,
    SerializationError,
}

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Validation errors
    #[error("{}", join_field_errors(.fields))]
    InvalidFields { fields: FieldErrors },

    #[error("Invalid format: {message}")]
    InvalidFormat { message: String },

    #[error("Upload exceeds the limit of {limit} bytes")]
    PayloadTooLarge { limit: usize },

    // Resource errors
    #[error("Resource not found: {resource_type} with id {id}")]
    NotFound { resource_type: String, id: String },

    // Rate limiting
    #[error("Rate limit exceeded: {limit} requests per second")]
    RateLimited { limit: u32 },

    // Persistence errors
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Database connection error: {message}")]
    DatabaseConnection { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    // External service errors
    #[error("Model request failed: {message}")]
    ModelError { message: String },

    #[error("No output from AI model")]
    NoModelOutput,

    // Internal errors
    #[error("Internal server error: {message}")]
    Internal { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

fn join_field_errors(fields: &FieldErrors) -> String {
    fields
        .values()
        .flatten()
        .cloned()
        .collect::<Vec<_>>()
        .join(", ")
}

impl AppError {
    /// Build a validation error for a single form field
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut fields = FieldErrors::new();
        fields.insert(field.into(), vec![message.into()]);
        AppError::InvalidFields { fields }
    }

    /// Get the error code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::InvalidFields { .. } => ErrorCode::ValidationError,
            AppError::InvalidFormat { .. } => ErrorCode::InvalidFormat,
            AppError::PayloadTooLarge { .. } => ErrorCode::PayloadTooLarge,
            AppError::NotFound { .. } => ErrorCode::NotFound,
            AppError::RateLimited { .. } => ErrorCode::RateLimited,
            AppError::Database(_) => ErrorCode::DatabaseError,
            AppError::DatabaseConnection { .. } => ErrorCode::ConnectionError,
            AppError::Storage { .. } => ErrorCode::StorageError,
            AppError::ModelError { .. } => ErrorCode::ModelError,
            AppError::NoModelOutput => ErrorCode::NoModelOutput,
            AppError::Internal { .. } => ErrorCode::InternalError,
            AppError::Configuration { .. } => ErrorCode::ConfigurationError,
            AppError::Serialization(_) => ErrorCode::SerializationError,
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            AppError::InvalidFields { .. } | AppError::InvalidFormat { .. } => {
                StatusCode::BAD_REQUEST
            }

            // 404 Not Found
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,

            // 413 Payload Too Large
            AppError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,

            // 429 Too Many Requests
            AppError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,

            // 500 Internal Server Error
            AppError::Internal { .. }
            | AppError::Configuration { .. }
            | AppError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,

            // 502 Bad Gateway
            AppError::Database(_)
            | AppError::DatabaseConnection { .. }
            | AppError::Storage { .. }
            | AppError::ModelError { .. }
            | AppError::NoModelOutput => StatusCode::BAD_GATEWAY,
        }
    }

    /// Check if this error should be logged at error level
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }

    /// Check if this error is a client error
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }

    /// Per-field messages, present only for form validation failures
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            AppError::InvalidFields { fields } => Some(fields),
            _ => None,
        }
    }

    /// The single human-readable message a form action reports.
    ///
    /// Upstream failures keep their own wording. Internal failures are
    /// replaced with [`UNKNOWN_ERROR_MESSAGE`]; their detail only goes to the log.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Storage { message } | AppError::ModelError { message } => message.clone(),
            AppError::Internal { .. }
            | AppError::Configuration { .. }
            | AppError::Serialization(_) => UNKNOWN_ERROR_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }
}

/// Structured error response for API
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetails,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();
        let message = self.to_string();

        // Log based on severity
        if self.is_server_error() {
            tracing::error!(
                error = %message,
                code = ?code,
                status = status.as_u16(),
                "Server error"
            );
        } else if self.is_client_error() {
            tracing::warn!(
                error = %message,
                code = ?code,
                status = status.as_u16(),
                "Client error"
            );
        }

        let details = self
            .field_errors()
            .and_then(|fields| serde_json::to_value(fields).ok());

        let body = ErrorResponse {
            error: ErrorDetails {
                code,
                message: self.user_message(),
                details,
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Flatten validator output into field name to messages
pub fn field_errors_from(errors: &validator::ValidationErrors) -> FieldErrors {
    errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| {
            let messages = errs
                .iter()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("Invalid value for {}.", field))
                })
                .collect();
            (field.to_string(), messages)
        })
        .collect()
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::InvalidFields {
            fields: field_errors_from(&errors),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage {
            message: err.to_string(),
        }
    }
}
