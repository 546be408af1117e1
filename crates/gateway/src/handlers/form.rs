//! Multipart form decoding

use axum::extract::{multipart::MultipartError, Multipart};
use axum::http::StatusCode;
use std::collections::HashMap;
use studyhub_common::errors::{AppError, Result};
use studyhub_common::services::UploadedFile;

/// Text fields and files of one form submission
#[derive(Debug, Default)]
pub struct FormData {
    fields: HashMap<String, String>,
    files: HashMap<String, UploadedFile>,
}

impl FormData {
    /// Read every part. A part with a file name is a file, anything else text.
    /// A repeated field keeps its first value.
    pub async fn parse(mut multipart: Multipart, limit: usize) -> Result<Self> {
        let mut form = Self::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| multipart_error(e, limit))?
        {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            match field.file_name().map(str::to_string) {
                Some(file_name) => {
                    let content_type = field
                        .content_type()
                        .unwrap_or("application/octet-stream")
                        .to_string();
                    let bytes = field.bytes().await.map_err(|e| multipart_error(e, limit))?;
                    form.files.entry(name).or_insert_with(|| {
                        UploadedFile::new(&file_name, &content_type, bytes.to_vec())
                    });
                }
                None => {
                    let text = field.text().await.map_err(|e| multipart_error(e, limit))?;
                    form.fields.entry(name).or_insert(text);
                }
            }
        }

        Ok(form)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Text value or empty string when the field was not sent
    pub fn text_or_empty(&self, name: &str) -> String {
        self.text(name).unwrap_or_default().to_string()
    }

    pub fn take_file(&mut self, name: &str) -> Option<UploadedFile> {
        self.files.remove(name)
    }
}

fn multipart_error(err: MultipartError, limit: usize) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge { limit }
    } else {
        AppError::InvalidFormat {
            message: err.body_text(),
        }
    }
}
