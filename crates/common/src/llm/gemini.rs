//! Gemini `generateContent` client

use super::{GenerateRequest, LanguageModel, OutputFormat, Part, SafetySetting};
use crate::config::ModelConfig;
use crate::errors::{AppError, Result};
use crate::metrics;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Hosted Gemini client
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    safety_settings: Vec<SafetySetting>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<WirePart>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum WirePart {
    Text {
        text: String,
    },
    #[serde(rename_all = "camelCase")]
    Inline {
        inline_data: InlineData,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    response_schema: serde_json::Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

impl GeminiClient {
    /// Create a new client from configuration
    pub fn new(config: &ModelConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build().map_err(|e| AppError::Internal {
            message: format!("Failed to create HTTP client: {}", e),
        })?;

        Ok(Self {
            client,
            api_key: config.api_key.clone().unwrap_or_default(),
            model: config.model.clone(),
            base_url: config
                .api_base
                .clone()
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }

    async fn make_request(&self, body: &GeminiRequest) -> Result<Option<String>> {
        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| AppError::ModelError {
                message: format!("Request failed: {}", e),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|b| b.error.message)
                .unwrap_or(body);
            return Err(AppError::ModelError {
                message: format!("Model API error {}: {}", status, detail),
            });
        }

        let result: GeminiResponse = response.json().await.map_err(|e| AppError::ModelError {
            message: format!("Failed to parse response: {}", e),
        })?;

        extract_text(result)
    }
}

fn build_body(request: &GenerateRequest) -> GeminiRequest {
    let parts = request
        .parts
        .iter()
        .map(|part| match part {
            Part::Text(text) => WirePart::Text { text: text.clone() },
            Part::Media(uri) => WirePart::Inline {
                inline_data: InlineData {
                    mime_type: uri.mime_type.clone(),
                    data: uri.data.clone(),
                },
            },
        })
        .collect();

    let generation_config = match &request.output {
        OutputFormat::Text => None,
        OutputFormat::Json(schema) => Some(GenerationConfig {
            response_mime_type: "application/json",
            response_schema: schema.clone(),
        }),
    };

    GeminiRequest {
        contents: vec![Content {
            role: "user",
            parts,
        }],
        safety_settings: request.safety.clone(),
        generation_config,
    }
}

fn extract_text(response: GeminiResponse) -> Result<Option<String>> {
    let Some(candidate) = response.candidates.into_iter().next() else {
        if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(AppError::ModelError {
                message: format!("Prompt blocked by the model: {}", reason),
            });
        }
        return Ok(None);
    };

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        tracing::warn!(finish_reason = ?candidate.finish_reason, "Model returned no text");
        return Ok(None);
    }
    Ok(Some(text))
}

#[async_trait]
impl LanguageModel for GeminiClient {
    async fn generate(&self, request: GenerateRequest) -> Result<Option<String>> {
        let body = build_body(&request);
        let start = Instant::now();

        let result = self.make_request(&body).await;
        let elapsed = start.elapsed();
        metrics::record_model_call(elapsed.as_secs_f64(), request.name, result.is_ok());

        match &result {
            Ok(output) => tracing::info!(
                prompt = request.name,
                model = %self.model,
                latency_ms = elapsed.as_millis() as u64,
                has_output = output.is_some(),
                "Model call completed"
            ),
            Err(e) => tracing::warn!(
                prompt = request.name,
                model = %self.model,
                error = %e,
                "Model call failed"
            ),
        }

        result
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
