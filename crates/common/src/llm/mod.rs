//! Model-invocation boundary
//!
//! A fixed prompt goes in as ordered parts (text and media), plain text or
//! schema-constrained JSON comes out. Implementations:
//! - [`GeminiClient`]: hosted Gemini `generateContent` endpoint
//! - [`EchoModel`]: offline stand-in for local development
//! - [`ScriptedModel`]: queued replies plus request capture, for tests

mod data_uri;
mod gemini;
mod scripted;

pub use data_uri::DataUri;
pub use gemini::GeminiClient;
pub use scripted::{EchoModel, ScriptedModel};

use crate::config::ModelConfig;
use crate::errors::{AppError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// One ordered piece of a prompt
#[derive(Debug, Clone, PartialEq)]
pub enum Part {
    Text(String),
    Media(DataUri),
}

/// Shape the model is asked to answer in
#[derive(Debug, Clone, PartialEq)]
pub enum OutputFormat {
    Text,
    /// JSON matching the given response schema
    Json(serde_json::Value),
}

/// Hazard categories a safety threshold applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HarmCategory {
    HarmCategoryDangerousContent,
    HarmCategoryHarassment,
    HarmCategoryHateSpeech,
    HarmCategorySexuallyExplicit,
}

/// Blocking threshold for a hazard category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HarmBlockThreshold {
    BlockNone,
    BlockOnlyHigh,
    BlockMediumAndAbove,
    BlockLowAndAbove,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetySetting {
    pub category: HarmCategory,
    pub threshold: HarmBlockThreshold,
}

/// Thresholds that let course material through unfiltered
pub fn permissive_safety_settings() -> Vec<SafetySetting> {
    [
        HarmCategory::HarmCategoryDangerousContent,
        HarmCategory::HarmCategoryHarassment,
        HarmCategory::HarmCategoryHateSpeech,
        HarmCategory::HarmCategorySexuallyExplicit,
    ]
    .into_iter()
    .map(|category| SafetySetting {
        category,
        threshold: HarmBlockThreshold::BlockNone,
    })
    .collect()
}

/// A single model call
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateRequest {
    /// Prompt name, used in logs and metrics
    pub name: &'static str,
    pub parts: Vec<Part>,
    pub output: OutputFormat,
    pub safety: Vec<SafetySetting>,
}

impl GenerateRequest {
    pub fn text(name: &'static str, parts: Vec<Part>) -> Self {
        Self {
            name,
            parts,
            output: OutputFormat::Text,
            safety: Vec::new(),
        }
    }

    pub fn json(name: &'static str, parts: Vec<Part>, schema: serde_json::Value) -> Self {
        Self {
            name,
            parts,
            output: OutputFormat::Json(schema),
            safety: Vec::new(),
        }
    }

    pub fn with_safety(mut self, safety: Vec<SafetySetting>) -> Self {
        self.safety = safety;
        self
    }

    /// Concatenated text parts
    pub fn prompt_text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|p| match p {
                Part::Text(t) => Some(t.as_str()),
                Part::Media(_) => None,
            })
            .collect::<Vec<_>>()
            .join("")
    }

    pub fn media(&self) -> impl Iterator<Item = &DataUri> {
        self.parts.iter().filter_map(|p| match p {
            Part::Media(m) => Some(m),
            Part::Text(_) => None,
        })
    }
}

/// Trait for hosted generative model endpoints
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Run one prompt. `Ok(None)` means the model produced no output.
    async fn generate(&self, request: GenerateRequest) -> Result<Option<String>>;

    /// Get the model name
    fn model_name(&self) -> &str;
}

/// Create a model client based on configuration
pub fn create_model(config: &ModelConfig) -> Result<Arc<dyn LanguageModel>> {
    match config.provider.as_str() {
        "gemini" => {
            if config.api_key.as_deref().map_or(true, str::is_empty) {
                return Err(AppError::Configuration {
                    message: "model.api_key is required for the gemini provider".to_string(),
                });
            }
            Ok(Arc::new(GeminiClient::new(config)?))
        }
        "mock" => {
            tracing::warn!("Using echo model; AI responses are canned");
            Ok(Arc::new(EchoModel))
        }
        other => Err(AppError::Configuration {
            message: format!("Unknown model provider: {}", other),
        }),
    }
}
