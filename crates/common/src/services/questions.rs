//! Important-question extraction
//!
//! Course material goes to the model with a response schema; the reply must
//! be a JSON object carrying an `importantQuestions` array of strings.

use crate::errors::{AppError, Result};
use crate::llm::{GenerateRequest, LanguageModel};
use crate::prompts::{important_questions_prompt, important_questions_schema, IMPORTANT_QUESTIONS};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

pub const MATERIAL_FIELD: &str = "material";

#[derive(Debug, Validate)]
struct MaterialForm {
    #[validate(length(min = 10, message = "Course material must be at least 10 characters long."))]
    material: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuestionsReply {
    important_questions: Vec<String>,
}

pub struct QuestionService {
    model: Arc<dyn LanguageModel>,
}

impl QuestionService {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }

    /// Ask the model for the questions most likely to matter in `material`
    pub async fn identify(&self, material: &str) -> Result<Vec<String>> {
        let material = material.trim();
        MaterialForm {
            material: material.to_string(),
        }
        .validate()?;

        let request = GenerateRequest::json(
            IMPORTANT_QUESTIONS,
            important_questions_prompt(material),
            important_questions_schema(),
        );

        let raw = self
            .model
            .generate(request)
            .await?
            .filter(|s| !s.trim().is_empty())
            .ok_or(AppError::NoModelOutput)?;

        let questions = parse_reply(&raw)?;
        tracing::info!(
            material_chars = material.chars().count(),
            questions = questions.len(),
            "Important questions identified"
        );
        Ok(questions)
    }
}

/// Parse the structured reply, tolerating a surrounding code fence
fn parse_reply(raw: &str) -> Result<Vec<String>> {
    let body = strip_code_fence(raw);
    let reply: QuestionsReply = serde_json::from_str(body).map_err(|e| {
        tracing::warn!(error = %e, "Model reply did not match the questions schema");
        AppError::ModelError {
            message: "AI model returned malformed questions".to_string(),
        }
    })?;
    Ok(reply.important_questions)
}

fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Skip an optional language tag on the opening line
    let inner = match inner.find('\n') {
        Some(idx) => &inner[idx + 1..],
        None => inner,
    };
    inner.trim_end().strip_suffix("```").unwrap_or(inner).trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{OutputFormat, ScriptedModel};

    #[tokio::test]
    async fn test_short_material_never_reaches_model() {
        let model = Arc::new(ScriptedModel::new());
        let svc = QuestionService::new(model.clone());

        let err = svc.identify("123456789").await.unwrap_err();
        assert_eq!(
            err.field_errors().unwrap()[MATERIAL_FIELD],
            vec!["Course material must be at least 10 characters long.".to_string()]
        );
        assert_eq!(model.calls(), 0);
    }

    #[tokio::test]
    async fn test_padding_does_not_count_toward_length() {
        let model = Arc::new(ScriptedModel::new());
        let svc = QuestionService::new(model.clone());

        assert!(svc.identify("   short     ").await.is_err());
        assert_eq!(model.calls(), 0);
    }

    #[tokio::test]
    async fn test_questions_returned_verbatim() {
        let model = Arc::new(ScriptedModel::replying(
            r#"{"importantQuestions":["What is an eigenvalue?","Define a basis."]}"#,
        ));
        let svc = QuestionService::new(model.clone());

        let questions = svc.identify("Linear algebra: eigenvalues and bases").await.unwrap();
        assert_eq!(questions, vec!["What is an eigenvalue?", "Define a basis."]);

        let request = &model.requests().await[0];
        assert_eq!(request.name, IMPORTANT_QUESTIONS);
        assert!(matches!(request.output, OutputFormat::Json(_)));
        assert!(request.prompt_text().ends_with("Linear algebra: eigenvalues and bases"));
    }

    #[tokio::test]
    async fn test_empty_list_is_success() {
        let model = Arc::new(ScriptedModel::replying(r#"{"importantQuestions":[]}"#));
        let svc = QuestionService::new(model);
        assert!(svc.identify("nothing examinable here").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_no_output() {
        let svc = QuestionService::new(Arc::new(ScriptedModel::new()));
        let err = svc.identify("enough course material").await.unwrap_err();
        assert!(matches!(err, AppError::NoModelOutput));
    }

    #[tokio::test]
    async fn test_malformed_reply() {
        let model = Arc::new(ScriptedModel::replying(r#"{"questions": "nope"}"#));
        let svc = QuestionService::new(model);
        let err = svc.identify("enough course material").await.unwrap_err();
        assert!(matches!(err, AppError::ModelError { .. }));
    }

    #[test]
    fn test_fenced_reply_is_accepted() {
        let raw = "```json\n{\"importantQuestions\":[\"Q1\"]}\n```";
        assert_eq!(parse_reply(raw).unwrap(), vec!["Q1"]);
        assert_eq!(strip_code_fence("  {\"a\":1} "), "{\"a\":1}");
    }
}
