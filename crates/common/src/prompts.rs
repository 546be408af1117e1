//! Fixed prompt templates for the two AI pipelines
//!
//! Each template is rendered from the same text every time; optional
//! sections are guarded by whether their input is present.

use crate::llm::{DataUri, Part};
use serde_json::json;

pub const SUMMARIZE_NOTES: &str = "summarize_notes";
pub const IMPORTANT_QUESTIONS: &str = "important_questions";

const SUMMARIZE_PREAMBLE: &str = "You are an expert summarizer, able to create concise topic summaries of provided text or text from an image.

Please provide a concise topic summary of the notes provided. Return only the summary text, and nothing else.
";

const SUMMARIZE_TEXT_SECTION: &str = "
The notes are provided as text.
Notes:
";

const SUMMARIZE_MEDIA_SECTION: &str = "
The notes are provided as an image. Extract the text from the image and summarize it.
Photo: ";

const QUESTIONS_TEMPLATE: &str = "You are an AI assistant helping students identify the most important questions for their courses.

Based on the provided course material, identify the questions that are most likely to appear on exams or are crucial for understanding the core concepts.
Return a list of these questions.

Course Material:
";

/// Render the summarizer template.
///
/// The notes section appears when `notes` is non-blank, the photo section
/// when `photo` is present; the photo itself follows as a media part.
pub fn summarize_notes_prompt(notes: Option<&str>, photo: Option<&DataUri>) -> Vec<Part> {
    let mut text = String::from(SUMMARIZE_PREAMBLE);

    if let Some(notes) = notes.filter(|n| !n.trim().is_empty()) {
        text.push_str(SUMMARIZE_TEXT_SECTION);
        text.push_str(notes);
        text.push('\n');
    }

    let mut parts = Vec::with_capacity(2);
    match photo {
        Some(photo) => {
            text.push_str(SUMMARIZE_MEDIA_SECTION);
            parts.push(Part::Text(text));
            parts.push(Part::Media(photo.clone()));
        }
        None => parts.push(Part::Text(text)),
    }
    parts
}

/// Render the important-questions template
pub fn important_questions_prompt(material: &str) -> Vec<Part> {
    vec![Part::Text(format!("{}{}", QUESTIONS_TEMPLATE, material))]
}

/// Response schema: `{ importantQuestions: string[] }`
pub fn important_questions_schema() -> serde_json::Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "importantQuestions": {
                "type": "ARRAY",
                "description": "A list of the most important questions for the course material.",
                "items": { "type": "STRING" }
            }
        },
        "required": ["importantQuestions"]
    })
}
