//! Static course content
//!
//! Syllabus subjects, quizzes, resource links, frequently asked exam
//! questions and chapter notes are read once from a JSON catalog at startup
//! and served read-only.

use crate::errors::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyllabusModule {
    pub title: String,
    pub topics: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyllabusSubject {
    pub id: String,
    pub name: String,
    pub code: String,
    pub description: String,
    #[serde(default)]
    pub modules: Vec<SyllabusModule>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    pub subject_id: String,
    pub subject_name: String,
    pub questions: Vec<QuizQuestion>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    pub title: String,
    pub link: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub chapters: Vec<Chapter>,
    /// "Website", "Textbook" or "Video Playlist"
    pub category: String,
    pub subject: String,
}

/// Questions that keep coming back in previous-year papers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionBank {
    pub subject: String,
    pub questions: Vec<String>,
}

/// Per-chapter note links for one subject
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterNotes {
    pub subject: String,
    pub chapters: Vec<Chapter>,
}

/// Everything the portal displays without touching the document store
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ContentCatalog {
    pub syllabus: Vec<SyllabusSubject>,
    pub quizzes: Vec<Quiz>,
    pub resources: Vec<Resource>,
    pub faqs: Vec<QuestionBank>,
    pub chapter_notes: Vec<ChapterNotes>,
}

impl ContentCatalog {
    /// Load a catalog from a JSON file
    pub async fn from_file(path: &Path) -> Result<Self> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| AppError::Configuration {
                message: format!("Cannot read content catalog {}: {}", path.display(), e),
            })?;
        let catalog: Self = serde_json::from_str(&raw)?;

        tracing::info!(
            path = %path.display(),
            subjects = catalog.syllabus.len(),
            quizzes = catalog.quizzes.len(),
            resources = catalog.resources.len(),
            faqs = catalog.faqs.len(),
            chapter_notes = catalog.chapter_notes.len(),
            "Content catalog loaded"
        );
        Ok(catalog)
    }

    /// Load from `path` if configured, otherwise an empty catalog
    pub async fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path).await,
            None => {
                tracing::warn!("No content catalog configured, serving empty content");
                Ok(Self::default())
            }
        }
    }

    pub fn subject(&self, id: &str) -> Option<&SyllabusSubject> {
        self.syllabus.iter().find(|s| s.id == id)
    }

    pub fn quiz(&self, subject_id: &str) -> Option<&Quiz> {
        self.quizzes.iter().find(|q| q.subject_id == subject_id)
    }

    /// Resources matching both filters; `None` matches anything
    pub fn resources(&self, subject: Option<&str>, category: Option<&str>) -> Vec<&Resource> {
        self.resources
            .iter()
            .filter(|r| subject.map_or(true, |s| r.subject.eq_ignore_ascii_case(s)))
            .filter(|r| category.map_or(true, |c| r.category.eq_ignore_ascii_case(c)))
            .collect()
    }

    pub fn faqs(&self, subject: Option<&str>) -> Vec<&QuestionBank> {
        self.faqs
            .iter()
            .filter(|b| subject.map_or(true, |s| b.subject.eq_ignore_ascii_case(s)))
            .collect()
    }

    pub fn chapter_notes(&self, subject: Option<&str>) -> Vec<&ChapterNotes> {
        self.chapter_notes
            .iter()
            .filter(|n| subject.map_or(true, |s| n.subject.eq_ignore_ascii_case(s)))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionFeedback {
    pub question: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub your_answer: Option<String>,
    pub correct_answer: String,
    pub correct: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResult {
    pub subject_id: String,
    pub score: usize,
    pub total: usize,
    pub percent: u32,
    pub feedback: Vec<QuestionFeedback>,
}

/// Score answers keyed by question index. Unanswered questions count as wrong.
pub fn grade_quiz(quiz: &Quiz, answers: &BTreeMap<usize, String>) -> QuizResult {
    let feedback: Vec<QuestionFeedback> = quiz
        .questions
        .iter()
        .enumerate()
        .map(|(idx, q)| {
            let your_answer = answers.get(&idx).cloned();
            QuestionFeedback {
                correct: your_answer.as_deref() == Some(q.correct_answer.as_str()),
                question: q.question.clone(),
                your_answer,
                correct_answer: q.correct_answer.clone(),
            }
        })
        .collect();

    let score = feedback.iter().filter(|f| f.correct).count();
    let total = quiz.questions.len();
    let percent = if total == 0 {
        0
    } else {
        (score as f64 * 100.0 / total as f64).round() as u32
    };

    QuizResult {
        subject_id: quiz.subject_id.clone(),
        score,
        total,
        percent,
        feedback,
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn catalog() -> ContentCatalog {
        ContentCatalog {
            syllabus: vec![
                SyllabusSubject {
                    id: "mathematics-1".into(),
                    name: "Engineering Mathematics I".into(),
                    code: "MA101".into(),
                    description: "Calculus and linear algebra.".into(),
                    modules: vec![SyllabusModule {
                        title: "Module 3: Matrices".into(),
                        topics: vec!["Eigenvalues and eigenvectors".into()],
                    }],
                },
                SyllabusSubject {
                    id: "physics-1".into(),
                    name: "Engineering Physics".into(),
                    code: "PH101".into(),
                    description: "Mechanics, optics and quantum mechanics.".into(),
                    modules: vec![],
                },
            ],
            quizzes: vec![Quiz {
                subject_id: "mathematics-1".into(),
                subject_name: "Engineering Mathematics I".into(),
                questions: vec![
                    QuizQuestion {
                        question: "What is the derivative of x^2?".into(),
                        options: vec!["2x".into(), "x".into(), "x^3".into(), "2".into()],
                        correct_answer: "2x".into(),
                    },
                    QuizQuestion {
                        question: "Which of the following is an indeterminate form?".into(),
                        options: vec!["0/1".into(), "1/0".into(), "0/0".into()],
                        correct_answer: "0/0".into(),
                    },
                    QuizQuestion {
                        question: "The value of the integral of 1/x dx is:".into(),
                        options: vec!["ln(x)".into(), "x^2".into()],
                        correct_answer: "ln(x)".into(),
                    },
                ],
            }],
            resources: vec![
                Resource {
                    id: "3".into(),
                    title: "Khan Academy Physics".into(),
                    description: "Fundamental physics concepts.".into(),
                    link: Some("https://example.org/physics".into()),
                    chapters: vec![],
                    category: "Video Playlist".into(),
                    subject: "Physics".into(),
                },
                Resource {
                    id: "4".into(),
                    title: "Concepts of Physics".into(),
                    description: "Foundation in physics.".into(),
                    link: None,
                    chapters: vec![],
                    category: "Textbook".into(),
                    subject: "Physics".into(),
                },
            ],
            faqs: vec![QuestionBank {
                subject: "Engineering Physics".into(),
                questions: vec!["Derive Schrodinger's time-independent wave equation.".into()],
            }],
            chapter_notes: vec![ChapterNotes {
                subject: "Basic Electrical Engineering".into(),
                chapters: vec![Chapter {
                    title: "DC circuit".into(),
                    link: "https://example.org/dc-circuit".into(),
                }],
            }],
        }
    }
}
