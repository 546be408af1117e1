//! Course content handlers: syllabus, quizzes, resources, exam FAQs, chapter notes

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use studyhub_common::{
    content::{grade_quiz, ChapterNotes, QuestionBank, QuizResult, Resource, SyllabusSubject},
    errors::{AppError, Result},
};

use crate::AppState;

/// A quiz in the listing
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizSummary {
    pub subject_id: String,
    pub subject_name: String,
    pub question_count: usize,
}

/// A question as shown to the student, without its answer
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionView {
    pub index: usize,
    pub question: String,
    pub options: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizView {
    pub subject_id: String,
    pub subject_name: String,
    pub questions: Vec<QuestionView>,
}

#[derive(Debug, Deserialize)]
pub struct GradeRequest {
    /// Question index to the chosen option
    #[serde(default)]
    pub answers: BTreeMap<usize, String>,
}

#[derive(Debug, Deserialize)]
pub struct ResourceQuery {
    pub subject: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SubjectQuery {
    pub subject: Option<String>,
}

pub async fn list_syllabus(State(state): State<AppState>) -> Json<Vec<SyllabusSubject>> {
    Json(state.content.syllabus.clone())
}

pub async fn get_subject(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SyllabusSubject>> {
    state
        .content
        .subject(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| not_found("subject", id))
}

pub async fn list_quizzes(State(state): State<AppState>) -> Json<Vec<QuizSummary>> {
    Json(
        state
            .content
            .quizzes
            .iter()
            .map(|q| QuizSummary {
                subject_id: q.subject_id.clone(),
                subject_name: q.subject_name.clone(),
                question_count: q.questions.len(),
            })
            .collect(),
    )
}

pub async fn get_quiz(
    State(state): State<AppState>,
    Path(subject): Path<String>,
) -> Result<Json<QuizView>> {
    let quiz = state
        .content
        .quiz(&subject)
        .ok_or_else(|| not_found("quiz", subject.clone()))?;

    Ok(Json(QuizView {
        subject_id: quiz.subject_id.clone(),
        subject_name: quiz.subject_name.clone(),
        questions: quiz
            .questions
            .iter()
            .enumerate()
            .map(|(index, q)| QuestionView {
                index,
                question: q.question.clone(),
                options: q.options.clone(),
            })
            .collect(),
    }))
}

pub async fn grade(
    State(state): State<AppState>,
    Path(subject): Path<String>,
    Json(request): Json<GradeRequest>,
) -> Result<Json<QuizResult>> {
    let quiz = state
        .content
        .quiz(&subject)
        .ok_or_else(|| not_found("quiz", subject.clone()))?;

    let result = grade_quiz(quiz, &request.answers);
    tracing::info!(subject = %subject, score = result.score, total = result.total, "Quiz graded");
    Ok(Json(result))
}

pub async fn list_resources(
    State(state): State<AppState>,
    Query(query): Query<ResourceQuery>,
) -> Json<Vec<Resource>> {
    Json(
        state
            .content
            .resources(query.subject.as_deref(), query.category.as_deref())
            .into_iter()
            .cloned()
            .collect(),
    )
}

/// Frequently asked previous-year questions, optionally for one subject
pub async fn list_faqs(
    State(state): State<AppState>,
    Query(query): Query<SubjectQuery>,
) -> Json<Vec<QuestionBank>> {
    Json(
        state
            .content
            .faqs(query.subject.as_deref())
            .into_iter()
            .cloned()
            .collect(),
    )
}

pub async fn list_chapter_notes(
    State(state): State<AppState>,
    Query(query): Query<SubjectQuery>,
) -> Json<Vec<ChapterNotes>> {
    Json(
        state
            .content
            .chapter_notes(query.subject.as_deref())
            .into_iter()
            .cloned()
            .collect(),
    )
}

fn not_found(resource_type: &str, id: String) -> AppError {
    AppError::NotFound {
        resource_type: resource_type.to_string(),
        id,
    }
}
