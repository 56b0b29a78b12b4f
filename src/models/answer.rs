// src/models/answer.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Represents the 'user_answers' table in the database.
/// One row per graded submission of a quiz; rows are never updated.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AnswerRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub quiz_id: Uuid,
    pub submitted_answer: String,
    pub is_correct: bool,
    pub feedback: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Values for an answer row that has not been inserted yet.
#[derive(Debug, Clone)]
pub struct NewAnswerRecord {
    pub user_id: Uuid,
    pub quiz_id: Uuid,
    pub submitted_answer: String,
    pub is_correct: bool,
    pub feedback: String,
}

/// The stored answer for a quiz, with the ids needed for the ownership check.
#[derive(Debug, Clone, FromRow)]
pub struct AnswerKey {
    pub quiz_id: Uuid,
    pub quiz_set_id: Uuid,
    pub correct_answer: String,
    pub owner_id: Uuid,
}

/// A single submitted answer.
/// `quiz_id` stays a string so an empty or non-UUID id is reported as malformed input.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedAnswer {
    #[serde(default)]
    pub quiz_id: String,
    pub submitted_answer: String,
}

/// DTO for submitting answers to a quiz set.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAnswersRequest {
    /// Must equal the authenticated user.
    #[serde(default)]
    pub user_id: String,

    #[serde(default)]
    pub answers: Vec<SubmittedAnswer>,
}

/// Grading outcome for one submitted answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradedAnswer {
    pub quiz_id: Uuid,
    pub submitted_answer: String,
    pub correct_answer: String,
    pub is_correct: bool,
    pub feedback: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GradeResponse {
    pub results: Vec<GradedAnswer>,
}
