// src/models/quiz.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Represents the 'quiz_sets' table in the database.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct QuizSet {
    pub id: Uuid,
    pub text_id: Uuid,
    pub quiz_type: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// A quiz set joined with the owner of its source text.
#[derive(Debug, Clone, FromRow)]
pub struct QuizSetOwner {
    pub id: Uuid,
    pub text_id: Uuid,
    pub owner_id: Uuid,
}

/// Represents the 'quizzes' table in the database.
#[derive(Debug, Clone, FromRow)]
pub struct Quiz {
    pub id: Uuid,
    pub quiz_set_id: Uuid,

    /// Mapped from the database column 'type' since `type` is a reserved keyword in Rust.
    #[sqlx(rename = "type")]
    pub quiz_type: String,

    /// Sentence with the blank marker in place of the answer.
    pub question: String,

    /// Never sent to the client before grading.
    pub correct_answer: String,

    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Values for a quiz row that has not been inserted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewQuiz {
    pub quiz_type: String,
    pub question: String,
    pub correct_answer: String,
}

/// DTO for sending a quiz to the client (excludes the correct answer).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicQuiz {
    pub quiz_id: Uuid,
    #[serde(rename = "type")]
    pub quiz_type: String,
    pub question: String,
}

impl From<Quiz> for PublicQuiz {
    fn from(quiz: Quiz) -> Self {
        Self {
            quiz_id: quiz.id,
            quiz_type: quiz.quiz_type,
            question: quiz.question,
        }
    }
}

/// Response body for both quiz generation and quiz set lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizSetResponse {
    pub quiz_set_id: Uuid,
    pub quizzes: Vec<PublicQuiz>,
}

/// DTO for requesting quiz generation from a passage.
#[derive(Debug, Deserialize, Validate)]
pub struct GenerateQuizRequest {
    #[serde(default)]
    #[validate(length(max = 20000, message = "Text must be at most 20000 characters."))]
    pub text: String,
}
