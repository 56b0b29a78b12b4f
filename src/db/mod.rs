// src/db/mod.rs

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{
        answer::{AnswerKey, NewAnswerRecord},
        quiz::{NewQuiz, Quiz, QuizSet, QuizSetOwner},
        text::SourceText,
    },
};

pub use memory::{FailPoint, MemoryQuizStore};
pub use postgres::PgQuizStore;

/// Storage operations used by quiz generation and grading.
///
/// Every method is a single round trip. Multi-step consistency is the
/// caller's job (see `services::generation`).
#[async_trait]
pub trait QuizStore: Send + Sync {
    async fn insert_text(&self, user_id: Uuid, content: &str) -> Result<SourceText, AppError>;
    async fn delete_text(&self, text_id: Uuid) -> Result<(), AppError>;

    /// Texts owned by `user_id`, newest first.
    async fn list_texts(&self, user_id: Uuid) -> Result<Vec<SourceText>, AppError>;

    async fn insert_quiz_set(&self, text_id: Uuid, quiz_type: &str) -> Result<QuizSet, AppError>;
    async fn delete_quiz_set(&self, quiz_set_id: Uuid) -> Result<(), AppError>;
    async fn find_quiz_set(&self, quiz_set_id: Uuid) -> Result<Option<QuizSetOwner>, AppError>;

    /// Inserts all quizzes of a set and returns them in input order.
    async fn insert_quizzes(&self, quiz_set_id: Uuid, quizzes: &[NewQuiz]) -> Result<Vec<Quiz>, AppError>;
    async fn delete_quizzes_by_set(&self, quiz_set_id: Uuid) -> Result<(), AppError>;

    /// Quizzes of a set ordered by creation.
    async fn list_quizzes(&self, quiz_set_id: Uuid) -> Result<Vec<Quiz>, AppError>;

    /// Answer keys for whichever of `quiz_ids` exist. Missing ids are simply absent.
    async fn find_answer_keys(&self, quiz_ids: &[Uuid]) -> Result<Vec<AnswerKey>, AppError>;

    async fn insert_answers(&self, records: &[NewAnswerRecord]) -> Result<(), AppError>;
}
