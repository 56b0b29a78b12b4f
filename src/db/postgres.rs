// src/db/postgres.rs

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::QuizStore;
use crate::{
    error::AppError,
    models::{
        answer::{AnswerKey, NewAnswerRecord},
        quiz::{NewQuiz, Quiz, QuizSet, QuizSetOwner},
        text::SourceText,
    },
};

/// `QuizStore` backed by the Postgres schema in `migrations/`.
#[derive(Clone)]
pub struct PgQuizStore {
    pool: PgPool,
}

impl PgQuizStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl QuizStore for PgQuizStore {
    async fn insert_text(&self, user_id: Uuid, content: &str) -> Result<SourceText, AppError> {
        let text = sqlx::query_as::<_, SourceText>(
            r#"
            INSERT INTO texts (id, user_id, content)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, content, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(content)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to insert text: {:?}", e);
            AppError::from(e)
        })?;

        Ok(text)
    }

    async fn delete_text(&self, text_id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM texts WHERE id = $1")
            .bind(text_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_texts(&self, user_id: Uuid) -> Result<Vec<SourceText>, AppError> {
        let texts = sqlx::query_as::<_, SourceText>(
            r#"
            SELECT id, user_id, content, created_at
            FROM texts
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(texts)
    }

    async fn insert_quiz_set(&self, text_id: Uuid, quiz_type: &str) -> Result<QuizSet, AppError> {
        let quiz_set = sqlx::query_as::<_, QuizSet>(
            r#"
            INSERT INTO quiz_sets (id, text_id, quiz_type)
            VALUES ($1, $2, $3)
            RETURNING id, text_id, quiz_type, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(text_id)
        .bind(quiz_type)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to insert quiz set: {:?}", e);
            AppError::from(e)
        })?;

        Ok(quiz_set)
    }

    async fn delete_quiz_set(&self, quiz_set_id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM quiz_sets WHERE id = $1")
            .bind(quiz_set_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn find_quiz_set(&self, quiz_set_id: Uuid) -> Result<Option<QuizSetOwner>, AppError> {
        let quiz_set = sqlx::query_as::<_, QuizSetOwner>(
            r#"
            SELECT s.id, s.text_id, t.user_id AS owner_id
            FROM quiz_sets s
            JOIN texts t ON t.id = s.text_id
            WHERE s.id = $1
            "#,
        )
        .bind(quiz_set_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(quiz_set)
    }

    async fn insert_quizzes(&self, quiz_set_id: Uuid, quizzes: &[NewQuiz]) -> Result<Vec<Quiz>, AppError> {
        if quizzes.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = quizzes.iter().map(|_| Uuid::new_v4()).collect();

        let mut query_builder = QueryBuilder::<Postgres>::new(
            "INSERT INTO quizzes (id, quiz_set_id, position, type, question, correct_answer) ",
        );
        query_builder.push_values(ids.iter().zip(quizzes).enumerate(), |mut row, (position, (id, quiz))| {
            row.push_bind(*id)
                .push_bind(quiz_set_id)
                .push_bind(position as i32)
                .push_bind(&quiz.quiz_type)
                .push_bind(&quiz.question)
                .push_bind(&quiz.correct_answer);
        });
        query_builder.push(" RETURNING id, quiz_set_id, type, question, correct_answer, created_at");

        let mut inserted: Vec<Quiz> = query_builder
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to insert quizzes: {:?}", e);
                AppError::from(e)
            })?;

        // RETURNING order is not guaranteed; restore input order.
        inserted.sort_by_key(|quiz| ids.iter().position(|id| *id == quiz.id));
        Ok(inserted)
    }

    async fn delete_quizzes_by_set(&self, quiz_set_id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM quizzes WHERE quiz_set_id = $1")
            .bind(quiz_set_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_quizzes(&self, quiz_set_id: Uuid) -> Result<Vec<Quiz>, AppError> {
        let quizzes = sqlx::query_as::<_, Quiz>(
            r#"
            SELECT id, quiz_set_id, type, question, correct_answer, created_at
            FROM quizzes
            WHERE quiz_set_id = $1
            ORDER BY created_at, position
            "#,
        )
        .bind(quiz_set_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(quizzes)
    }

    async fn find_answer_keys(&self, quiz_ids: &[Uuid]) -> Result<Vec<AnswerKey>, AppError> {
        if quiz_ids.is_empty() {
            return Ok(Vec::new());
        }

        // Use QueryBuilder for dynamic IN clause
        let mut query_builder = QueryBuilder::<Postgres>::new(
            r#"
            SELECT
                q.id AS quiz_id,
                q.quiz_set_id,
                q.correct_answer,
                t.user_id AS owner_id
            FROM quizzes q
            JOIN quiz_sets s ON s.id = q.quiz_set_id
            JOIN texts t ON t.id = s.text_id
            WHERE q.id IN ("#,
        );

        let mut separated = query_builder.separated(",");
        for id in quiz_ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");

        let keys: Vec<AnswerKey> = query_builder
            .build_query_as()
            .fetch_all(&self.pool)
            .await?;

        Ok(keys)
    }

    async fn insert_answers(&self, records: &[NewAnswerRecord]) -> Result<(), AppError> {
        if records.is_empty() {
            return Ok(());
        }

        let mut query_builder = QueryBuilder::<Postgres>::new(
            "INSERT INTO user_answers (id, user_id, quiz_id, submitted_answer, is_correct, feedback) ",
        );
        query_builder.push_values(records, |mut row, record| {
            row.push_bind(Uuid::new_v4())
                .push_bind(record.user_id)
                .push_bind(record.quiz_id)
                .push_bind(&record.submitted_answer)
                .push_bind(record.is_correct)
                .push_bind(&record.feedback);
        });

        query_builder
            .build()
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to save user answers: {:?}", e);
                AppError::from(e)
            })?;

        Ok(())
    }
}
