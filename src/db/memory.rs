// src/db/memory.rs

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::QuizStore;
use crate::{
    error::AppError,
    models::{
        answer::{AnswerKey, AnswerRecord, NewAnswerRecord},
        quiz::{NewQuiz, Quiz, QuizSet, QuizSetOwner},
        text::SourceText,
    },
};

/// Store operations that can be made to fail on purpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailPoint {
    InsertText,
    DeleteText,
    InsertQuizSet,
    DeleteQuizSet,
    FindQuizSet,
    /// Writes the first quiz, then fails.
    InsertQuizzes,
    DeleteQuizzes,
    FindAnswerKeys,
    InsertAnswers,
}

#[derive(Default)]
struct Tables {
    texts: Vec<SourceText>,
    quiz_sets: Vec<QuizSet>,
    quizzes: Vec<Quiz>,
    answers: Vec<AnswerRecord>,
}

/// In-process `QuizStore`. Rows live in insertion order; deletes cascade the
/// way the Postgres foreign keys do.
#[derive(Default)]
pub struct MemoryQuizStore {
    tables: Mutex<Tables>,
    failures: Mutex<HashSet<FailPoint>>,
}

/// Row counts per table: `(texts, quiz_sets, quizzes, answers)`.
pub type RowCounts = (usize, usize, usize, usize);

impl MemoryQuizStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every later call of `point` fail.
    pub fn fail_on(&self, point: FailPoint) {
        if let Ok(mut failures) = self.failures.lock() {
            failures.insert(point);
        }
    }

    pub fn row_counts(&self) -> RowCounts {
        match self.tables.lock() {
            Ok(t) => (t.texts.len(), t.quiz_sets.len(), t.quizzes.len(), t.answers.len()),
            Err(_) => (0, 0, 0, 0),
        }
    }

    /// All stored answer records, oldest first.
    pub fn answers(&self) -> Vec<AnswerRecord> {
        self.tables
            .lock()
            .map(|t| t.answers.clone())
            .unwrap_or_default()
    }

    fn check(&self, point: FailPoint) -> Result<(), AppError> {
        let failures = self
            .failures
            .lock()
            .map_err(|e| AppError::InternalServerError(e.to_string()))?;
        if failures.contains(&point) {
            return Err(AppError::InternalServerError(format!(
                "injected failure at {:?}",
                point
            )));
        }
        Ok(())
    }

    fn tables(&self) -> Result<MutexGuard<'_, Tables>, AppError> {
        self.tables
            .lock()
            .map_err(|e| AppError::InternalServerError(e.to_string()))
    }
}

fn remove_quiz_set(tables: &mut Tables, quiz_set_id: Uuid) {
    tables.quiz_sets.retain(|s| s.id != quiz_set_id);
    let removed: HashSet<Uuid> = tables
        .quizzes
        .iter()
        .filter(|q| q.quiz_set_id == quiz_set_id)
        .map(|q| q.id)
        .collect();
    tables.quizzes.retain(|q| q.quiz_set_id != quiz_set_id);
    tables.answers.retain(|a| !removed.contains(&a.quiz_id));
}

#[async_trait]
impl QuizStore for MemoryQuizStore {
    async fn insert_text(&self, user_id: Uuid, content: &str) -> Result<SourceText, AppError> {
        self.check(FailPoint::InsertText)?;
        let text = SourceText {
            id: Uuid::new_v4(),
            user_id,
            content: content.to_string(),
            created_at: Utc::now(),
        };
        self.tables()?.texts.push(text.clone());
        Ok(text)
    }

    async fn delete_text(&self, text_id: Uuid) -> Result<(), AppError> {
        self.check(FailPoint::DeleteText)?;
        let mut tables = self.tables()?;
        let set_ids: Vec<Uuid> = tables
            .quiz_sets
            .iter()
            .filter(|s| s.text_id == text_id)
            .map(|s| s.id)
            .collect();
        for id in set_ids {
            remove_quiz_set(&mut tables, id);
        }
        tables.texts.retain(|t| t.id != text_id);
        Ok(())
    }

    async fn list_texts(&self, user_id: Uuid) -> Result<Vec<SourceText>, AppError> {
        let tables = self.tables()?;
        Ok(tables
            .texts
            .iter()
            .rev()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn insert_quiz_set(&self, text_id: Uuid, quiz_type: &str) -> Result<QuizSet, AppError> {
        self.check(FailPoint::InsertQuizSet)?;
        let mut tables = self.tables()?;
        if !tables.texts.iter().any(|t| t.id == text_id) {
            return Err(AppError::InternalServerError(format!(
                "foreign key violation: text {} does not exist",
                text_id
            )));
        }
        let quiz_set = QuizSet {
            id: Uuid::new_v4(),
            text_id,
            quiz_type: quiz_type.to_string(),
            created_at: Utc::now(),
        };
        tables.quiz_sets.push(quiz_set.clone());
        Ok(quiz_set)
    }

    async fn delete_quiz_set(&self, quiz_set_id: Uuid) -> Result<(), AppError> {
        self.check(FailPoint::DeleteQuizSet)?;
        remove_quiz_set(&mut *self.tables()?, quiz_set_id);
        Ok(())
    }

    async fn find_quiz_set(&self, quiz_set_id: Uuid) -> Result<Option<QuizSetOwner>, AppError> {
        self.check(FailPoint::FindQuizSet)?;
        let tables = self.tables()?;
        let owner = tables
            .quiz_sets
            .iter()
            .find(|s| s.id == quiz_set_id)
            .and_then(|s| {
                tables.texts.iter().find(|t| t.id == s.text_id).map(|t| QuizSetOwner {
                    id: s.id,
                    text_id: t.id,
                    owner_id: t.user_id,
                })
            });
        Ok(owner)
    }

    async fn insert_quizzes(&self, quiz_set_id: Uuid, quizzes: &[NewQuiz]) -> Result<Vec<Quiz>, AppError> {
        let failing = self.check(FailPoint::InsertQuizzes);
        let mut tables = self.tables()?;
        if !tables.quiz_sets.iter().any(|s| s.id == quiz_set_id) {
            return Err(AppError::InternalServerError(format!(
                "foreign key violation: quiz set {} does not exist",
                quiz_set_id
            )));
        }

        let rows: Vec<Quiz> = quizzes
            .iter()
            .map(|quiz| Quiz {
                id: Uuid::new_v4(),
                quiz_set_id,
                quiz_type: quiz.quiz_type.clone(),
                question: quiz.question.clone(),
                correct_answer: quiz.correct_answer.clone(),
                created_at: Utc::now(),
            })
            .collect();

        if let Err(e) = failing {
            // Leave a partial write behind, as a failed non-atomic bulk insert could.
            tables.quizzes.extend(rows.into_iter().take(1));
            return Err(e);
        }

        tables.quizzes.extend(rows.iter().cloned());
        Ok(rows)
    }

    async fn delete_quizzes_by_set(&self, quiz_set_id: Uuid) -> Result<(), AppError> {
        self.check(FailPoint::DeleteQuizzes)?;
        let mut tables = self.tables()?;
        let removed: HashSet<Uuid> = tables
            .quizzes
            .iter()
            .filter(|q| q.quiz_set_id == quiz_set_id)
            .map(|q| q.id)
            .collect();
        tables.quizzes.retain(|q| q.quiz_set_id != quiz_set_id);
        tables.answers.retain(|a| !removed.contains(&a.quiz_id));
        Ok(())
    }

    async fn list_quizzes(&self, quiz_set_id: Uuid) -> Result<Vec<Quiz>, AppError> {
        let tables = self.tables()?;
        Ok(tables
            .quizzes
            .iter()
            .filter(|q| q.quiz_set_id == quiz_set_id)
            .cloned()
            .collect())
    }

    async fn find_answer_keys(&self, quiz_ids: &[Uuid]) -> Result<Vec<AnswerKey>, AppError> {
        self.check(FailPoint::FindAnswerKeys)?;
        let tables = self.tables()?;
        let wanted: HashSet<&Uuid> = quiz_ids.iter().collect();

        let keys = tables
            .quizzes
            .iter()
            .filter(|q| wanted.contains(&q.id))
            .filter_map(|q| {
                let set = tables.quiz_sets.iter().find(|s| s.id == q.quiz_set_id)?;
                let text = tables.texts.iter().find(|t| t.id == set.text_id)?;
                Some(AnswerKey {
                    quiz_id: q.id,
                    quiz_set_id: q.quiz_set_id,
                    correct_answer: q.correct_answer.clone(),
                    owner_id: text.user_id,
                })
            })
            .collect();
        Ok(keys)
    }

    async fn insert_answers(&self, records: &[NewAnswerRecord]) -> Result<(), AppError> {
        self.check(FailPoint::InsertAnswers)?;
        let mut tables = self.tables()?;
        for record in records {
            if !tables.quizzes.iter().any(|q| q.id == record.quiz_id) {
                return Err(AppError::InternalServerError(format!(
                    "foreign key violation: quiz {} does not exist",
                    record.quiz_id
                )));
            }
        }
        let now = Utc::now();
        tables.answers.extend(records.iter().map(|record| AnswerRecord {
            id: Uuid::new_v4(),
            user_id: record.user_id,
            quiz_id: record.quiz_id,
            submitted_answer: record.submitted_answer.clone(),
            is_correct: record.is_correct,
            feedback: Some(record.feedback.clone()),
            created_at: now,
        }));
        Ok(())
    }
}
