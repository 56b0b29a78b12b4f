// src/services/quiz_set.rs

use uuid::Uuid;

use crate::{
    db::QuizStore,
    error::AppError,
    models::quiz::{PublicQuiz, QuizSetResponse},
};

/// Loads a quiz set owned by `user_id`, without correct answers.
pub async fn fetch_quiz_set(
    store: &dyn QuizStore,
    user_id: Uuid,
    quiz_set_id: Uuid,
) -> Result<QuizSetResponse, AppError> {
    let quiz_set = store
        .find_quiz_set(quiz_set_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Quiz set {} not found", quiz_set_id)))?;

    if quiz_set.owner_id != user_id {
        tracing::warn!(
            security = true,
            "User {} requested quiz set {} owned by {}",
            user_id,
            quiz_set_id,
            quiz_set.owner_id
        );
        return Err(AppError::Forbidden(
            "You do not have access to this quiz set".to_string(),
        ));
    }

    let quizzes = store.list_quizzes(quiz_set.id).await?;

    Ok(QuizSetResponse {
        quiz_set_id: quiz_set.id,
        quizzes: quizzes.into_iter().map(PublicQuiz::from).collect(),
    })
}
