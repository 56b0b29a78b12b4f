// src/handlers/quiz.rs

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    response::IntoResponse,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    config::QUIZ_ITEM_COUNT,
    db::QuizStore,
    error::AppError,
    models::quiz::GenerateQuizRequest,
    services::{generation::generate_quiz_set, quiz_set::fetch_quiz_set},
    state::AppState,
    utils::jwt::Claims,
};

/// Generates a fill-in-the-blank quiz set from a passage.
///
/// * Validates the passage (non-empty after trimming, bounded length).
/// * Stores the text, asks the model for quizzes and stores them.
/// * Returns quiz ids and questions only; answers stay on the server.
pub async fn generate_quiz(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    payload: Result<Json<GenerateQuizRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    let Json(req) = payload?;

    if let Err(validation_errors) = req.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let text = req.text.trim();
    if text.is_empty() {
        return Err(AppError::BadRequest(
            "A non-empty \"text\" field is required".to_string(),
        ));
    }

    let response = generate_quiz_set(
        state.store.as_ref(),
        state.generator.as_ref(),
        user_id,
        text,
        QUIZ_ITEM_COUNT,
    )
    .await?;

    Ok(Json(response))
}

/// Returns a quiz set of the current user, without correct answers.
pub async fn get_quiz_set(
    State(store): State<Arc<dyn QuizStore>>,
    Extension(claims): Extension<Claims>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    let Path(quiz_set_id) = path?;
    let quiz_set = fetch_quiz_set(store.as_ref(), user_id, quiz_set_id).await?;
    Ok(Json(quiz_set))
}
