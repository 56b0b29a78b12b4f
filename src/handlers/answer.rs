// src/handlers/answer.rs

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

use crate::{
    db::QuizStore,
    error::AppError,
    models::answer::{GradeResponse, SubmitAnswersRequest},
    services::grading::grade_submission,
    utils::jwt::Claims,
};

/// Grades submitted answers for a quiz set.
///
/// * `userId` in the body must match the token subject.
/// * Compares answers case-insensitively after trimming.
/// * Appends one answer record per submitted answer.
pub async fn submit_answers(
    State(store): State<Arc<dyn QuizStore>>,
    Extension(claims): Extension<Claims>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<SubmitAnswersRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    let Path(quiz_set_id) = path?;
    let Json(req) = payload?;

    let results = grade_submission(store.as_ref(), user_id, quiz_set_id, req).await?;

    Ok(Json(GradeResponse { results }))
}
