// src/handlers/text.rs

use std::sync::Arc;

use axum::{Extension, Json, extract::State, response::IntoResponse};

use crate::{db::QuizStore, error::AppError, utils::jwt::Claims};

/// Lists the current user's source texts, newest first.
pub async fn list_texts(
    State(store): State<Arc<dyn QuizStore>>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    let texts = store.list_texts(user_id).await?;
    Ok(Json(texts))
}
