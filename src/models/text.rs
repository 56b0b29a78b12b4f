// src/models/text.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Represents the 'texts' table in the database.
/// The passage a quiz set was generated from.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceText {
    pub id: Uuid,

    /// Owner of the passage. Ownership of quiz sets and quizzes is derived from it.
    #[serde(skip)]
    pub user_id: Uuid,

    pub content: String,

    pub created_at: chrono::DateTime<chrono::Utc>,
}
