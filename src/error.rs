// src/error.rs

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Global Application Error Enum.
/// Centralizes error handling and mapping to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    // 500 Internal Server Error
    #[error("internal server error: {0}")]
    InternalServerError(String),

    // 400 Bad Request
    #[error("bad request: {0}")]
    BadRequest(String),

    // 401 Unauthorized
    #[error("unauthorized: {0}")]
    AuthError(String),

    // 403 Forbidden
    #[error("forbidden: {0}")]
    Forbidden(String),

    // 404 Not Found
    #[error("not found: {0}")]
    NotFound(String),

    // 422 Unprocessable Entity (e.g., the model produced no quiz)
    #[error("unprocessable: {0}")]
    Unprocessable(String),

    // 502 Bad Gateway (generative service failed or answered garbage)
    #[error("bad gateway: {0}")]
    BadGateway(String),
}

/// Implements `IntoResponse` for `AppError`.
/// Converts the error into a JSON response with appropriate HTTP status code.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::AuthError(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Unprocessable(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            AppError::BadGateway(msg) => {
                tracing::warn!("Generative service failure: {}", msg);
                (StatusCode::BAD_GATEWAY, msg)
            }
        };
        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// Converts `sqlx::Error` into `AppError::InternalServerError`.
/// Allows using `?` operator on database queries.
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::InternalServerError(err.to_string())
    }
}

/// Malformed or mistyped JSON bodies share the `{"error": ...}` shape.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(format!("Invalid request body: {}", rejection.body_text()))
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(format!("Invalid path: {}", rejection.body_text()))
    }
}

/// Failures of the quiz generation pipeline (model call and response parsing).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("quiz generation failed: content policy violation ({reason}). {detail}")]
    ContentPolicyBlocked { reason: String, detail: String },

    #[error("generative service returned no content")]
    NoCandidates,

    #[error("generative service request failed: {0}")]
    Request(String),

    #[error("generative service responded with status {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error("generative service returned a non-JSON or malformed JSON response")]
    MalformedResponse,

    #[error("generative service did not return a JSON array")]
    UnexpectedShape,

    #[error("generative service returned quiz items with missing or invalid fields")]
    NoValidItems,
}

impl From<GenerationError> for AppError {
    fn from(err: GenerationError) -> Self {
        match err {
            GenerationError::ContentPolicyBlocked { .. } => AppError::Unprocessable(err.to_string()),
            _ => AppError::BadGateway(err.to_string()),
        }
    }
}

/// Rejections raised while grading a submission.
#[derive(Debug, Error)]
pub enum GradingError {
    #[error("user identity does not match the authenticated session")]
    IdentityMismatch,

    #[error("malformed answers: {0}")]
    MalformedInput(String),

    #[error("quiz {quiz_id} is not part of this quiz set or belongs to another user")]
    OwnershipViolation { quiz_id: uuid::Uuid },

    #[error("some submitted quiz ids are invalid or inaccessible ({found} of {requested} found)")]
    PartialLookup { requested: usize, found: usize },

    #[error(transparent)]
    Storage(#[from] AppError),
}

impl From<GradingError> for AppError {
    fn from(err: GradingError) -> Self {
        match err {
            GradingError::IdentityMismatch | GradingError::OwnershipViolation { .. } => {
                AppError::Forbidden(err.to_string())
            }
            GradingError::MalformedInput(_) | GradingError::PartialLookup { .. } => {
                AppError::BadRequest(err.to_string())
            }
            GradingError::Storage(inner) => inner,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_block_maps_to_unprocessable() {
        let err = GenerationError::ContentPolicyBlocked {
            reason: "SAFETY".to_string(),
            detail: "blocked".to_string(),
        };
        assert!(matches!(AppError::from(err), AppError::Unprocessable(_)));
    }

    #[test]
    fn parse_failures_map_to_bad_gateway() {
        for err in [
            GenerationError::NoCandidates,
            GenerationError::MalformedResponse,
            GenerationError::UnexpectedShape,
            GenerationError::NoValidItems,
        ] {
            assert!(matches!(AppError::from(err), AppError::BadGateway(_)));
        }
    }

    #[test]
    fn grading_errors_keep_their_category() {
        assert!(matches!(
            AppError::from(GradingError::IdentityMismatch),
            AppError::Forbidden(_)
        ));
        assert!(matches!(
            AppError::from(GradingError::PartialLookup { requested: 2, found: 1 }),
            AppError::BadRequest(_)
        ));
        assert!(matches!(
            AppError::from(GradingError::Storage(AppError::InternalServerError("db".into()))),
            AppError::InternalServerError(_)
        ));
    }
}
