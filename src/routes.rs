// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{answer, quiz, text},
    state::AppState,
    utils::jwt::auth_middleware,
};

/// Assembles the main application router.
///
/// * Every route requires a verified bearer token.
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (store, generator, config).
pub fn create_router(state: AppState) -> Router {
    let origins = [
        HeaderValue::from_static("http://localhost:3000"),
        HeaderValue::from_static("http://127.0.0.1:3000"),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    let quiz_routes = Router::new().route("/generate", post(quiz::generate_quiz));

    let quiz_set_routes = Router::new()
        .route("/{quiz_set_id}", get(quiz::get_quiz_set))
        .route("/{quiz_set_id}/answers", post(answer::submit_answers));

    let text_routes = Router::new().route("/", get(text::list_texts));

    Router::new()
        .nest("/api/quiz", quiz_routes)
        .nest("/api/quizsets", quiz_set_routes)
        .nest("/api/texts", text_routes)
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
