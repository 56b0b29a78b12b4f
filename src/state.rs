// src/state.rs

use std::sync::Arc;

use axum::extract::FromRef;

use crate::{config::Config, db::QuizStore, services::gemini::TextGenerator};

/// Shared, immutable handles cloned into every request.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn QuizStore>,
    pub generator: Arc<dyn TextGenerator>,
    pub config: Config,
}

impl FromRef<AppState> for Arc<dyn QuizStore> {
    fn from_ref(state: &AppState) -> Self {
        state.store.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
