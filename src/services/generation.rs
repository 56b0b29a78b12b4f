// src/services/generation.rs

use uuid::Uuid;

use crate::{
    config::QUIZ_TYPE,
    db::QuizStore,
    error::AppError,
    models::quiz::{NewQuiz, PublicQuiz, QuizSetResponse},
    services::{
        gemini::TextGenerator,
        parser::{QuizCandidate, parse_quiz_response},
        prompt::build_prompt,
    },
};

/// Generates and stores a quiz set for `text` on behalf of `user_id`.
///
/// Writes happen in order: text, quiz set, quizzes. When a step fails,
/// everything written before it in this call is deleted again (newest first)
/// and the original error is returned. Correct answers are not part of the
/// response.
pub async fn generate_quiz_set(
    store: &dyn QuizStore,
    generator: &dyn TextGenerator,
    user_id: Uuid,
    text: &str,
    count: usize,
) -> Result<QuizSetResponse, AppError> {
    // 1. Source text
    let source = store.insert_text(user_id, text).await?;

    // 2. Quiz set
    let quiz_set = match store.insert_quiz_set(source.id, QUIZ_TYPE).await {
        Ok(quiz_set) => quiz_set,
        Err(e) => {
            rollback(store, None, source.id).await;
            return Err(e);
        }
    };

    // 3. Model call + parsing
    let candidates = match request_candidates(generator, text, count).await {
        Ok(candidates) if candidates.is_empty() => {
            rollback(store, Some(quiz_set.id), source.id).await;
            return Err(AppError::Unprocessable(
                "Could not generate a quiz: the generative model found no suitable sentences in the provided text."
                    .to_string(),
            ));
        }
        Ok(candidates) => candidates,
        Err(e) => {
            rollback(store, Some(quiz_set.id), source.id).await;
            return Err(e);
        }
    };

    // 4. Quizzes
    let new_quizzes: Vec<NewQuiz> = candidates
        .into_iter()
        .map(|c| NewQuiz {
            quiz_type: QUIZ_TYPE.to_string(),
            question: c.question,
            correct_answer: c.correct_answer,
        })
        .collect();

    let saved = match store.insert_quizzes(quiz_set.id, &new_quizzes).await {
        Ok(saved) => saved,
        Err(e) => {
            if let Err(cleanup) = store.delete_quizzes_by_set(quiz_set.id).await {
                tracing::error!(
                    "Rollback failed: could not delete quizzes of set {}: {}",
                    quiz_set.id,
                    cleanup
                );
            }
            rollback(store, Some(quiz_set.id), source.id).await;
            return Err(e);
        }
    };

    tracing::info!(
        "Generated quiz set {} with {} quizzes for user {}",
        quiz_set.id,
        saved.len(),
        user_id
    );

    Ok(QuizSetResponse {
        quiz_set_id: quiz_set.id,
        quizzes: saved.into_iter().map(PublicQuiz::from).collect(),
    })
}

async fn request_candidates(
    generator: &dyn TextGenerator,
    text: &str,
    count: usize,
) -> Result<Vec<QuizCandidate>, AppError> {
    let prompt = build_prompt(text, count);
    let raw = generator.generate(&prompt).await?;
    let candidates = parse_quiz_response(&raw, count)?;
    Ok(candidates)
}

/// Best-effort compensating deletes. Failures are logged only.
async fn rollback(store: &dyn QuizStore, quiz_set_id: Option<Uuid>, text_id: Uuid) {
    if let Some(quiz_set_id) = quiz_set_id {
        if let Err(e) = store.delete_quiz_set(quiz_set_id).await {
            tracing::error!("Rollback failed: could not delete quiz set {}: {}", quiz_set_id, e);
        }
    }
    if let Err(e) = store.delete_text(text_id).await {
        tracing::error!("Rollback failed: could not delete text {}: {}", text_id, e);
    }
}
