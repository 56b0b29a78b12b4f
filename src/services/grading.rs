// src/services/grading.rs

use std::collections::{HashMap, HashSet};

use uuid::Uuid;

use crate::{
    db::QuizStore,
    error::GradingError,
    models::answer::{AnswerKey, GradedAnswer, NewAnswerRecord, SubmitAnswersRequest},
};

const CORRECT_FEEDBACK: &str = "정답입니다!";

/// Compares an answer against the stored one, ignoring case and surrounding whitespace.
/// Returns whether it is correct and the feedback shown to the user.
pub fn grade_answer(submitted: &str, correct: &str) -> (bool, String) {
    let correct = correct.trim();
    let is_correct = submitted.trim().to_lowercase() == correct.to_lowercase();
    let feedback = if is_correct {
        CORRECT_FEEDBACK.to_string()
    } else {
        format!("오답입니다. 정답은 \"{}\" 입니다.", correct)
    };
    (is_correct, feedback)
}

/// Grades a submission for one quiz set and appends an answer record per item.
///
/// * The asserted `userId` must be the session user; checked before any read.
/// * Every quiz must belong to `quiz_set_id`, and the set to the session user.
/// * Every submitted quiz id must exist and appear only once.
pub async fn grade_submission(
    store: &dyn QuizStore,
    session_user: Uuid,
    quiz_set_id: Uuid,
    request: SubmitAnswersRequest,
) -> Result<Vec<GradedAnswer>, GradingError> {
    if request.user_id != session_user.to_string() {
        tracing::warn!(
            "User ID mismatch: client={}, session={}",
            request.user_id,
            session_user
        );
        return Err(GradingError::IdentityMismatch);
    }

    let quiz_ids = validate_answers(&request)?;

    let unique_ids: Vec<Uuid> = {
        let mut seen = HashSet::new();
        quiz_ids.iter().copied().filter(|id| seen.insert(*id)).collect()
    };

    let keys = store.find_answer_keys(&unique_ids).await?;

    for key in &keys {
        if key.quiz_set_id != quiz_set_id || key.owner_id != session_user {
            tracing::warn!(
                security = true,
                "Security alert: quiz {} (set {}, owner {}) submitted by {} for set {}",
                key.quiz_id,
                key.quiz_set_id,
                key.owner_id,
                session_user,
                quiz_set_id
            );
            return Err(GradingError::OwnershipViolation { quiz_id: key.quiz_id });
        }
    }

    // Repeated ids count against the lookup, so they are rejected too.
    let key_map: HashMap<Uuid, AnswerKey> = keys.into_iter().map(|k| (k.quiz_id, k)).collect();
    if key_map.len() != quiz_ids.len() {
        tracing::warn!(
            "Submitted {} quiz ids but found {}",
            quiz_ids.len(),
            key_map.len()
        );
        return Err(GradingError::PartialLookup {
            requested: quiz_ids.len(),
            found: key_map.len(),
        });
    }

    let mut results = Vec::with_capacity(quiz_ids.len());
    for (quiz_id, answer) in quiz_ids.iter().zip(request.answers) {
        let correct_answer = key_map
            .get(quiz_id)
            .map(|k| k.correct_answer.trim().to_string())
            .unwrap_or_default();
        let (is_correct, feedback) = grade_answer(&answer.submitted_answer, &correct_answer);
        results.push(GradedAnswer {
            quiz_id: *quiz_id,
            submitted_answer: answer.submitted_answer,
            correct_answer,
            is_correct,
            feedback,
        });
    }

    let records: Vec<NewAnswerRecord> = results
        .iter()
        .map(|r| NewAnswerRecord {
            user_id: session_user,
            quiz_id: r.quiz_id,
            submitted_answer: r.submitted_answer.clone(),
            is_correct: r.is_correct,
            feedback: r.feedback.clone(),
        })
        .collect();
    store.insert_answers(&records).await?;

    tracing::info!(
        "Graded {} answers for quiz set {} ({} correct)",
        results.len(),
        quiz_set_id,
        results.iter().filter(|r| r.is_correct).count()
    );

    Ok(results)
}

/// Checks the answers array shape and parses the quiz ids, keeping request order.
fn validate_answers(request: &SubmitAnswersRequest) -> Result<Vec<Uuid>, GradingError> {
    if request.answers.is_empty() {
        return Err(GradingError::MalformedInput(
            "a non-empty \"answers\" array is required".to_string(),
        ));
    }

    request
        .answers
        .iter()
        .map(|answer| {
            let raw = answer.quiz_id.trim();
            if raw.is_empty() {
                return Err(GradingError::MalformedInput(
                    "every answer needs a quizId".to_string(),
                ));
            }
            Uuid::parse_str(raw)
                .map_err(|_| GradingError::MalformedInput(format!("invalid quizId '{}'", raw)))
        })
        .collect()
}
