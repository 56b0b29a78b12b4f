// src/services/parser.rs

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::error::GenerationError;

/// Four or more underscores mark the span the learner fills in.
static BLANK_MARKER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"_{4,}").expect("valid regex"));

/// First `[` or `{` through the last matching closer, across newlines.
static JSON_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)(\[.*\]|\{.*\})").expect("valid regex"));

/// A quiz produced by the model that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizCandidate {
    pub question: String,
    pub correct_answer: String,
    pub hint: Option<String>,
    pub explain: Option<String>,
}

pub fn has_blank_marker(question: &str) -> bool {
    BLANK_MARKER.is_match(question)
}

/// Parses raw model output into at most `count` validated quizzes.
///
/// * Tolerates markdown code fences and prose around the JSON.
/// * `[]` is a valid answer meaning "nothing suitable" and yields an empty list.
/// * Invalid elements are dropped; it is only an error when every element is invalid.
pub fn parse_quiz_response(raw: &str, count: usize) -> Result<Vec<QuizCandidate>, GenerationError> {
    let cleaned = strip_code_fence(raw);

    if cleaned == "[]" {
        tracing::warn!("Model indicated no suitable quizzes could be generated (returned '[]')");
        return Ok(Vec::new());
    }

    let parsed = parse_json(cleaned)?;

    let items = match parsed {
        Value::Array(items) => items,
        other => {
            tracing::error!("Parsed response is not an array: {}", other);
            return Err(GenerationError::UnexpectedShape);
        }
    };

    let total = items.len();
    let mut validated: Vec<QuizCandidate> = items.iter().filter_map(validate_item).collect();

    if validated.is_empty() && total > 0 {
        tracing::error!("Model returned {} items, but none passed validation", total);
        return Err(GenerationError::NoValidItems);
    }

    validated.truncate(count);
    Ok(validated)
}

/// Trims and removes a leading ```` ```lang ```` and a trailing ```` ``` ```` fence.
fn strip_code_fence(raw: &str) -> &str {
    let mut text = raw.trim();

    if let Some(rest) = text.strip_prefix("```") {
        let tag_len = rest
            .find(|c: char| !c.is_ascii_alphanumeric())
            .unwrap_or(rest.len());
        text = rest[tag_len..].trim_start();
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest.trim_end();
    }

    text
}

fn parse_json(cleaned: &str) -> Result<Value, GenerationError> {
    let first_error = match serde_json::from_str::<Value>(cleaned) {
        Ok(value) => return Ok(value),
        Err(e) => e,
    };
    tracing::warn!(
        "Failed to parse model response as JSON ({}); trying to extract a JSON segment",
        first_error
    );

    let Some(segment) = JSON_SPAN.find(cleaned) else {
        tracing::error!("No JSON-like segment in model response: {}", cleaned);
        return Err(GenerationError::MalformedResponse);
    };

    serde_json::from_str::<Value>(segment.as_str()).map_err(|e| {
        tracing::error!("Failed to parse extracted JSON segment as well: {}", e);
        GenerationError::MalformedResponse
    })
}

fn validate_item(item: &Value) -> Option<QuizCandidate> {
    let Some(record) = item.as_object() else {
        tracing::warn!("Parsed item is not an object. Skipping: {}", item);
        return None;
    };

    let question = non_empty_str(record.get("question"));
    let answer = non_empty_str(record.get("correctAnswer"));
    let (Some(question), Some(correct_answer)) = (question, answer) else {
        tracing::warn!("Invalid or missing 'question' / 'correctAnswer' fields: {}", item);
        return None;
    };

    if !has_blank_marker(question) {
        tracing::warn!("Generated question has no blank marker. Skipping: {}", question);
        return None;
    }

    Some(QuizCandidate {
        question: question.to_string(),
        correct_answer: correct_answer.to_string(),
        hint: optional_str(record.get("hint")),
        explain: optional_str(record.get("explain")),
    })
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn optional_str(value: Option<&Value>) -> Option<String> {
    non_empty_str(value).map(str::to_string)
}
