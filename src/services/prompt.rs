// src/services/prompt.rs

/// Builds the instruction sent to the generative model.
///
/// Asks for `count` blank-fill quizzes drawn from `text`, returned as a bare
/// JSON array of `{question, correctAnswer, hint, explain}` objects.
/// Pure function of its inputs.
pub fn build_prompt(text: &str, count: usize) -> String {
    format!(
        r#"You are an English teacher who teaches English to Korean learners.
From the text below, select {count} sentences that are meaningful for English study and turn each into a fill-in-the-blank quiz.

Text:
"""
{text}
"""

For each quiz:
1. "question": the passage around the selected sentence, with the selected sentence replaced by a run of underscores (at least four, e.g. "____________").
2. "correctAnswer": the sentence that was replaced.
3. "hint": the Korean translation of correctAnswer.
4. "explain": a short explanation of why this sentence was selected.

IMPORTANT: Respond only with a valid JSON array of objects. Each object must have exactly four string properties: "question", "correctAnswer", "hint" and "explain". Do not include any introduction, explanation or markdown formatting (no code fences) outside the JSON array.
If no sentence in the text is suitable, respond with [].

Example JSON format:
[
  {{
    "question": "\"Annie, look at this!\" Jack called. \"Look what I found!\"\nAnnie had gone up to the hilltop.\n____________________________\n\"Annie, look! A medallion!\"",
    "correctAnswer": "She was busy picking a flower from the magnolia tree.",
    "hint": "그녀는 목련나무에서 꽃을 꺾느라 바빴다.",
    "explain": "A common, useful sentence pattern."
  }}
]"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_is_deterministic() {
        let text = "The cat sat on the mat. It was warm.";
        assert_eq!(build_prompt(text, 3), build_prompt(text, 3));
    }

    #[test]
    fn prompt_embeds_text_and_count() {
        let prompt = build_prompt("She walks to school every day.", 3);
        assert!(prompt.contains("\"\"\"\nShe walks to school every day.\n\"\"\""));
        assert!(prompt.contains("select 3 sentences"));
    }

    #[test]
    fn prompt_names_all_four_fields() {
        let prompt = build_prompt("text", 2);
        for field in ["\"question\"", "\"correctAnswer\"", "\"hint\"", "\"explain\""] {
            assert!(prompt.contains(field), "missing {field}");
        }
        assert!(prompt.contains("select 2 sentences"));
    }

    #[test]
    fn example_in_prompt_is_valid_json() {
        let prompt = build_prompt("text", 1);
        let start = prompt.rfind("\n[\n").unwrap() + 1;
        let example: serde_json::Value = serde_json::from_str(&prompt[start..]).unwrap();
        assert!(example[0]["question"].as_str().unwrap().contains("____"));
    }
}
