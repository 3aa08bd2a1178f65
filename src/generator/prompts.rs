//! Prompt templates and personas

use crate::state_machine::state::QUIZ_LENGTH;
use crate::state_machine::{AnswerRecord, Quiz, Topic};

pub const TUTOR_PERSONA: &str = "You are an expert academic tutor.";
pub const JSON_PERSONA: &str = "You are a strict JSON generator.";
pub const MENTOR_PERSONA: &str = "You are a supportive academic mentor.";

pub fn explanation_prompt(topic: &Topic) -> String {
    format!(
        r#"Explain the topic "{topic}" in a detailed and structured manner suitable for a computer science student.

Include:
- Definition
- Core concepts
- Examples
- Advantages and limitations
- Use cases
"#
    )
}

pub fn quiz_prompt(explanation: &str) -> String {
    format!(
        r#"Generate EXACTLY {QUIZ_LENGTH} multiple-choice questions based ONLY on the explanation below.

STRICT RULES:
- Output ONLY valid JSON
- Do NOT add explanations, markdown, or text
- Do NOT wrap in ``` or any formatting
- JSON must start with [ and end with ]
- Every question has exactly 4 options
- "answer" must repeat the text of the correct option exactly

Format:
[
  {{
    "question": "Question text",
    "options": ["Option A", "Option B", "Option C", "Option D"],
    "answer": "Correct option text"
  }}
]

Explanation:
{explanation}
"#
    )
}

pub fn feedback_prompt(topic: &Topic, quiz: &Quiz, answers: &[AnswerRecord]) -> String {
    let quiz_json = serde_json::to_string_pretty(quiz).unwrap_or_else(|_| "[]".to_string());
    let answers_json = serde_json::to_string_pretty(answers).unwrap_or_else(|_| "[]".to_string());

    let mut prompt = format!(
        "Topic: {topic}\n\nQuiz details:\n{quiz_json}\n\nUser answers:\n{answers_json}\n\n"
    );
    if answers.is_empty() {
        prompt.push_str(
            "The user did not answer any questions (the quiz could not be generated). \
             Base your feedback on the topic and suggest how to study it.\n\n",
        );
    }
    prompt.push_str("Give constructive feedback with strengths, weaknesses, and improvement tips.\n");
    prompt
}
