//! Strict parsing of the quiz wire format
//!
//! The reply must be, after trimming, a JSON array of objects with a string
//! `question`, an `options` array of exactly four strings and a string
//! `answer`. Anything else is rejected as a whole; a half-parsed quiz is
//! never returned.

use crate::state_machine::state::{OPTIONS_PER_QUESTION, QUIZ_LENGTH};
use crate::state_machine::{Quiz, QuizItem};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuizParseError {
    #[error("reply is not valid JSON: {0}")]
    InvalidJson(String),
    #[error("reply is JSON but not an array")]
    NotAnArray,
    #[error("question {index} is not an object")]
    NotAnObject { index: usize },
    #[error("question {index} is malformed: {reason}")]
    InvalidItem { index: usize, reason: String },
    #[error("question {index} has {count} options, expected {}", OPTIONS_PER_QUESTION)]
    WrongOptionCount { index: usize, count: usize },
}

pub fn parse_quiz(raw: &str) -> Result<Quiz, QuizParseError> {
    let value: Value = serde_json::from_str(raw.trim())
        .map_err(|e| QuizParseError::InvalidJson(e.to_string()))?;

    let Value::Array(elements) = value else {
        return Err(QuizParseError::NotAnArray);
    };

    let mut items = Vec::with_capacity(elements.len());
    for (index, element) in elements.into_iter().enumerate() {
        if !element.is_object() {
            return Err(QuizParseError::NotAnObject { index });
        }
        let item: QuizItem =
            serde_json::from_value(element).map_err(|e| QuizParseError::InvalidItem {
                index,
                reason: e.to_string(),
            })?;
        if item.options.len() != OPTIONS_PER_QUESTION {
            return Err(QuizParseError::WrongOptionCount {
                index,
                count: item.options.len(),
            });
        }
        if !item.is_well_formed() {
            tracing::warn!(
                index,
                question = %item.question,
                answer = %item.answer,
                "Quiz answer matches none of its options"
            );
        }
        items.push(item);
    }

    if items.len() != QUIZ_LENGTH {
        tracing::warn!(
            expected = QUIZ_LENGTH,
            received = items.len(),
            "Quiz has an unexpected number of questions, using it as is"
        );
    }

    Ok(Quiz::new(items))
}
