//! Content generation: explanation, quiz and feedback
//!
//! Each operation builds one prompt, makes one bounded call to the
//! completion service and shapes the result. Nothing is cached or retried.

pub(crate) mod prompts;
mod quiz;

pub use quiz::{parse_quiz, QuizParseError};

use crate::llm::{LlmError, LlmRequest, LlmService};
use crate::state_machine::{AnswerRecord, Quiz, Topic};
use prompts::{JSON_PERSONA, MENTOR_PERSONA, TUTOR_PERSONA};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::timeout;

/// A generation call that produced nothing usable
#[derive(Debug, Clone, Error)]
pub enum GenerationError {
    #[error(transparent)]
    Llm(#[from] LlmError),
    #[error("Generation timed out after {}s", .0.as_secs())]
    Timeout(Duration),
    #[error("The model returned an empty reply")]
    EmptyReply,
    #[error("The quiz could not be read: {source}")]
    MalformedQuiz {
        source: QuizParseError,
        /// The reply as received, kept for freeform display
        raw: String,
    },
}

impl GenerationError {
    /// Raw reply worth showing to the user, if any
    pub fn raw_reply(&self) -> Option<&str> {
        match self {
            GenerationError::MalformedQuiz { raw, .. } => Some(raw),
            _ => None,
        }
    }
}

/// Builds prompts and talks to the completion service
#[derive(Clone)]
pub struct ContentGenerator {
    llm: Arc<dyn LlmService>,
    timeout: Duration,
    max_tokens: Option<u32>,
}

impl ContentGenerator {
    pub fn new(llm: Arc<dyn LlmService>, timeout: Duration) -> Self {
        Self {
            llm,
            timeout,
            max_tokens: None,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub async fn generate_explanation(&self, topic: &Topic) -> Result<String, GenerationError> {
        self.generate(&prompts::explanation_prompt(topic), TUTOR_PERSONA)
            .await
    }

    /// Ask for a quiz grounded in `explanation` and parse it strictly
    pub async fn generate_quiz(&self, explanation: &str) -> Result<Quiz, GenerationError> {
        let raw = self
            .generate(&prompts::quiz_prompt(explanation), JSON_PERSONA)
            .await?;

        parse_quiz(&raw).map_err(|source| {
            tracing::warn!(error = %source, reply_len = raw.len(), "Quiz reply rejected");
            GenerationError::MalformedQuiz { source, raw }
        })
    }

    pub async fn generate_feedback(
        &self,
        topic: &Topic,
        quiz: &Quiz,
        answers: &[AnswerRecord],
    ) -> Result<String, GenerationError> {
        self.generate(&prompts::feedback_prompt(topic, quiz, answers), MENTOR_PERSONA)
            .await
    }

    /// The single outbound capability: prompt + persona in, text out
    async fn generate(&self, prompt: &str, persona: &str) -> Result<String, GenerationError> {
        let request = LlmRequest::new(persona, prompt).with_max_tokens(self.max_tokens);

        let response = match timeout(self.timeout, self.llm.complete(&request)).await {
            Ok(result) => result?,
            Err(_) => {
                tracing::warn!(timeout_secs = self.timeout.as_secs(), persona, "Generation timed out");
                return Err(GenerationError::Timeout(self.timeout));
            }
        };

        if response.text.trim().is_empty() {
            return Err(GenerationError::EmptyReply);
        }
        if response.truncated {
            tracing::warn!(
                persona,
                max_tokens = ?self.max_tokens,
                "Reply stopped at the token limit"
            );
        }
        Ok(response.text)
    }
}
