//! Effects produced by state transitions

use super::state::{AnswerRecord, Notice, Quiz, Topic};

/// Effects to be executed after state transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Ask the generator to explain the topic
    GenerateExplanation { topic: Topic },

    /// Ask the generator for a quiz grounded in the explanation
    GenerateQuiz { explanation: String },

    /// Ask the generator for feedback on the finished quiz
    GenerateFeedback {
        topic: Topic,
        quiz: Quiz,
        answers: Vec<AnswerRecord>,
    },

    /// Show a message to the user
    Notify(Notice),
}

impl Effect {
    pub fn notify_success(message: impl Into<String>) -> Self {
        Effect::Notify(Notice::success(message))
    }

    pub fn notify_error(message: impl Into<String>) -> Self {
        Effect::Notify(Notice::error(message))
    }
}
