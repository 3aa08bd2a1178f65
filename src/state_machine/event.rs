//! Events that can occur in a session

use super::state::Quiz;

/// Events that trigger state transitions
#[derive(Debug, Clone)]
pub enum Event {
    // User events
    Start {
        topic: String,
    },
    Submit {
        selected: Option<String>,
    },
    /// The UI re-rendered; never causes a second feedback request
    Refresh,

    // Generator events
    ExplanationReady {
        text: String,
    },
    ExplanationFailed {
        message: String,
    },
    QuizReady {
        quiz: Quiz,
    },
    QuizFailed {
        message: String,
        /// Freeform reply kept for display when it was not valid quiz JSON
        raw: Option<String>,
    },
    FeedbackReady {
        text: String,
    },
    FeedbackFailed {
        message: String,
    },
}

impl Event {
    pub fn start(topic: impl Into<String>) -> Self {
        Event::Start {
            topic: topic.into(),
        }
    }

    pub fn submit(selected: impl Into<String>) -> Self {
        Event::Submit {
            selected: Some(selected.into()),
        }
    }

    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Event::Start { .. } => "start",
            Event::Submit { .. } => "submit",
            Event::Refresh => "refresh",
            Event::ExplanationReady { .. } => "explanation_ready",
            Event::ExplanationFailed { .. } => "explanation_failed",
            Event::QuizReady { .. } => "quiz_ready",
            Event::QuizFailed { .. } => "quiz_failed",
            Event::FeedbackReady { .. } => "feedback_ready",
            Event::FeedbackFailed { .. } => "feedback_failed",
        }
    }
}
