//! Session state types

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of questions requested from the generator
pub const QUIZ_LENGTH: usize = 3;

/// Number of options every question must offer
pub const OPTIONS_PER_QUESTION: usize = 4;

// ============================================================================
// Validation
// ============================================================================

/// User input the machine refuses; the state does not advance.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter a valid topic.")]
    EmptyTopic,
    #[error("Please select an option.")]
    NoSelection,
    #[error("\"{0}\" is not one of the offered options.")]
    UnknownOption(String),
}

// ============================================================================
// Domain values
// ============================================================================

/// A non-empty, trimmed subject string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Topic(String);

impl Topic {
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyTopic);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Trimmed, case-insensitive comparison used for options and answers
pub fn answers_match(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

/// One multiple-choice question, exactly as the generator produced it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizItem {
    pub question: String,
    pub options: Vec<String>,
    pub answer: String,
}

impl QuizItem {
    pub fn new(
        question: impl Into<String>,
        options: impl IntoIterator<Item = impl Into<String>>,
        answer: impl Into<String>,
    ) -> Self {
        Self {
            question: question.into(),
            options: options.into_iter().map(Into::into).collect(),
            answer: answer.into(),
        }
    }

    /// The offered option matching `selected`, if any
    pub fn find_option(&self, selected: &str) -> Option<&str> {
        self.options
            .iter()
            .map(String::as_str)
            .find(|option| answers_match(option, selected))
    }

    pub fn is_correct(&self, selected: &str) -> bool {
        answers_match(selected, &self.answer)
    }

    /// False when `answer` matches none of the options; such an item can
    /// never be answered correctly.
    pub fn is_well_formed(&self) -> bool {
        self.find_option(&self.answer).is_some()
    }
}

/// Ordered questions for one session; replaced wholesale, never edited
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quiz(Vec<QuizItem>);

impl Quiz {
    pub fn new(items: Vec<QuizItem>) -> Self {
        Self(items)
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&QuizItem> {
        self.0.get(index)
    }

    pub fn items(&self) -> &[QuizItem] {
        &self.0
    }
}

/// The user's answer to one question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub question: String,
    pub selected: String,
    pub correct: String,
}

impl AnswerRecord {
    pub fn is_correct(&self) -> bool {
        answers_match(&self.selected, &self.correct)
    }
}

/// Feedback lifecycle; requested at most once per session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FeedbackState {
    #[default]
    NotRequested,
    Pending,
    Ready {
        text: String,
    },
    Failed {
        message: String,
    },
}

impl FeedbackState {
    pub fn text(&self) -> Option<&str> {
        match self {
            FeedbackState::Ready { text } => Some(text),
            _ => None,
        }
    }
}

// ============================================================================
// Notices
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A user-visible message produced while handling an action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Info, message)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Success, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Error, message)
    }
}

// ============================================================================
// Session State
// ============================================================================

/// Which generation call a loading session is waiting on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadingStep {
    Explanation,
    Quiz,
}

/// Session phase
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionPhase {
    /// No topic submitted yet (or the last start failed)
    #[default]
    Idle,

    /// A generation call is in flight
    Loading { step: LoadingStep },

    /// Explanation and quiz ready, first question on screen
    Explaining,

    /// Question `index` on screen; `index >= 1`
    Answering { index: usize },

    /// Every question answered
    Completed,
}

impl SessionPhase {
    /// Index of the question awaiting an answer
    pub fn question_index(self) -> Option<usize> {
        match self {
            SessionPhase::Explaining => Some(0),
            SessionPhase::Answering { index } => Some(index),
            _ => None,
        }
    }

    pub fn is_loading(self) -> bool {
        matches!(self, SessionPhase::Loading { .. })
    }

    pub fn label(self) -> &'static str {
        match self {
            SessionPhase::Idle => "idle",
            SessionPhase::Loading { .. } => "loading",
            SessionPhase::Explaining => "explaining",
            SessionPhase::Answering { .. } => "answering",
            SessionPhase::Completed => "completed",
        }
    }
}

/// Everything one learning session knows
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub phase: SessionPhase,
    pub topic: Option<Topic>,
    pub explanation: String,
    pub quiz: Quiz,
    pub current_index: usize,
    pub answers: Vec<AnswerRecord>,
    pub feedback: FeedbackState,
    /// Raw generator reply kept when the strict quiz parse failed
    pub quiz_fallback: Option<String>,
}

impl SessionState {
    /// Fresh state for a newly started topic; discards everything else
    pub fn loading(topic: Topic) -> Self {
        Self {
            phase: SessionPhase::Loading {
                step: LoadingStep::Explanation,
            },
            topic: Some(topic),
            ..Self::default()
        }
    }

    /// The question currently awaiting an answer
    pub fn current_question(&self) -> Option<&QuizItem> {
        self.phase
            .question_index()
            .and_then(|index| self.quiz.get(index))
    }

    pub fn score(&self) -> usize {
        self.answers.iter().filter(|a| a.is_correct()).count()
    }
}
