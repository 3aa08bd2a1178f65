//! Pure state transition function
//!
//! Given the same state and event this always yields the same result; all
//! I/O is described by the returned effects and carried out by the runtime.

use super::state::{
    AnswerRecord, FeedbackState, LoadingStep, Notice, Quiz, SessionPhase, SessionState, Topic,
    ValidationError, QUIZ_LENGTH,
};
use super::{Effect, Event};
use thiserror::Error;

pub const QUIZ_FAILED_MESSAGE: &str =
    "⚠️ AI failed to generate quiz questions. Please click Start Learning again.";
pub const CORRECT_MESSAGE: &str = "✅ Correct!";
pub const COMPLETED_MESSAGE: &str = "🎉 Quiz completed! Keep learning 🚀";

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: SessionState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: SessionState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Errors that can occur during transition
#[derive(Debug, Error)]
pub enum TransitionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Still generating, please wait")]
    Busy,
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

impl TransitionError {
    pub fn is_validation(&self) -> bool {
        matches!(self, TransitionError::Validation(_))
    }
}

/// Pure transition function
pub fn transition(state: &SessionState, event: Event) -> Result<TransitionResult, TransitionError> {
    match (state.phase, event) {
        // ============================================================
        // Start: any phase, full reset
        // ============================================================
        (_, Event::Start { topic }) => {
            let topic = Topic::parse(&topic)?;
            Ok(
                TransitionResult::new(SessionState::loading(topic.clone()))
                    .with_effect(Effect::GenerateExplanation { topic }),
            )
        }

        // ============================================================
        // Loading
        // ============================================================
        (
            SessionPhase::Loading {
                step: LoadingStep::Explanation,
            },
            Event::ExplanationReady { text },
        ) => {
            let new_state = SessionState {
                phase: SessionPhase::Loading {
                    step: LoadingStep::Quiz,
                },
                explanation: text.clone(),
                ..state.clone()
            };
            Ok(TransitionResult::new(new_state).with_effect(Effect::GenerateQuiz { explanation: text }))
        }

        (
            SessionPhase::Loading {
                step: LoadingStep::Explanation,
            },
            Event::ExplanationFailed { message },
        ) => Ok(TransitionResult::new(SessionState::default())
            .with_effect(Effect::notify_error(format!(
                "Could not generate an explanation: {message}"
            )))),

        (
            SessionPhase::Loading {
                step: LoadingStep::Quiz,
            },
            Event::QuizReady { quiz },
        ) => {
            let new_state = SessionState {
                quiz,
                current_index: 0,
                answers: vec![],
                feedback: FeedbackState::NotRequested,
                quiz_fallback: None,
                ..state.clone()
            };
            if new_state.quiz.is_empty() {
                return enter_completed(new_state, vec![]);
            }
            let count = new_state.quiz.len();
            let result = TransitionResult::new(SessionState {
                phase: SessionPhase::Explaining,
                ..new_state
            });
            if count == QUIZ_LENGTH {
                return Ok(result);
            }
            Ok(result.with_effect(Effect::Notify(Notice::info(format!(
                "The quiz has {count} questions instead of {QUIZ_LENGTH}."
            )))))
        }

        (
            SessionPhase::Loading {
                step: LoadingStep::Quiz,
            },
            Event::QuizFailed { raw, .. },
        ) => {
            let new_state = SessionState {
                quiz: Quiz::empty(),
                current_index: 0,
                answers: vec![],
                feedback: FeedbackState::NotRequested,
                quiz_fallback: raw.filter(|r| !r.trim().is_empty()),
                ..state.clone()
            };
            enter_completed(new_state, vec![Effect::notify_error(QUIZ_FAILED_MESSAGE)])
        }

        (SessionPhase::Loading { .. }, Event::Submit { .. }) => Err(TransitionError::Busy),

        // ============================================================
        // Answering
        // ============================================================
        (SessionPhase::Explaining | SessionPhase::Answering { .. }, Event::Submit { selected }) => {
            submit_answer(state, selected)
        }

        (_, Event::Submit { .. }) => Err(TransitionError::InvalidTransition(
            "No question is awaiting an answer".to_string(),
        )),

        // ============================================================
        // Completion and feedback
        // ============================================================

        (_, Event::Refresh) => Ok(TransitionResult::new(state.clone())),

        (SessionPhase::Completed, Event::FeedbackReady { text })
            if state.feedback == FeedbackState::Pending =>
        {
            Ok(TransitionResult::new(SessionState {
                feedback: FeedbackState::Ready { text },
                ..state.clone()
            })
            .with_effect(Effect::notify_success(COMPLETED_MESSAGE)))
        }

        (SessionPhase::Completed, Event::FeedbackFailed { message })
            if state.feedback == FeedbackState::Pending =>
        {
            Ok(TransitionResult::new(SessionState {
                feedback: FeedbackState::Failed {
                    message: message.clone(),
                },
                ..state.clone()
            })
            .with_effect(Effect::notify_error(format!(
                "Could not generate feedback: {message}"
            ))))
        }

        // ============================================================
        // Generator results that do not match the current phase
        // ============================================================
        (phase, event) => Err(TransitionError::InvalidTransition(format!(
            "{} while {}",
            event.name(),
            phase.label()
        ))),
    }
}

/// Record an answer to the current question and advance
fn submit_answer(
    state: &SessionState,
    selected: Option<String>,
) -> Result<TransitionResult, TransitionError> {
    let selected = selected
        .filter(|s| !s.trim().is_empty())
        .ok_or(ValidationError::NoSelection)?;

    let index = state.current_index;
    let item = state.quiz.get(index).ok_or_else(|| {
        TransitionError::InvalidTransition(format!("No question at index {index}"))
    })?;
    let option = item
        .find_option(&selected)
        .ok_or_else(|| ValidationError::UnknownOption(selected.clone()))?;

    let correct = item.is_correct(option);
    let notice = if correct {
        Effect::notify_success(CORRECT_MESSAGE)
    } else {
        Effect::notify_error(format!("❌ Incorrect. Correct answer: {}", item.answer))
    };

    let mut answers = state.answers.clone();
    answers.push(AnswerRecord {
        question: item.question.clone(),
        selected: option.to_string(),
        correct: item.answer.clone(),
    });

    let next = index + 1;
    let new_state = SessionState {
        current_index: next,
        answers,
        ..state.clone()
    };

    if next >= state.quiz.len() {
        return enter_completed(new_state, vec![notice]);
    }

    Ok(TransitionResult::new(SessionState {
        phase: SessionPhase::Answering { index: next },
        ..new_state
    })
    .with_effect(notice))
}

/// Move to `Completed` and request feedback exactly once
fn enter_completed(
    state: SessionState,
    mut effects: Vec<Effect>,
) -> Result<TransitionResult, TransitionError> {
    let topic = state.topic.clone().ok_or_else(|| {
        TransitionError::InvalidTransition("Completed session has no topic".to_string())
    })?;

    effects.push(Effect::GenerateFeedback {
        topic,
        quiz: state.quiz.clone(),
        answers: state.answers.clone(),
    });

    Ok(TransitionResult {
        new_state: SessionState {
            phase: SessionPhase::Completed,
            current_index: state.answers.len(),
            feedback: FeedbackState::Pending,
            ..state
        },
        effects,
    })
}
