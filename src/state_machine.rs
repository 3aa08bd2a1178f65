//! Quiz session state machine
//!
//! Implements the Elm Architecture pattern with pure state transitions:
//! `transition(state, event)` returns the next state plus the effects the
//! runtime must carry out.

mod effect;
pub mod event;
pub mod state;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use effect::Effect;
pub use event::Event;
pub use state::{
    AnswerRecord, FeedbackState, Notice, NoticeLevel, Quiz, QuizItem, SessionPhase, SessionState,
    Topic,
};
pub use transition::{transition, TransitionError};
