//! Session runtime executor

use super::view::SessionView;
use super::SseEvent;

use crate::generator::ContentGenerator;
use crate::state_machine::{transition, Effect, Event, Notice, SessionState, TransitionError};
use serde::Serialize;
use std::collections::VecDeque;
use tokio::sync::{broadcast, mpsc, oneshot, watch};

/// One user action plus the channel its outcome is returned on
#[derive(Debug)]
pub struct SessionCommand {
    pub event: Event,
    pub reply: oneshot::Sender<ActionOutcome>,
}

/// What a user action produced once it ran to completion
#[derive(Debug, Clone, Serialize)]
pub struct ActionOutcome {
    /// The action itself was accepted by the state machine
    pub accepted: bool,
    pub notices: Vec<Notice>,
    pub view: SessionView,
}

/// Owns one session's state and drives it one action at a time
pub struct SessionRuntime {
    session_id: String,
    state: SessionState,
    generator: ContentGenerator,
    command_rx: mpsc::Receiver<SessionCommand>,
    broadcast_tx: broadcast::Sender<SseEvent>,
    view_tx: watch::Sender<SessionView>,
}

impl SessionRuntime {
    pub fn new(
        session_id: String,
        generator: ContentGenerator,
        command_rx: mpsc::Receiver<SessionCommand>,
        broadcast_tx: broadcast::Sender<SseEvent>,
        view_tx: watch::Sender<SessionView>,
    ) -> Self {
        Self {
            session_id,
            state: SessionState::default(),
            generator,
            command_rx,
            broadcast_tx,
            view_tx,
        }
    }

    pub async fn run(mut self) {
        tracing::info!(session_id = %self.session_id, "Starting session runtime");

        while let Some(SessionCommand { event, reply }) = self.command_rx.recv().await {
            let outcome = self.handle(event).await;
            if reply.send(outcome).is_err() {
                tracing::debug!(session_id = %self.session_id, "Caller went away before the outcome");
            }
        }

        tracing::info!(session_id = %self.session_id, "Session runtime stopped");
    }

    /// Apply a user event and every generator event it leads to
    pub async fn handle(&mut self, event: Event) -> ActionOutcome {
        let mut notices = Vec::new();
        let mut accepted = true;
        let mut queue = VecDeque::from([event]);
        let mut first = true;

        while let Some(event) = queue.pop_front() {
            let name = event.name();
            match transition(&self.state, event) {
                Ok(result) => {
                    tracing::debug!(
                        session_id = %self.session_id,
                        event = name,
                        from = self.state.phase.label(),
                        to = result.new_state.phase.label(),
                        "Transition"
                    );
                    self.state = result.new_state;
                    self.publish_view();

                    for effect in result.effects {
                        if let Some(next) = self.execute_effect(effect, &mut notices).await {
                            queue.push_back(next);
                        }
                    }
                }
                Err(e) => {
                    let notice = rejection_notice(&e);
                    if e.is_validation() {
                        tracing::debug!(session_id = %self.session_id, event = name, error = %e, "Input rejected");
                    } else {
                        tracing::warn!(session_id = %self.session_id, event = name, error = %e, "Event rejected");
                    }
                    if first {
                        accepted = false;
                    }
                    self.push_notice(notice, &mut notices);
                }
            }
            first = false;
        }

        ActionOutcome {
            accepted,
            notices,
            view: self.view(),
        }
    }

    /// Carry out one effect; generator calls yield the event that reports their result
    async fn execute_effect(&self, effect: Effect, notices: &mut Vec<Notice>) -> Option<Event> {
        match effect {
            Effect::Notify(notice) => {
                self.push_notice(notice, notices);
                None
            }

            Effect::GenerateExplanation { topic } => {
                tracing::info!(session_id = %self.session_id, topic = %topic, "Generating explanation");
                Some(match self.generator.generate_explanation(&topic).await {
                    Ok(text) => Event::ExplanationReady { text },
                    Err(e) => {
                        tracing::warn!(session_id = %self.session_id, error = %e, "Explanation failed");
                        Event::ExplanationFailed {
                            message: e.to_string(),
                        }
                    }
                })
            }

            Effect::GenerateQuiz { explanation } => {
                tracing::info!(session_id = %self.session_id, "Generating quiz");
                Some(match self.generator.generate_quiz(&explanation).await {
                    Ok(quiz) => {
                        tracing::info!(session_id = %self.session_id, questions = quiz.len(), "Quiz ready");
                        Event::QuizReady { quiz }
                    }
                    Err(e) => {
                        tracing::warn!(session_id = %self.session_id, error = %e, "Quiz failed");
                        Event::QuizFailed {
                            message: e.to_string(),
                            raw: e.raw_reply().map(str::to_string),
                        }
                    }
                })
            }

            Effect::GenerateFeedback {
                topic,
                quiz,
                answers,
            } => {
                tracing::info!(
                    session_id = %self.session_id,
                    answered = answers.len(),
                    "Generating feedback"
                );
                Some(
                    match self.generator.generate_feedback(&topic, &quiz, &answers).await {
                        Ok(text) => Event::FeedbackReady { text },
                        Err(e) => {
                            tracing::warn!(session_id = %self.session_id, error = %e, "Feedback failed");
                            Event::FeedbackFailed {
                                message: e.to_string(),
                            }
                        }
                    },
                )
            }
        }
    }

    fn push_notice(&self, notice: Notice, notices: &mut Vec<Notice>) {
        // Nobody listening is fine; the notice still goes back with the action
        let _ = self.broadcast_tx.send(SseEvent::Notice {
            notice: notice.clone(),
        });
        notices.push(notice);
    }

    fn publish_view(&self) {
        let view = self.view();
        let _ = self.broadcast_tx.send(SseEvent::Snapshot { view: view.clone() });
        self.view_tx.send_replace(view);
    }

    fn view(&self) -> SessionView {
        SessionView::from_state(&self.session_id, &self.state)
    }
}

fn rejection_notice(error: &TransitionError) -> Notice {
    if error.is_validation() || matches!(error, TransitionError::Busy) {
        Notice::warning(error.to_string())
    } else {
        Notice::error(error.to_string())
    }
}
