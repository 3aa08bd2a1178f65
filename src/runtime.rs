//! Runtime for study sessions
//!
//! Every session owns a `SessionRuntime` task that applies one action at a
//! time. Actions arrive over an mpsc channel and are answered through a
//! oneshot once every generation they triggered has finished.

mod executor;
pub mod view;

#[cfg(test)]
pub mod testing;

pub use executor::{ActionOutcome, SessionCommand, SessionRuntime};
pub use view::SessionView;

use crate::generator::ContentGenerator;
use crate::state_machine::{Event, Notice, SessionState};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, oneshot, watch, RwLock};

/// Events sent to SSE clients
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SseEvent {
    /// Fresh view after a transition
    Snapshot { view: SessionView },
    Notice { notice: Notice },
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session not found: {0}")]
    NotFound(String),
    #[error("Session runtime stopped: {0}")]
    Stopped(String),
}

/// Handle to interact with a running session
#[derive(Clone)]
pub struct SessionHandle {
    pub command_tx: mpsc::Sender<SessionCommand>,
    pub broadcast_tx: broadcast::Sender<SseEvent>,
    pub view_rx: watch::Receiver<SessionView>,
    last_active: Arc<Mutex<Instant>>,
}

impl SessionHandle {
    fn touch(&self) {
        if let Ok(mut last) = self.last_active.lock() {
            *last = Instant::now();
        }
    }

    /// Idle for longer than `max_idle` with no stream attached
    fn is_idle(&self, max_idle: Duration) -> bool {
        let idle_for = self
            .last_active
            .lock()
            .map_or(Duration::ZERO, |last| last.elapsed());
        idle_for > max_idle && self.broadcast_tx.receiver_count() == 0
    }
}

/// Registry of independent sessions keyed by id
pub struct SessionManager {
    generator: ContentGenerator,
    sessions: RwLock<HashMap<String, SessionHandle>>,
}

impl SessionManager {
    pub fn new(generator: ContentGenerator) -> Self {
        Self {
            generator,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Start a fresh idle session and return its id with the initial view
    pub async fn create(&self) -> (String, SessionView) {
        let session_id = uuid::Uuid::new_v4().to_string();
        let initial = SessionView::from_state(&session_id, &SessionState::default());

        let (command_tx, command_rx) = mpsc::channel(32);
        let (broadcast_tx, _) = broadcast::channel(128);
        let (view_tx, view_rx) = watch::channel(initial.clone());

        let runtime = SessionRuntime::new(
            session_id.clone(),
            self.generator.clone(),
            command_rx,
            broadcast_tx.clone(),
            view_tx,
        );
        tokio::spawn(runtime.run());

        self.sessions.write().await.insert(
            session_id.clone(),
            SessionHandle {
                command_tx,
                broadcast_tx,
                view_rx,
                last_active: Arc::new(Mutex::new(Instant::now())),
            },
        );
        let active = self.count().await;
        tracing::info!(session_id = %session_id, active, "Session created");

        (session_id, initial)
    }

    /// Look up a session and mark it as active
    pub async fn get(&self, session_id: &str) -> Result<SessionHandle, SessionError> {
        let handle = self
            .sessions
            .read()
            .await
            .get(session_id)
            .cloned()
            .ok_or_else(|| SessionError::NotFound(session_id.to_string()))?;
        handle.touch();
        Ok(handle)
    }

    /// Queue an action and wait until it has run to completion
    pub async fn dispatch(
        &self,
        session_id: &str,
        event: Event,
    ) -> Result<ActionOutcome, SessionError> {
        let handle = self.get(session_id).await?;
        let (reply, reply_rx) = oneshot::channel();

        handle
            .command_tx
            .send(SessionCommand { event, reply })
            .await
            .map_err(|_| SessionError::Stopped(session_id.to_string()))?;

        reply_rx
            .await
            .map_err(|_| SessionError::Stopped(session_id.to_string()))
    }

    /// Subscribe to session updates, starting with the latest view
    pub async fn subscribe(
        &self,
        session_id: &str,
    ) -> Result<(SessionView, broadcast::Receiver<SseEvent>), SessionError> {
        let handle = self.get(session_id).await?;
        let rx = handle.broadcast_tx.subscribe();
        let current = handle.view_rx.borrow().clone();
        Ok((current, rx))
    }

    /// Drop a session; its runtime stops once pending actions drain
    pub async fn remove(&self, session_id: &str) -> Result<(), SessionError> {
        self.sessions
            .write()
            .await
            .remove(session_id)
            .map(|_| tracing::info!(session_id = %session_id, "Session removed"))
            .ok_or_else(|| SessionError::NotFound(session_id.to_string()))
    }

    pub async fn count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Drop every session untouched for longer than `max_idle`; returns how many went
    pub async fn evict_idle(&self, max_idle: Duration) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|session_id, handle| {
            let keep = !handle.is_idle(max_idle);
            if !keep {
                tracing::info!(session_id = %session_id, "Evicting idle session");
            }
            keep
        });
        before - sessions.len()
    }

    /// Periodically evict idle sessions until the manager is dropped
    pub fn spawn_idle_sweep(self: &Arc<Self>, max_idle: Duration, every: Duration) {
        let manager = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let Some(manager) = manager.upgrade() else {
                    break;
                };
                let evicted = manager.evict_idle(max_idle).await;
                if evicted > 0 {
                    let active = manager.count().await;
                    tracing::info!(evicted, active, "Idle sweep finished");
                }
            }
        });
    }
}
