//! HTTP request handlers

use super::assets::{get_index_html, serve_static};
use super::sse::sse_stream;
use super::types::{
    AnswerRequest, ErrorResponse, SessionCreatedResponse, StartRequest, SuccessResponse,
};
use super::AppState;
use crate::runtime::{ActionOutcome, SessionError};
use crate::state_machine::Event;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Root serves the single-page UI
        .route("/", get(serve_spa))
        .route("/assets/*path", get(serve_static))
        // Session lifecycle
        .route("/api/sessions", post(create_session))
        .route("/api/sessions/:id", get(refresh_session).delete(delete_session))
        // User actions
        .route("/api/sessions/:id/start", post(start_session))
        .route("/api/sessions/:id/answer", post(submit_answer))
        // SSE streaming
        .route("/api/sessions/:id/stream", get(stream_session))
        .route("/version", get(get_version))
        .with_state(state)
}

// ============================================================
// SPA Handler
// ============================================================

async fn serve_spa() -> impl IntoResponse {
    match get_index_html() {
        Some(content) => Html(content).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Html("<h1>404 - UI not found</h1>".to_string()),
        )
            .into_response(),
    }
}

// ============================================================
// Sessions
// ============================================================

async fn create_session(State(state): State<AppState>) -> Json<SessionCreatedResponse> {
    let (session_id, view) = state.sessions.create().await;
    Json(SessionCreatedResponse { session_id, view })
}

/// Re-render: an idempotent refresh through the session
async fn refresh_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ActionOutcome>, AppError> {
    Ok(Json(state.sessions.dispatch(&id, Event::Refresh).await?))
}

async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, AppError> {
    state.sessions.remove(&id).await?;
    Ok(Json(SuccessResponse { success: true }))
}

// ============================================================
// User Actions
// ============================================================

async fn start_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<StartRequest>,
) -> Result<Json<ActionOutcome>, AppError> {
    let outcome = state
        .sessions
        .dispatch(&id, Event::Start { topic: req.topic })
        .await?;
    Ok(Json(outcome))
}

async fn submit_answer(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<AnswerRequest>,
) -> Result<Json<ActionOutcome>, AppError> {
    let outcome = state
        .sessions
        .dispatch(
            &id,
            Event::Submit {
                selected: req.selected,
            },
        )
        .await?;
    Ok(Json(outcome))
}

// ============================================================
// SSE Streaming
// ============================================================

async fn stream_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let (current, broadcast_rx) = state.sessions.subscribe(&id).await?;
    Ok(sse_stream(current, broadcast_rx))
}

async fn get_version() -> &'static str {
    concat!("study-buddy ", env!("CARGO_PKG_VERSION"))
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug)]
enum AppError {
    NotFound(String),
    Internal(String),
}

impl From<SessionError> for AppError {
    fn from(e: SessionError) -> Self {
        match e {
            SessionError::NotFound(_) => AppError::NotFound(e.to_string()),
            SessionError::Stopped(_) => AppError::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
