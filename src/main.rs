//! AI Study Buddy - topic explanations, quizzes and feedback
//!
//! A Rust backend driving a per-session learning state machine against an
//! OpenAI-compatible completion service.

mod api;
mod generator;
mod llm;
mod runtime;
mod state_machine;

use api::{create_router, AppState};
use generator::ContentGenerator;
use llm::LlmConfig;
use runtime::SessionManager;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_SESSION_IDLE: Duration = Duration::from_secs(60 * 60);
const IDLE_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "study_buddy=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    // Configuration
    let port: u16 = std::env::var("STUDY_BUDDY_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8000);

    let llm_config = LlmConfig::from_env();
    if llm_config.has_credentials() {
        tracing::info!(
            model = %llm_config.model,
            endpoint = %llm_config.endpoint,
            timeout_secs = llm_config.timeout.as_secs(),
            "Completion service configured"
        );
    } else {
        tracing::warn!("No API key configured. Set GROQ_API_KEY or STUDY_BUDDY_API_KEY.");
    }

    let session_idle = std::env::var("STUDY_BUDDY_SESSION_IDLE_SECS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .filter(|secs| *secs > 0)
        .map_or(DEFAULT_SESSION_IDLE, Duration::from_secs);

    let generator = ContentGenerator::new(llm_config.build_service(), llm_config.timeout)
        .with_max_tokens(llm_config.max_tokens);
    let sessions = Arc::new(SessionManager::new(generator));
    sessions.spawn_idle_sweep(session_idle, IDLE_SWEEP_INTERVAL);
    tracing::info!(idle_secs = session_idle.as_secs(), "Idle session sweep started");
    let state = AppState::new(sessions);

    // Create router
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let compression = CompressionLayer::new()
        .gzip(true)
        .br(true)
        .deflate(true)
        .zstd(true);

    let app = create_router(state)
        .layer(cors)
        .layer(compression)
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Study buddy listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
