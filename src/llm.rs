//! LLM provider abstraction
//!
//! The tutor talks to exactly one hosted, OpenAI-compatible chat endpoint
//! (Groq by default). Everything above this module only sees [`LlmService`].

mod config;
mod error;
mod openai;
mod types;

pub use config::LlmConfig;
pub use error::{LlmError, LlmErrorKind};
pub use openai::OpenAIService;
pub use types::*;

use async_trait::async_trait;
use std::sync::Arc;

/// Common interface for LLM providers
#[async_trait]
pub trait LlmService: Send + Sync {
    /// Make a completion request
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError>;

    /// Get the model ID
    fn model_id(&self) -> &str;
}

/// Logging wrapper for LLM services
pub struct LoggingService {
    inner: Arc<dyn LlmService>,
    model_id: String,
}

impl LoggingService {
    pub fn new(inner: Arc<dyn LlmService>) -> Self {
        let model_id = inner.model_id().to_string();
        Self { inner, model_id }
    }
}

#[async_trait]
impl LlmService for LoggingService {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        let start = std::time::Instant::now();
        let result = self.inner.complete(request).await;
        let duration = start.elapsed();

        match &result {
            Ok(response) => {
                tracing::info!(
                    model = %self.model_id,
                    duration_ms = %duration.as_millis(),
                    input_tokens = response.usage.input_tokens,
                    output_tokens = response.usage.output_tokens,
                    "LLM request completed"
                );
            }
            Err(e) => {
                tracing::error!(
                    model = %self.model_id,
                    duration_ms = %duration.as_millis(),
                    error = %e.message,
                    retryable = e.kind.is_retryable(),
                    "LLM request failed"
                );
            }
        }

        result
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

/// Stand-in used when no credential is configured.
///
/// The server still starts; every generation fails with an auth error that
/// the session surfaces to the user.
pub struct UnconfiguredService {
    model_id: String,
}

impl UnconfiguredService {
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
        }
    }
}

#[async_trait]
impl LlmService for UnconfiguredService {
    async fn complete(&self, _request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        Err(LlmError::auth(
            "No API key configured. Set GROQ_API_KEY or STUDY_BUDDY_API_KEY.",
        ))
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unconfigured_service_fails_with_auth() {
        let service = UnconfiguredService::new("llama-3.1-8b-instant");
        let request = LlmRequest::new("system", "prompt");

        let err = service.complete(&request).await.unwrap_err();
        assert_eq!(err.kind, LlmErrorKind::Auth);
        assert!(!err.kind.is_retryable());
        assert_eq!(service.model_id(), "llama-3.1-8b-instant");
    }

    #[tokio::test]
    async fn test_logging_service_passes_through() {
        let inner: Arc<dyn LlmService> = Arc::new(UnconfiguredService::new("m"));
        let logged = LoggingService::new(inner);
        assert_eq!(logged.model_id(), "m");
        assert!(logged
            .complete(&LlmRequest::new("s", "p"))
            .await
            .is_err());
    }
}
