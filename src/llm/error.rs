//! Completion service errors

use std::time::Duration;
use thiserror::Error;

/// A failed completion call, classified so the user can tell whether
/// clicking again is likely to help
#[derive(Debug, Clone, Error)]
#[error("{message}{}", retry_hint(.retry_after))]
pub struct LlmError {
    pub kind: LlmErrorKind,
    pub message: String,
    /// Server-requested wait before the next attempt (HTTP `Retry-After`)
    pub retry_after: Option<Duration>,
}

fn retry_hint(retry_after: &Option<Duration>) -> String {
    retry_after.map_or_else(String::new, |after| {
        format!(" (try again in {}s)", after.as_secs().max(1))
    })
}

impl LlmError {
    fn new(kind: LlmErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            retry_after: None,
        }
    }

    pub fn with_retry_after(mut self, after: Duration) -> Self {
        self.retry_after = Some(after);
        self
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::Network, message)
    }

    pub fn rate_limit(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::RateLimit, message)
    }

    pub fn server_error(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::ServerError, message)
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::Auth, message)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::InvalidRequest, message)
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::Unknown, message)
    }
}

/// Nothing retries automatically; this only feeds logs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmErrorKind {
    Network,
    /// 429
    RateLimit,
    /// 5xx
    ServerError,
    /// 401, 403 or no key configured
    Auth,
    /// 400
    InvalidRequest,
    Unknown,
}

impl LlmErrorKind {
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::Network | Self::RateLimit | Self::ServerError)
    }
}
