//! API request and response types

use crate::runtime::SessionView;
use serde::{Deserialize, Serialize};

/// Request to start learning a topic
#[derive(Debug, Deserialize)]
pub struct StartRequest {
    pub topic: String,
}

/// Request to answer the current question; `null` means nothing was selected
#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    #[serde(default)]
    pub selected: Option<String>,
}

/// Response for session creation
#[derive(Debug, Serialize)]
pub struct SessionCreatedResponse {
    pub session_id: String,
    pub view: SessionView,
}

/// Response for simple actions
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
