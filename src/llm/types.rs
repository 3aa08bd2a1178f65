//! Common types for LLM interactions

/// Single-turn request: one persona, one prompt
#[derive(Debug, Clone)]
pub struct LlmRequest {
    pub system: String,
    pub prompt: String,
    pub max_tokens: Option<u32>,
}

impl LlmRequest {
    pub fn new(system: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            prompt: prompt.into(),
            max_tokens: None,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// LLM response
#[derive(Debug, Clone, Default)]
pub struct LlmResponse {
    pub text: String,
    /// The reply stopped at the token limit rather than finishing
    pub truncated: bool,
    pub usage: Usage,
}

impl LlmResponse {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }
}

/// Usage statistics
#[derive(Debug, Clone, Default)]
pub struct Usage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_turn_request() {
        let request = LlmRequest::new("You are an expert academic tutor.", "Explain BSTs")
            .with_max_tokens(Some(512));
        assert_eq!(request.system, "You are an expert academic tutor.");
        assert_eq!(request.prompt, "Explain BSTs");
        assert_eq!(request.max_tokens, Some(512));
    }

    #[test]
    fn test_text_response_is_complete() {
        let response = LlmResponse::text("done");
        assert_eq!(response.text, "done");
        assert!(!response.truncated);
    }
}
