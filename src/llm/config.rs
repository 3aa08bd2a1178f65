//! Configuration for the completion service

use super::{LlmService, LoggingService, OpenAIService, UnconfiguredService};
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://api.groq.com/openai/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "llama-3.1-8b-instant";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Configuration for the LLM provider
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: Option<String>,
    /// OpenAI-compatible chat completions endpoint
    pub endpoint: String,
    pub model: String,
    /// Upper bound on a single generation, including the HTTP round trip
    pub timeout: Duration,
    pub max_tokens: Option<u32>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            max_tokens: None,
        }
    }
}

impl LlmConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup (the environment in production)
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            api_key: non_empty("STUDY_BUDDY_API_KEY").or_else(|| non_empty("GROQ_API_KEY")),
            endpoint: non_empty("STUDY_BUDDY_LLM_URL").unwrap_or(defaults.endpoint),
            model: non_empty("STUDY_BUDDY_MODEL").unwrap_or(defaults.model),
            timeout: non_empty("STUDY_BUDDY_LLM_TIMEOUT_SECS")
                .and_then(|v| v.trim().parse::<u64>().ok())
                .filter(|secs| *secs > 0)
                .map_or(defaults.timeout, Duration::from_secs),
            max_tokens: non_empty("STUDY_BUDDY_MAX_TOKENS").and_then(|v| v.trim().parse().ok()),
        }
    }

    pub fn has_credentials(&self) -> bool {
        self.api_key.is_some()
    }

    /// Create the service the generator talks to, wrapped with logging.
    ///
    /// Without a credential (or if the HTTP client cannot be built) this
    /// returns a service that fails every request, so the UI can explain why.
    pub fn build_service(&self) -> Arc<dyn LlmService> {
        let Some(api_key) = self.api_key.clone() else {
            return Arc::new(UnconfiguredService::new(&self.model));
        };

        match OpenAIService::new(api_key, &self.endpoint, &self.model, self.timeout) {
            Ok(service) => Arc::new(LoggingService::new(Arc::new(service))),
            Err(e) => {
                tracing::error!(error = %e, "Failed to create LLM client");
                Arc::new(UnconfiguredService::new(&self.model))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_environment() {
        let config = LlmConfig::from_lookup(lookup(&[]));
        assert!(!config.has_credentials());
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
        assert_eq!(config.max_tokens, None);
    }

    #[test]
    fn test_groq_key_is_picked_up() {
        let config = LlmConfig::from_lookup(lookup(&[("GROQ_API_KEY", "gsk_test")]));
        assert_eq!(config.api_key.as_deref(), Some("gsk_test"));
    }

    #[test]
    fn test_own_key_wins_over_groq_key() {
        let config = LlmConfig::from_lookup(lookup(&[
            ("GROQ_API_KEY", "gsk_test"),
            ("STUDY_BUDDY_API_KEY", "own"),
        ]));
        assert_eq!(config.api_key.as_deref(), Some("own"));
    }

    #[test]
    fn test_blank_key_counts_as_missing() {
        let config = LlmConfig::from_lookup(lookup(&[("GROQ_API_KEY", "   ")]));
        assert!(!config.has_credentials());
    }

    #[test]
    fn test_overrides() {
        let config = LlmConfig::from_lookup(lookup(&[
            ("STUDY_BUDDY_LLM_URL", "http://localhost:11434/v1/chat/completions"),
            ("STUDY_BUDDY_MODEL", "llama3"),
            ("STUDY_BUDDY_LLM_TIMEOUT_SECS", "15"),
            ("STUDY_BUDDY_MAX_TOKENS", "1024"),
        ]));
        assert_eq!(config.endpoint, "http://localhost:11434/v1/chat/completions");
        assert_eq!(config.model, "llama3");
        assert_eq!(config.timeout, Duration::from_secs(15));
        assert_eq!(config.max_tokens, Some(1024));
    }

    #[test]
    fn test_invalid_timeout_falls_back() {
        for bad in ["zero", "0", "-3"] {
            let config =
                LlmConfig::from_lookup(lookup(&[("STUDY_BUDDY_LLM_TIMEOUT_SECS", bad)]));
            assert_eq!(config.timeout, DEFAULT_TIMEOUT, "input {bad}");
        }
    }

    #[test]
    fn test_build_service_uses_model_id() {
        let config = LlmConfig {
            api_key: Some("k".to_string()),
            model: "llama-3.3-70b-versatile".to_string(),
            ..Default::default()
        };
        assert_eq!(config.build_service().model_id(), "llama-3.3-70b-versatile");

        let unconfigured = LlmConfig::default().build_service();
        assert_eq!(unconfigured.model_id(), DEFAULT_MODEL);
    }
}
