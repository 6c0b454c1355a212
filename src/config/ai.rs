//! AI provider configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// AI provider configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    /// OpenAI API key. Absence is not a startup error: emergency replies
    /// still work and other turns answer with a configuration error.
    pub openai_api_key: Option<String>,

    /// Base URL of the chat completions API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model used for the primary call
    #[serde(default = "default_primary_model")]
    pub primary_model: String,

    /// Cheaper model used when the primary is rate limited
    #[serde(default = "default_economy_model")]
    pub economy_model: String,

    /// Deadline for each backend call in seconds
    #[serde(default = "default_call_timeout")]
    pub call_timeout_secs: u64,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Output-length cap for the economy retry
    #[serde(default = "default_retry_max_tokens")]
    pub retry_max_tokens: u32,
}

impl AiConfig {
    /// Get the per-call timeout as Duration
    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }

    /// Check if OpenAI is configured
    pub fn has_openai(&self) -> bool {
        self.openai_api_key.as_ref().is_some_and(|k| !k.trim().is_empty())
    }

    /// Validate AI configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.call_timeout_secs == 0 || self.call_timeout_secs > 300 {
            return Err(ValidationError::InvalidCallTimeout);
        }
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ValidationError::InvalidBaseUrl);
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ValidationError::InvalidTemperature);
        }
        Ok(())
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            base_url: default_base_url(),
            primary_model: default_primary_model(),
            economy_model: default_economy_model(),
            call_timeout_secs: default_call_timeout(),
            temperature: default_temperature(),
            retry_max_tokens: default_retry_max_tokens(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_primary_model() -> String {
    "gpt-3.5-turbo-16k".to_string()
}

fn default_economy_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_call_timeout() -> u64 {
    25
}

fn default_temperature() -> f32 {
    0.7
}

fn default_retry_max_tokens() -> u32 {
    400
}
