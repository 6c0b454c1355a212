//! Generation backend port.
//!
//! The triage handler never talks to a model vendor directly. It turns an
//! assembled [`GenerationRequest`] into a [`CompletionRequest`] for a given
//! [`ModelTier`] and hands it to an [`AIProvider`], which owns the wire format.
//!
//! One request, one response; providers never retry on their own. Whether a
//! failure is worth degrading over is decided by the caller through
//! [`AIError::is_capacity`].

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::triage::{ContextMessage, GenerationRequest};

#[async_trait]
pub trait AIProvider: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, AIError>;

    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    /// Concrete model that serves `tier`.
    fn model_for(&self, tier: ModelTier) -> &str;
}

/// Backend configuration selector. The handler only knows tiers; adapters
/// map them to model names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelTier {
    Primary,
    /// Smaller model tried once when the primary is over capacity.
    Economy,
}

/// A single generation call.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub tier: ModelTier,
    pub system_prompt: String,
    /// History window followed by the current user message.
    pub messages: Vec<ContextMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
    pub trace_id: String,
}

impl CompletionRequest {
    /// Builds a call from an assembled payload, keeping its output cap.
    pub fn from_generation(
        generation: &GenerationRequest,
        tier: ModelTier,
        temperature: f32,
        trace_id: impl Into<String>,
    ) -> Self {
        Self {
            tier,
            system_prompt: generation.system_prompt.clone(),
            messages: generation.messages.clone(),
            max_tokens: generation.max_tokens,
            temperature,
            trace_id: trace_id.into(),
        }
    }

    /// Overrides the output cap.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionResponse {
    pub text: String,
    /// Model name as reported by the backend.
    pub model: String,
    /// The output cap cut the reply short.
    pub truncated: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AIError {
    /// HTTP 429 or quota exhaustion. The only recoverable class.
    #[error("backend over capacity, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u32 },

    #[error("backend unavailable: {0}")]
    Unavailable(String),

    #[error("backend rejected credentials")]
    AuthenticationFailed,

    #[error("transport failure: {0}")]
    Network(String),

    #[error("unreadable backend response: {0}")]
    Parse(String),

    #[error("backend rejected request: {0}")]
    InvalidRequest(String),

    #[error("no response within {}s", .0.as_secs())]
    Timeout(Duration),
}

impl AIError {
    /// Capacity failures are answered by degrading, never surfaced.
    pub fn is_capacity(&self) -> bool {
        matches!(self, AIError::RateLimited { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::triage::{ContextRole, Stage};

    fn generation() -> GenerationRequest {
        GenerationRequest {
            system_prompt: "persona".to_string(),
            messages: vec![ContextMessage::new(ContextRole::User, "두통이 있어")],
            max_tokens: 300,
            stage: Stage::Initial,
        }
    }

    #[test]
    fn request_copies_payload_and_cap() {
        let request = CompletionRequest::from_generation(&generation(), ModelTier::Primary, 0.7, "t-1");

        assert_eq!(request.system_prompt, "persona");
        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.max_tokens, 300);
        assert_eq!(request.temperature, 0.7);
        assert_eq!(request.trace_id, "t-1");
    }

    #[test]
    fn retry_cap_overrides_stage_cap() {
        let request = CompletionRequest::from_generation(&generation(), ModelTier::Economy, 0.7, "t")
            .with_max_tokens(400);
        assert_eq!(request.tier, ModelTier::Economy);
        assert_eq!(request.max_tokens, 400);
    }

    #[test]
    fn only_rate_limit_is_capacity() {
        assert!(AIError::RateLimited { retry_after_secs: 30 }.is_capacity());

        for err in [
            AIError::Unavailable("down".to_string()),
            AIError::Network("reset".to_string()),
            AIError::AuthenticationFailed,
            AIError::Parse("eof".to_string()),
            AIError::InvalidRequest("bad".to_string()),
            AIError::Timeout(Duration::from_secs(25)),
        ] {
            assert!(!err.is_capacity(), "{err} must not be treated as capacity");
        }
    }

    #[test]
    fn timeout_reports_whole_seconds() {
        assert_eq!(
            AIError::Timeout(Duration::from_millis(25_400)).to_string(),
            "no response within 25s"
        );
    }
}
