//! The outcome of one conversational turn.

use super::emergency::EMERGENCY_DIRECTIVE;
use super::stage::Stage;

/// Which path produced a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReplySource {
    /// Emergency short-circuit; no generation was attempted.
    Emergency,
    /// Primary backend call.
    Primary,
    /// Economy backend call after the primary was rate limited.
    Retry,
    /// Local synthesizer after every remote attempt failed.
    LocalFallback,
}

/// Reply text plus the metadata the caller needs to render it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriageReply {
    pub text: String,
    /// Absent for emergency replies.
    pub stage: Option<Stage>,
    pub source: ReplySource,
}

impl TriageReply {
    pub fn emergency() -> Self {
        Self {
            text: EMERGENCY_DIRECTIVE.to_string(),
            stage: None,
            source: ReplySource::Emergency,
        }
    }

    pub fn generated(text: impl Into<String>, stage: Stage, source: ReplySource) -> Self {
        Self {
            text: text.into(),
            stage: Some(stage),
            source,
        }
    }

    pub fn is_emergency(&self) -> bool {
        self.source == ReplySource::Emergency
    }

    pub fn is_retry(&self) -> bool {
        self.source == ReplySource::Retry
    }

    pub fn is_mock(&self) -> bool {
        self.source == ReplySource::LocalFallback
    }
}
