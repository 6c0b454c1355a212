//! TriageTurn command handler.
//!
//! Answers one conversational turn:
//!
//! ```text
//! validate → emergency? ──yes──▶ fixed directive
//!               │no
//!               ▼
//!         credential? ──no──▶ Configuration error
//!               │
//!               ▼
//!      analyze + assemble
//!               │
//!               ▼
//!        PRIMARY_CALL ──ok──────────────▶ reply
//!          │ rate limited      │ other error
//!          ▼                   ▼
//!        RETRY_CALL ──ok──▶ reply (retry)    Generation error
//!          │ any error
//!          ▼
//!       LOCAL_FALLBACK ──▶ reply (mock)
//! ```
//!
//! Backend calls are sequential and each gets its own deadline. Dropping the
//! future returned by [`TriageTurnHandler::handle`] aborts an in-flight call
//! and no later step runs.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::domain::triage::{
    is_emergency, ContextAssembler, ConversationAnalyzer, ConversationState, GenerationRequest,
    LocalResponseSynthesizer, ReplySource, Transcript, TriageReply,
};
use crate::ports::{AIError, AIProvider, CompletionRequest, ModelTier};

/// Command to answer the current user message.
#[derive(Debug, Clone)]
pub struct TriageTurnCommand {
    /// The in-flight user message.
    pub message: String,
    /// Everything said before it, oldest first.
    pub history: Transcript,
    /// Correlates log lines of this turn.
    pub trace_id: String,
}

impl TriageTurnCommand {
    pub fn new(message: impl Into<String>, history: Transcript, trace_id: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            history,
            trace_id: trace_id.into(),
        }
    }
}

/// Errors surfaced to the caller. Capacity errors never appear here.
#[derive(Debug, Clone, Error)]
pub enum TriageError {
    /// The message is missing or blank.
    #[error("message required")]
    Validation,

    /// No generation backend credential is configured.
    #[error("generation backend is not configured")]
    Configuration,

    /// The primary call failed with a non-capacity error.
    #[error("generation failed: {0}")]
    Generation(#[from] AIError),
}

/// Generation parameters shared by every turn.
#[derive(Debug, Clone, Copy)]
pub struct GenerationSettings {
    /// Sampling temperature sent on every call.
    pub temperature: f32,
    /// Deadline for each individual backend call.
    pub call_timeout: Duration,
    /// Output-length cap for the economy retry.
    pub retry_max_tokens: u32,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            call_timeout: Duration::from_secs(25),
            retry_max_tokens: 400,
        }
    }
}

/// Handler for triage turns.
pub struct TriageTurnHandler {
    provider: Option<Arc<dyn AIProvider>>,
    analyzer: ConversationAnalyzer,
    assembler: ContextAssembler,
    synthesizer: LocalResponseSynthesizer,
    settings: GenerationSettings,
}

impl TriageTurnHandler {
    /// Creates a handler. `provider` is `None` when no credential is configured;
    /// emergency replies still work in that case.
    pub fn new(
        provider: Option<Arc<dyn AIProvider>>,
        analyzer: ConversationAnalyzer,
        assembler: ContextAssembler,
        settings: GenerationSettings,
    ) -> Self {
        Self {
            provider,
            analyzer,
            assembler,
            synthesizer: LocalResponseSynthesizer,
            settings,
        }
    }

    /// Answers one turn.
    pub async fn handle(&self, cmd: TriageTurnCommand) -> Result<TriageReply, TriageError> {
        if cmd.message.trim().is_empty() {
            return Err(TriageError::Validation);
        }

        if is_emergency(&cmd.message) {
            tracing::warn!(trace_id = %cmd.trace_id, "Emergency language detected");
            return Ok(TriageReply::emergency());
        }

        let provider = self.provider.as_ref().ok_or_else(|| {
            tracing::error!(trace_id = %cmd.trace_id, "No generation backend credential configured");
            TriageError::Configuration
        })?;

        let state = self.analyzer.analyze(&cmd.history, &cmd.message);
        tracing::debug!(
            trace_id = %cmd.trace_id,
            stage = %state.stage,
            policy = self.analyzer.policy().name(),
            history_len = cmd.history.len(),
            filled = state.collected.filled_count(),
            "Conversation analyzed"
        );

        let generation = self.assembler.assemble(&state, &cmd.history, &cmd.message);
        self.run_cascade(provider.as_ref(), &cmd, &state, &generation).await
    }

    async fn run_cascade(
        &self,
        provider: &dyn AIProvider,
        cmd: &TriageTurnCommand,
        state: &ConversationState,
        generation: &GenerationRequest,
    ) -> Result<TriageReply, TriageError> {
        let primary = CompletionRequest::from_generation(
            generation,
            ModelTier::Primary,
            self.settings.temperature,
            &cmd.trace_id,
        );

        let err = match self.call(provider, primary).await {
            Ok(text) => {
                return Ok(TriageReply::generated(text, state.stage, ReplySource::Primary));
            }
            Err(err) if err.is_capacity() => err,
            Err(err) => {
                tracing::error!(trace_id = %cmd.trace_id, error = %err, "Primary generation failed");
                return Err(TriageError::Generation(err));
            }
        };

        tracing::warn!(
            trace_id = %cmd.trace_id,
            error = %err,
            "Primary generation over capacity, retrying on economy tier"
        );

        let retry = CompletionRequest::from_generation(
            generation,
            ModelTier::Economy,
            self.settings.temperature,
            &cmd.trace_id,
        )
        .with_max_tokens(self.settings.retry_max_tokens);

        match self.call(provider, retry).await {
            Ok(text) => Ok(TriageReply::generated(text, state.stage, ReplySource::Retry)),
            Err(err) => {
                tracing::warn!(
                    trace_id = %cmd.trace_id,
                    error = %err,
                    "Retry generation failed, using local reply"
                );
                let text = self.synthesizer.reply(&cmd.message, state);
                Ok(TriageReply::generated(text, state.stage, ReplySource::LocalFallback))
            }
        }
    }

    /// One backend call bounded by the per-call deadline.
    async fn call(
        &self,
        provider: &dyn AIProvider,
        request: CompletionRequest,
    ) -> Result<String, AIError> {
        let tier = request.tier;
        let deadline = self.settings.call_timeout;

        let response = tokio::time::timeout(deadline, provider.complete(request))
            .await
            .map_err(|_| AIError::Timeout(deadline))??;

        tracing::debug!(
            ?tier,
            backend = provider.name(),
            model = %response.model,
            truncated = response.truncated,
            "Generation completed"
        );
        Ok(response.text)
    }
}
