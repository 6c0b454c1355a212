//! Scripted generation backend for tests.
//!
//! Outcomes are queued up front and consumed one per call, so a test can
//! describe a whole cascade (rate limit, then success) in one builder chain:
//!
//! ```ignore
//! let provider = MockAIProvider::new()
//!     .with_error(AIError::RateLimited { retry_after_secs: 30 })
//!     .with_response("어제부터 두통이 있으셨군요.");
//! ```
//!
//! Clones share the queue and the call log, so a test can keep a handle after
//! moving the provider into the handler. A delay can be attached to a single
//! outcome to script a slow retry behind a fast primary.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::ports::{AIError, AIProvider, CompletionRequest, CompletionResponse, ModelTier};

/// Reply text when the queue runs dry.
const DEFAULT_REPLY: &str = "Mock response";

#[derive(Debug, Clone)]
struct Scripted {
    outcome: Result<String, AIError>,
    delay: Duration,
}

#[derive(Debug, Clone, Default)]
pub struct MockAIProvider {
    script: Arc<Mutex<VecDeque<Scripted>>>,
    calls: Arc<Mutex<Vec<CompletionRequest>>>,
    delay: Duration,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockAIProvider {
    pub fn new() -> Self {
        Self::default()
    }

    fn enqueue(self, outcome: Result<String, AIError>, delay: Duration) -> Self {
        lock(&self.script).push_back(Scripted { outcome, delay });
        self
    }

    /// Queues a successful reply.
    pub fn with_response(self, text: impl Into<String>) -> Self {
        self.enqueue(Ok(text.into()), Duration::ZERO)
    }

    /// Queues a successful reply that arrives only after `delay`.
    pub fn with_delayed_response(self, text: impl Into<String>, delay: Duration) -> Self {
        self.enqueue(Ok(text.into()), delay)
    }

    /// Queues a failure.
    pub fn with_error(self, error: AIError) -> Self {
        self.enqueue(Err(error), Duration::ZERO)
    }

    /// Every call sleeps this long before answering, on top of any
    /// per-outcome delay.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    /// Requests received so far, oldest first.
    pub fn get_calls(&self) -> Vec<CompletionRequest> {
        lock(&self.calls).clone()
    }
}

#[async_trait]
impl AIProvider for MockAIProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, AIError> {
        let model = self.model_for(request.tier).to_string();
        lock(&self.calls).push(request);

        let next = lock(&self.script).pop_front().unwrap_or_else(|| Scripted {
            outcome: Ok(DEFAULT_REPLY.to_string()),
            delay: Duration::ZERO,
        });

        let delay = self.delay + next.delay;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        next.outcome.map(|text| CompletionResponse {
            text,
            model,
            truncated: false,
        })
    }

    fn name(&self) -> &'static str {
        "mock"
    }

    fn model_for(&self, tier: ModelTier) -> &str {
        match tier {
            ModelTier::Primary => "mock-primary",
            ModelTier::Economy => "mock-economy",
        }
    }
}
