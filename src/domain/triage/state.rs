//! Derived conversation state.
//!
//! Nothing here is stored between requests. The state is recomputed from the
//! caller-supplied transcript on every turn, so the same transcript always
//! yields the same state.

use std::sync::Arc;

use super::extractor::{InfoCategory, InfoExtractor, InfoRecord, KeywordExtractor};
use super::message::Transcript;
use super::stage::{CompletenessPolicy, Stage, StagePolicy};

/// Where the conversation stands for the turn being answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationState {
    pub stage: Stage,
    pub collected: InfoRecord,
    pub missing: Vec<InfoCategory>,
}

impl ConversationState {
    /// Assembles a state from already-computed parts.
    pub fn new(stage: Stage, collected: InfoRecord) -> Self {
        let missing = collected.missing();
        Self {
            stage,
            collected,
            missing,
        }
    }

    /// First missing category in priority order.
    pub fn next_missing(&self) -> Option<InfoCategory> {
        self.missing.first().copied()
    }
}

/// Combines an extractor and a stage policy into one analysis step.
#[derive(Clone)]
pub struct ConversationAnalyzer {
    extractor: Arc<dyn InfoExtractor>,
    policy: Arc<dyn StagePolicy>,
}

impl ConversationAnalyzer {
    pub fn new(extractor: Arc<dyn InfoExtractor>, policy: Arc<dyn StagePolicy>) -> Self {
        Self { extractor, policy }
    }

    pub fn policy(&self) -> &dyn StagePolicy {
        self.policy.as_ref()
    }

    /// Analyzes `history` plus the in-flight `current` message.
    ///
    /// The stage is classified from prior user turns only; extraction covers
    /// every user utterance including `current`.
    pub fn analyze(&self, history: &Transcript, current: &str) -> ConversationState {
        let mut text = history.user_text();
        if !current.trim().is_empty() {
            if !text.is_empty() {
                text.push(' ');
            }
            text.push_str(&current.to_lowercase());
        }

        let collected = InfoRecord::extract_from(self.extractor.as_ref(), &text);
        let stage = self.policy.classify(history.user_turns(), &collected);
        ConversationState::new(stage, collected)
    }
}

impl Default for ConversationAnalyzer {
    fn default() -> Self {
        Self::new(
            Arc::new(KeywordExtractor),
            Arc::new(CompletenessPolicy::default()),
        )
    }
}

impl std::fmt::Debug for ConversationAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversationAnalyzer")
            .field("policy", &self.policy.name())
            .finish()
    }
}
