//! Triage engine configuration

use serde::Deserialize;
use std::sync::Arc;

use super::error::ValidationError;
use crate::domain::triage::{CompletenessPolicy, StagePolicy, TurnCountPolicy};

/// Stage classification policy selection
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum StagePolicyKind {
    /// Stage follows the number of prior user turns only
    TurnCount,
    /// Summary additionally requires enough extracted information
    #[default]
    Completeness,
}

/// Triage engine configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TriageConfig {
    /// Which stage policy to build
    #[serde(default)]
    pub stage_policy: StagePolicyKind,

    /// Number of most recent history messages sent to the backend
    #[serde(default = "default_history_window")]
    pub history_window: usize,

    /// Prior user turns required before a summary (completeness policy)
    #[serde(default = "default_summary_min_turns")]
    pub summary_min_turns: usize,

    /// Filled categories required before a summary (completeness policy)
    #[serde(default = "default_summary_min_filled")]
    pub summary_min_filled: usize,
}

impl TriageConfig {
    /// Builds the configured stage policy
    pub fn stage_policy(&self) -> Arc<dyn StagePolicy> {
        match self.stage_policy {
            StagePolicyKind::TurnCount => Arc::new(TurnCountPolicy),
            StagePolicyKind::Completeness => Arc::new(CompletenessPolicy::new(
                self.summary_min_turns,
                self.summary_min_filled,
            )),
        }
    }

    /// Validate triage configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(20..=30).contains(&self.history_window) {
            return Err(ValidationError::InvalidHistoryWindow);
        }
        if self.summary_min_turns == 0 || !(1..=5).contains(&self.summary_min_filled) {
            return Err(ValidationError::InvalidSummaryThreshold);
        }
        Ok(())
    }
}

impl Default for TriageConfig {
    fn default() -> Self {
        Self {
            stage_policy: StagePolicyKind::default(),
            history_window: default_history_window(),
            summary_min_turns: default_summary_min_turns(),
            summary_min_filled: default_summary_min_filled(),
        }
    }
}

fn default_history_window() -> usize {
    30
}

fn default_summary_min_turns() -> usize {
    4
}

fn default_summary_min_filled() -> usize {
    3
}
