//! Intake protocol stages and the policies that classify them.
//!
//! Stages only select prompt guidance and the output-length budget; they are
//! never stored, only recomputed from the transcript. Two pacing policies
//! exist and are chosen when the engine is built:
//!
//! - [`TurnCountPolicy`] moves purely on the number of prior user turns.
//! - [`CompletenessPolicy`] holds back `summary` until enough categories
//!   have been filled.
//!
//! Both are monotone over a session (turns only grow and extracted
//! information only accumulates), `initial` is returned only at zero prior
//! turns, and `summary` is terminal.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::extractor::InfoRecord;

/// Phase of the four-step intake protocol, ordered from first to last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Initial,
    SymptomCollection,
    DetailedAnalysis,
    Summary,
}

impl Stage {
    /// Position in the protocol, starting at 0.
    pub fn rank(&self) -> u8 {
        match self {
            Self::Initial => 0,
            Self::SymptomCollection => 1,
            Self::DetailedAnalysis => 2,
            Self::Summary => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Initial => "initial",
            Self::SymptomCollection => "symptom_collection",
            Self::DetailedAnalysis => "detailed_analysis",
            Self::Summary => "summary",
        }
    }

    /// Output-length cap for a primary generation call in this stage.
    pub fn max_output_tokens(&self) -> u32 {
        match self {
            Self::Initial => 300,
            Self::SymptomCollection | Self::DetailedAnalysis => 400,
            Self::Summary => 600,
        }
    }

    /// Stage for a turn count using the shared bands, capped at detailed analysis.
    fn pre_summary_band(prior_user_turns: usize) -> Self {
        match prior_user_turns {
            0 => Self::Initial,
            1..=2 => Self::SymptomCollection,
            _ => Self::DetailedAnalysis,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifies the current stage of a conversation.
pub trait StagePolicy: Send + Sync + fmt::Debug {
    /// `prior_user_turns` excludes the message currently being answered.
    fn classify(&self, prior_user_turns: usize, info: &InfoRecord) -> Stage;

    /// Short identifier used in logs.
    fn name(&self) -> &'static str;
}

/// `0 → initial`, `1–2 → symptom_collection`, `3–4 → detailed_analysis`,
/// `≥5 → summary`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TurnCountPolicy;

impl TurnCountPolicy {
    /// First turn count that yields [`Stage::Summary`].
    pub const SUMMARY_TURNS: usize = 5;
}

impl StagePolicy for TurnCountPolicy {
    fn classify(&self, prior_user_turns: usize, _info: &InfoRecord) -> Stage {
        if prior_user_turns >= Self::SUMMARY_TURNS {
            Stage::Summary
        } else {
            Stage::pre_summary_band(prior_user_turns)
        }
    }

    fn name(&self) -> &'static str {
        "turn_count"
    }
}

/// Summary once `min_turns` have elapsed and `min_filled` categories are known;
/// otherwise the turn-count bands, never past detailed analysis.
#[derive(Debug, Clone, Copy)]
pub struct CompletenessPolicy {
    min_turns: usize,
    min_filled: usize,
}

impl CompletenessPolicy {
    /// Creates a policy. `min_turns` is raised to 1 so that `initial`
    /// always means "no prior turns".
    pub fn new(min_turns: usize, min_filled: usize) -> Self {
        Self {
            min_turns: min_turns.max(1),
            min_filled,
        }
    }

    pub fn min_turns(&self) -> usize {
        self.min_turns
    }
}

impl Default for CompletenessPolicy {
    fn default() -> Self {
        Self::new(4, 3)
    }
}

impl StagePolicy for CompletenessPolicy {
    fn classify(&self, prior_user_turns: usize, info: &InfoRecord) -> Stage {
        if prior_user_turns >= self.min_turns && info.filled_count() >= self.min_filled {
            Stage::Summary
        } else {
            Stage::pre_summary_band(prior_user_turns)
        }
    }

    fn name(&self) -> &'static str {
        "completeness"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::triage::extractor::InfoCategory;
    use proptest::prelude::*;

    fn filled(n: usize) -> InfoRecord {
        InfoCategory::ALL
            .into_iter()
            .take(n)
            .fold(InfoRecord::default(), |record, category| record.with(category, "x"))
    }

    mod stage_basics {
        use super::*;

        #[test]
        fn ordering_follows_protocol() {
            assert!(Stage::Initial < Stage::SymptomCollection);
            assert!(Stage::SymptomCollection < Stage::DetailedAnalysis);
            assert!(Stage::DetailedAnalysis < Stage::Summary);
            assert_eq!(Stage::Summary.rank(), 3);
        }

        #[test]
        fn serializes_to_snake_case() {
            let json = serde_json::to_string(&Stage::SymptomCollection).unwrap();
            assert_eq!(json, "\"symptom_collection\"");
            assert_eq!(Stage::DetailedAnalysis.to_string(), "detailed_analysis");
        }

        #[test]
        fn budget_is_shortest_initially_and_longest_for_summary() {
            assert_eq!(Stage::Initial.max_output_tokens(), 300);
            assert_eq!(Stage::SymptomCollection.max_output_tokens(), 400);
            assert_eq!(Stage::DetailedAnalysis.max_output_tokens(), 400);
            assert_eq!(Stage::Summary.max_output_tokens(), 600);
        }
    }

    mod turn_count_policy {
        use super::*;

        #[test]
        fn bands() {
            let policy = TurnCountPolicy;
            let info = InfoRecord::default();
            let stages: Vec<Stage> = (0..7).map(|t| policy.classify(t, &info)).collect();
            assert_eq!(
                stages,
                vec![
                    Stage::Initial,
                    Stage::SymptomCollection,
                    Stage::SymptomCollection,
                    Stage::DetailedAnalysis,
                    Stage::DetailedAnalysis,
                    Stage::Summary,
                    Stage::Summary,
                ]
            );
        }

        #[test]
        fn ignores_information() {
            assert_eq!(TurnCountPolicy.classify(1, &filled(5)), Stage::SymptomCollection);
        }
    }

    mod completeness_policy {
        use super::*;

        #[test]
        fn summary_needs_turns_and_information() {
            let policy = CompletenessPolicy::default();
            assert_eq!(policy.classify(4, &filled(3)), Stage::Summary);
            assert_eq!(policy.classify(4, &filled(2)), Stage::DetailedAnalysis);
            assert_eq!(policy.classify(3, &filled(5)), Stage::DetailedAnalysis);
        }

        #[test]
        fn stays_in_detailed_analysis_without_information() {
            let policy = CompletenessPolicy::default();
            assert_eq!(policy.classify(20, &filled(0)), Stage::DetailedAnalysis);
        }

        #[test]
        fn zero_turns_is_always_initial() {
            let policy = CompletenessPolicy::new(0, 0);
            assert_eq!(policy.min_turns(), 1);
            assert_eq!(policy.classify(0, &filled(5)), Stage::Initial);
        }
    }

    fn policies() -> Vec<Box<dyn StagePolicy>> {
        vec![Box::new(TurnCountPolicy), Box::new(CompletenessPolicy::default())]
    }

    proptest! {
        #[test]
        fn stage_never_regresses(
            t1 in 0usize..20,
            dt in 0usize..20,
            f1 in 0usize..=5,
            df in 0usize..=5,
        ) {
            let t2 = t1 + dt;
            let f2 = (f1 + df).min(5);
            for policy in policies() {
                let earlier = policy.classify(t1, &filled(f1));
                let later = policy.classify(t2, &filled(f2));
                prop_assert!(earlier.rank() <= later.rank(), "{} regressed", policy.name());
                if earlier == Stage::Summary {
                    prop_assert_eq!(later, Stage::Summary);
                }
            }
        }

        #[test]
        fn initial_only_at_zero_turns(t in 0usize..50, f in 0usize..=5) {
            for policy in policies() {
                let stage = policy.classify(t, &filled(f));
                prop_assert_eq!(stage == Stage::Initial, t == 0);
            }
        }
    }
}
