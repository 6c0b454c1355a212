//! Triage command handlers.
//!
//! Answers user turns: emergency short-circuit, analysis, context assembly
//! and the generation cascade.

mod turn;

pub use turn::{GenerationSettings, TriageError, TriageTurnCommand, TriageTurnHandler};
