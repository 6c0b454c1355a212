//! Application handlers.
//!
//! Command handlers that orchestrate domain operations.

pub mod triage;

pub use triage::{GenerationSettings, TriageError, TriageTurnCommand, TriageTurnHandler};
