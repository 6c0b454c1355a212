//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the triage engine to external systems:
//! - `ai` - Generation backends (OpenAI, mock)
//! - `http` - REST API (axum)

pub mod ai;
pub mod http;

pub use ai::{MockAIProvider, OpenAIConfig, OpenAIProvider};
pub use http::{triage_router, TriageAppState};
