//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `AIProvider` - Port for the text generation backend

mod ai_provider;

pub use ai_provider::{AIError, AIProvider, CompletionRequest, CompletionResponse, ModelTier};
