//! HTTP adapter for the triage chat endpoint.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use dto::{ChatRequest, ChatResponse, ErrorResponse, HealthResponse, HistoryRecord, SpeakerDto};
pub use handlers::{TriageApiError, TriageAppState};
pub use routes::{triage_router, triage_routes};
