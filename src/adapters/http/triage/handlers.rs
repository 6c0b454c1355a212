//! HTTP handlers for the triage chat endpoint.
//!
//! These handlers connect Axum routes to the triage turn handler.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use uuid::Uuid;

use crate::application::handlers::triage::{TriageError, TriageTurnCommand, TriageTurnHandler};

use super::dto::{ChatRequest, ChatResponse, ErrorResponse, HealthResponse};

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared application state for triage handlers.
#[derive(Clone)]
pub struct TriageAppState {
    pub turn_handler: Arc<TriageTurnHandler>,
}

impl TriageAppState {
    pub fn new(turn_handler: Arc<TriageTurnHandler>) -> Self {
        Self { turn_handler }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// POST /api/chat
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/chat - Answer one conversational turn.
///
/// # Errors
/// - 400 Bad Request: body is malformed or `message` is missing/blank
/// - 500 Internal Server Error: no backend credential, or the primary call failed
pub async fn chat(
    State(state): State<TriageAppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<impl IntoResponse, TriageApiError> {
    let Json(request) =
        payload.map_err(|rejection| TriageApiError::BadRequest(rejection.body_text()))?;

    let history = request.transcript();
    let trace_id = Uuid::new_v4().to_string();
    let command = TriageTurnCommand::new(request.message.unwrap_or_default(), history, trace_id);

    let reply = state.turn_handler.handle(command).await?;

    Ok((StatusCode::OK, Json(ChatResponse::from(reply))))
}

// ════════════════════════════════════════════════════════════════════════════════
// GET /health
// ════════════════════════════════════════════════════════════════════════════════

/// GET /health - Liveness probe.
pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(HealthResponse { status: "ok" }))
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts triage errors to HTTP responses.
#[derive(Debug)]
pub enum TriageApiError {
    BadRequest(String),
    Configuration(String),
    Generation(String),
}

impl From<TriageError> for TriageApiError {
    fn from(err: TriageError) -> Self {
        match err {
            TriageError::Validation => TriageApiError::BadRequest(err.to_string()),
            TriageError::Configuration => TriageApiError::Configuration(err.to_string()),
            TriageError::Generation(_) => TriageApiError::Generation(err.to_string()),
        }
    }
}

impl IntoResponse for TriageApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            TriageApiError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, ErrorResponse::bad_request(msg))
            }
            TriageApiError::Configuration(msg) => {
                tracing::error!("Configuration error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, ErrorResponse::configuration(msg))
            }
            TriageApiError::Generation(msg) => {
                tracing::error!("Generation error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, ErrorResponse::generation_failed(msg))
            }
        };

        (status, Json(error)).into_response()
    }
}
