//! Axum routes for the triage endpoints.

use axum::routing::{get, post};
use axum::Router;

use super::handlers::{chat, health, TriageAppState};

/// Creates routes for the chat API.
///
/// Endpoints:
/// - POST /api/chat - Answer one conversational turn
pub fn triage_routes() -> Router<TriageAppState> {
    Router::new().route("/chat", post(chat))
}

/// Combined router: chat routes under /api plus the liveness probe.
///
/// Endpoints:
/// - GET /health - Liveness probe
pub fn triage_router() -> Router<TriageAppState> {
    Router::new()
        .route("/health", get(health))
        .nest("/api", triage_routes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use crate::application::handlers::triage::{GenerationSettings, TriageTurnHandler};
    use crate::domain::triage::{ContextAssembler, ConversationAnalyzer};

    fn test_state() -> TriageAppState {
        TriageAppState::new(Arc::new(TriageTurnHandler::new(
            None,
            ConversationAnalyzer::default(),
            ContextAssembler::default(),
            GenerationSettings::default(),
        )))
    }

    #[test]
    fn triage_routes_creates_valid_router() {
        let _routes = triage_routes();
    }

    #[tokio::test]
    async fn triage_router_mounts_health_endpoint() {
        let app = triage_router().with_state(test_state());

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn triage_router_rejects_get_on_chat() {
        let app = triage_router().with_state(test_state());

        let response = app
            .oneshot(Request::builder().uri("/api/chat").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
