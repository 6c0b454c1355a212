//! Symptom Triage server binary.
//!
//! Loads configuration from the environment, wires the triage engine to the
//! configured generation backend and serves the HTTP API.

use std::error::Error;
use std::sync::Arc;

use axum::http::{header, HeaderValue, Method};
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use symptom_triage::adapters::ai::{OpenAIConfig, OpenAIProvider};
use symptom_triage::adapters::http::{triage_router, TriageAppState};
use symptom_triage::application::handlers::triage::{GenerationSettings, TriageTurnHandler};
use symptom_triage::config::{AppConfig, LogFormat, ServerConfig};
use symptom_triage::domain::triage::{ContextAssembler, ConversationAnalyzer, KeywordExtractor};
use symptom_triage::ports::AIProvider;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = AppConfig::load()?;
    init_tracing(&config);
    config.validate()?;

    let addr = config.server.socket_addr()?;
    let app = build_app(&config)?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, environment = ?config.server.environment, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

/// `RUST_LOG` wins over `server.log_level`. JSON output in production.
fn init_tracing(config: &AppConfig) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));

    let registry = tracing_subscriber::registry().with(env_filter);
    match config.server.log_format() {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_current_span(true))
            .try_init()
            .ok(),
        LogFormat::Pretty => registry.with(fmt::layer().with_target(false)).try_init().ok(),
    };
}

fn build_provider(config: &AppConfig) -> Result<Option<Arc<dyn AIProvider>>, Box<dyn Error>> {
    let Some(api_key) = config.ai.openai_api_key.as_deref().filter(|_| config.ai.has_openai())
    else {
        tracing::warn!("no OpenAI API key configured; non-emergency turns will fail");
        return Ok(None);
    };

    let provider = OpenAIProvider::new(
        OpenAIConfig::new(api_key)
            .with_model(&config.ai.primary_model)
            .with_economy_model(&config.ai.economy_model)
            .with_base_url(&config.ai.base_url)
            .with_timeout(config.ai.call_timeout()),
    )?;
    tracing::info!(
        primary = %config.ai.primary_model,
        economy = %config.ai.economy_model,
        "generation backend configured"
    );
    Ok(Some(Arc::new(provider)))
}

fn build_app(config: &AppConfig) -> Result<Router, Box<dyn Error>> {
    let analyzer = ConversationAnalyzer::new(Arc::new(KeywordExtractor), config.triage.stage_policy());
    let assembler = ContextAssembler::new(config.triage.history_window);
    tracing::debug!(
        policy = analyzer.policy().name(),
        history_window = assembler.history_window(),
        "triage pipeline configured"
    );

    let handler = TriageTurnHandler::new(
        build_provider(config)?,
        analyzer,
        assembler,
        GenerationSettings {
            temperature: config.ai.temperature,
            call_timeout: config.ai.call_timeout(),
            retry_max_tokens: config.ai.retry_max_tokens,
        },
    );

    let app = triage_router()
        .with_state(TriageAppState::new(Arc::new(handler)))
        .layer(cors_layer(&config.server))
        .layer(TimeoutLayer::new(config.server.request_timeout()))
        .layer(TraceLayer::new_for_http());

    Ok(app)
}

fn cors_layer(server: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = server
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    if origins.is_empty() {
        if server.is_production() {
            tracing::warn!("no CORS origins configured; cross-origin requests will be refused");
            return CorsLayer::new();
        }
        return CorsLayer::permissive();
    }

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
