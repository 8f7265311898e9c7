//! HTTP API gateway for Mocktrial.
//!
//! Exposes the health check and the v1 API for creating cases, uploading
//! documents, running simulations and downloading transcripts.
//!
//! Built on Axum for async HTTP.

pub mod api_v1;
pub mod store;

use axum::extract::DefaultBodyLimit;
use axum::{Router, response::Json, routing::get};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use mocktrial_core::event::EventBus;
use mocktrial_trial::KnowledgeBase;

/// Build the full router: health check plus the v1 API.
///
/// Layers applied:
/// - CORS open to any origin (no authentication is offered)
/// - Request body limit from `gateway.max_upload_bytes`, plus multipart framing
/// - HTTP trace logging
pub fn build_router(state: api_v1::SharedApiState) -> Router {
    // Room for multipart headers around a maximum-size document.
    let body_limit = state.config.gateway.max_upload_bytes + 64 * 1024;

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::DELETE,
        ])
        .allow_headers([axum::http::header::CONTENT_TYPE])
        .max_age(std::time::Duration::from_secs(3600));

    Router::new()
        .route("/health", get(health_handler))
        .nest("/v1", api_v1::v1_router(state))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

/// Start the gateway HTTP server.
///
/// The knowledge base is loaded once here; a missing or malformed base stops
/// startup.
pub async fn start(config: mocktrial_config::AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);

    let providers = mocktrial_providers::router::build_from_config(&config);
    let knowledge_base = Arc::new(KnowledgeBase::from_path_or_builtin(
        config.knowledge_base.path.as_deref(),
    )?);
    let event_bus = Arc::new(EventBus::default());

    info!(
        provider = %config.default_provider,
        model = %config.default_model,
        principles = knowledge_base.len(),
        "Gateway state ready"
    );

    let state = Arc::new(api_v1::ApiV1State::new(
        config,
        providers,
        knowledge_base,
        event_bus,
    ));
    let app = build_router(state);

    info!(addr = %addr, "Gateway starting with v1 API");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// --- Handlers ---

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
