//! HTTP API gateway for Rangaayan AI.
//!
//! Exposes the marketplace features over REST and SSE:
//! product detection, descriptions, pricing, demand insights, and
//! competitor analysis, plus a health check.
//!
//! Built on Axum.

pub mod api;

use axum::body::Body;
use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method, Request, header};
use axum::{Router, response::Json, routing::get};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, info_span, warn};

use rangaayan_config::AppConfig;
use rangaayan_services::Services;

/// Image uploads can be large; JSON bodies are tiny.
pub const BODY_LIMIT_BYTES: usize = 10 * 1024 * 1024;

/// Shared application state for the gateway.
pub struct AppState {
    pub services: Services,
    pub config: AppConfig,
}

pub type SharedState = Arc<AppState>;

/// Build the Axum router with every route and layer.
///
/// Layers applied:
/// - CORS for the configured web origins
/// - request body limit (10 MB)
/// - HTTP trace logging with a per-request id
pub fn build_router(state: SharedState) -> Router {
    let cors = cors_layer(&state.config.gateway.allowed_origins);

    Router::new()
        .route("/health", get(health_handler))
        .nest("/api", api::api_router())
        .with_state(state)
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .layer(cors)
        .layer(TraceLayer::new_for_http().make_span_with(|req: &Request<Body>| {
            info_span!(
                "request",
                method = %req.method(),
                uri = %req.uri(),
                request_id = %uuid::Uuid::new_v4(),
            )
        }))
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .max_age(std::time::Duration::from_secs(3600))
}

/// Start the gateway HTTP server.
pub async fn start(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);

    let services = Services::from_config(&config)?;
    let app = build_router(Arc::new(AppState { services, config }));

    info!(addr = %addr, "Gateway starting");
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
