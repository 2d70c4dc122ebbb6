//! Marketplace feature endpoints under `/api`.
//!
//! Endpoints (each also reachable without the trailing slash):
//!
//! - `POST /api/detect/`            — multipart image upload, product detection
//! - `GET  /api/detect/categories`  — supported product categories
//! - `POST /api/describe/`          — one-line description and category
//! - `POST /api/pricing/`           — price suggestion report
//! - `POST /api/pricing/stream`     — price suggestion as SSE
//! - `POST /api/demand/`            — demand insights report
//! - `POST /api/demand/stream`      — demand insights as SSE
//! - `POST /api/competitors/`       — competitor listings and signals

use axum::{
    Router,
    extract::{Multipart, State},
    http::StatusCode,
    response::sse::{Event as SseEvent, Sse},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use futures::Stream;
use serde::Serialize;
use std::convert::Infallible;
use tokio::sync::mpsc;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{error, info, warn};

use rangaayan_agent::LoopEvent;
use rangaayan_services::{
    CompetitorRequest, DemandReport, DemandRequest, DescribeRequest, Description, DetectionResult,
    PRODUCT_CATEGORIES, PricingReport, PricingRequest, ServiceError,
};
use rangaayan_tools::CompetitorReport;

use crate::SharedState;

/// Multipart field carrying the image.
const UPLOAD_FIELD: &str = "file";

pub fn api_router() -> Router<SharedState> {
    Router::new()
        .route("/detect", post(detect_handler))
        .route("/detect/", post(detect_handler))
        .route("/detect/categories", get(categories_handler))
        .route("/describe", post(describe_handler))
        .route("/describe/", post(describe_handler))
        .route("/pricing", post(pricing_handler))
        .route("/pricing/", post(pricing_handler))
        .route("/pricing/stream", post(pricing_stream_handler))
        .route("/demand", post(demand_handler))
        .route("/demand/", post(demand_handler))
        .route("/demand/stream", post(demand_stream_handler))
        .route("/competitors", post(competitors_handler))
        .route("/competitors/", post(competitors_handler))
}

// ── Errors ────────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// An error response: status code plus `{"error": ...}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self {
        if e.is_client_error() {
            warn!(error = %e, "Rejected request");
            Self::bad_request(e.to_string())
        } else {
            error!(error = %e, "Upstream failure");
            Self {
                status: StatusCode::BAD_GATEWAY,
                message: e.to_string(),
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorResponse { error: self.message })).into_response()
    }
}

// ── Handlers ──────────────────────────────────────────────────────────────

async fn detect_handler(
    State(state): State<SharedState>,
    mut multipart: Multipart,
) -> Result<Json<DetectionResult>, ApiError> {
    let mut image = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid upload: {e}")))?
    {
        if field.name() == Some(UPLOAD_FIELD) {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::bad_request(format!("Invalid upload: {e}")))?;
            image = Some(bytes);
            break;
        }
    }

    let image = image.ok_or_else(|| ApiError::bad_request("No image file uploaded"))?;
    info!(bytes = image.len(), "api/detect request");
    Ok(Json(state.services.detect.detect(&image).await?))
}

#[derive(Serialize)]
struct CategoriesResponse {
    categories: &'static [&'static str],
}

async fn categories_handler() -> Json<CategoriesResponse> {
    Json(CategoriesResponse {
        categories: &PRODUCT_CATEGORIES,
    })
}

async fn describe_handler(
    State(state): State<SharedState>,
    Json(payload): Json<DescribeRequest>,
) -> Result<Json<Description>, ApiError> {
    Ok(Json(state.services.describe.describe(&payload).await?))
}

async fn pricing_handler(
    State(state): State<SharedState>,
    Json(payload): Json<PricingRequest>,
) -> Result<Json<PricingReport>, ApiError> {
    Ok(Json(state.services.pricing.suggest(&payload).await?))
}

async fn demand_handler(
    State(state): State<SharedState>,
    Json(payload): Json<DemandRequest>,
) -> Result<Json<DemandReport>, ApiError> {
    Ok(Json(state.services.demand.insights(&payload).await?))
}

async fn competitors_handler(
    State(state): State<SharedState>,
    Json(payload): Json<CompetitorRequest>,
) -> Result<Json<CompetitorReport>, ApiError> {
    Ok(Json(state.services.competitors.analyze(&payload).await?))
}

// ── SSE Streaming ─────────────────────────────────────────────────────────

fn sse(rx: mpsc::Receiver<LoopEvent>) -> Sse<impl Stream<Item = Result<SseEvent, Infallible>>> {
    let stream = ReceiverStream::new(rx).map(|event| {
        let data = serde_json::to_string(&event).unwrap_or_default();
        Ok(SseEvent::default().event(event.event_type()).data(data))
    });
    Sse::new(stream)
}

/// `POST /api/pricing/stream`: pricing run as `status`/`result`/`error` events.
async fn pricing_stream_handler(
    State(state): State<SharedState>,
    Json(payload): Json<PricingRequest>,
) -> Result<Sse<impl Stream<Item = Result<SseEvent, Infallible>>>, ApiError> {
    Ok(sse(state.services.pricing.suggest_stream(&payload)?))
}

/// `POST /api/demand/stream`: demand run as `status`/`result`/`error` events.
async fn demand_stream_handler(
    State(state): State<SharedState>,
    Json(payload): Json<DemandRequest>,
) -> Result<Sse<impl Stream<Item = Result<SseEvent, Infallible>>>, ApiError> {
    Ok(sse(state.services.demand.insights_stream(&payload)?))
}
