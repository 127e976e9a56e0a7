use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use prometheus::{Encoder, TextEncoder};
use serde::Serialize;
use std::sync::Arc;

use crate::services::catalog_store::CatalogStatus;
use crate::AppState;

/// Root endpoint - basic status
pub async fn root() -> impl IntoResponse {
    Json(serde_json::json!({
        "name": "StreamCine Server",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
        "manifest": "/manifest.json"
    }))
}

/// Health check response
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    status: &'static str,
    uptime: u64,
    started_at: String,
    data_dir: String,
    catalogs: Vec<CatalogStatus>,
}

/// GET /health - uptime and catalog load state
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let health = HealthResponse {
        status: "ok",
        uptime: state.start_time.elapsed().as_secs(),
        started_at: state.started_at.to_rfc3339(),
        data_dir: state.config.data_dir.display().to_string(),
        catalogs: state.addon.catalog_status(),
    };

    Json(health)
}

/// GET /metrics - Prometheus metrics
pub async fn metrics() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();

    let mut buffer = Vec::new();
    match encoder.encode(&metric_families, &mut buffer) {
        Ok(_) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            buffer,
        ),
        Err(e) => {
            tracing::error!("Failed to encode metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [("content-type", "text/plain")],
                b"Internal Server Error".to_vec(),
            )
        }
    }
}

/// Liveness probe
pub async fn live() -> impl IntoResponse {
    (StatusCode::OK, "alive")
}
