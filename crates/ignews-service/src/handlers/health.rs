//! Health check handler.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always `"ok"` while the process serves requests.
    pub status: &'static str,
    /// Service name.
    pub service: &'static str,
    /// Crate version.
    pub version: &'static str,
    /// Whether a payments provider is configured.
    pub payments_configured: bool,
    /// Whether both checkout redirect URLs are configured.
    pub checkout_configured: bool,
}

/// `GET /health`.
///
/// Liveness plus a readiness hint: checkout requests fail with 500 until
/// both flags are `true`.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: "ignews",
        version: env!("CARGO_PKG_VERSION"),
        payments_configured: state.has_payments(),
        checkout_configured: state.config.redirect_urls().is_some(),
    })
}
