//! Health check endpoint.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::types::{ApiContext, Envelope};

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub uptime_secs: u64,
}

/// `GET /api/health`: liveness, no auth.
pub async fn check(State(ctx): State<ApiContext>) -> Json<Envelope<HealthResponse>> {
    Json(Envelope::new(
        "Service is up",
        HealthResponse {
            status: "ok",
            version: crate::config::APP_VERSION,
            uptime_secs: ctx.core.uptime_secs(),
        },
    ))
}
