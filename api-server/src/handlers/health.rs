//! Health check handler

use axum::Json;
use flowsight_core::constants::{APP_NAME, APP_VERSION};
use serde::Serialize;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    service: &'static str,
    version: &'static str,
    timestamp: i64,
}

/// Liveness only; the pipeline is ready once the server is listening
pub async fn check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: APP_NAME,
        version: APP_VERSION,
        timestamp: chrono::Utc::now().timestamp(),
    })
}
