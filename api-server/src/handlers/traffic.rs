//! Live traffic handler

use axum::{extract::State, Json};
use flowsight_core::TrafficReport;

use crate::{AppError, AppResult, AppState};

/// Sample, classify, explain and advise one observation.
///
/// The pipeline is CPU-bound, so it runs on the blocking pool.
pub async fn live(State(state): State<AppState>) -> AppResult<Json<TrafficReport>> {
    let pipeline = state.pipeline.clone();

    let report = tokio::task::spawn_blocking(move || pipeline.run())
        .await
        .map_err(|e| AppError::InternalError(format!("pipeline worker failed: {}", e)))??;

    tracing::debug!(
        "Live traffic: {} from {} ({:.1}%)",
        report.prediction,
        report.source_ip,
        report.confidence_score
    );

    Ok(Json(report))
}
