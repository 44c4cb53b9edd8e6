//! Statistics handlers

use axum::{extract::State, Json};
use flowsight_core::{EngineStatus, LedgerSnapshot};

use crate::AppState;

/// Per-attack feature frequency table
pub async fn attack_feature_stats(State(state): State<AppState>) -> Json<LedgerSnapshot> {
    Json(state.pipeline.ledger_snapshot())
}

/// Model + inference statistics
pub async fn engine_status(State(state): State<AppState>) -> Json<EngineStatus> {
    Json(state.pipeline.engine_status())
}
