//! FlowSight API Server
//!
//! HTTP boundary over the flow classification pipeline.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      FLOWSIGHT API                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐        ┌──────────────────────────────────┐  │
//! │  │  Router   │ ─────▶ │  Pipeline (blocking pool)        │  │
//! │  │  (Axum)   │        │  sample → classify → explain     │  │
//! │  └───────────┘        └────────────────┬─────────────────┘  │
//! │                                        ▼                    │
//! │                               ┌─────────────────┐           │
//! │                               │ Attribution     │           │
//! │                               │ Ledger (memory) │           │
//! │                               └─────────────────┘           │
//! └─────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod error;
mod handlers;


use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{routing::get, Router};
use flowsight_core::constants::{APP_NAME, APP_VERSION};
use flowsight_core::Pipeline;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub use error::{AppError, AppResult};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    // Initialize logging (core `log` records are bridged into tracing)
    let json_logs = config.is_production();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "flowsight_api=debug,flowsight_core=info,tower_http=debug".into()))
        .with(json_logs.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json_logs).then(tracing_subscriber::fmt::layer))
        .init();

    tracing::info!(
        "{} API Server v{} starting ({})...",
        APP_NAME,
        APP_VERSION,
        config.environment
    );
    tracing::info!("Dataset: {}", config.engine.dataset_path.display());
    tracing::info!("Model: {}", config.engine.model_path.display());

    // Dataset + model are loaded once; failure is fatal
    let pipeline = Pipeline::load(&config.engine)
        .context("Failed to initialize classification pipeline")?;

    // Build application state
    let state = AppState {
        pipeline: Arc::new(pipeline),
        config: config.clone(),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
    pub config: config::Config,
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::check))
        .route("/api/v1/live-traffic", get(handlers::traffic::live))
        .route("/api/v1/attack-feature-stats", get(handlers::stats::attack_feature_stats))
        .route("/api/v1/engine/status", get(handlers::stats::engine_status))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        )
        .with_state(state)
}
