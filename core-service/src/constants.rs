//! Central Configuration Constants
//!
//! Single source of truth for all configuration defaults.
//! Environment variables override every default here.

/// Default historical dataset location
pub const DEFAULT_DATASET_PATH: &str = "network/test_data_with_network_info.csv";

/// Default model artifact location
pub const DEFAULT_MODEL_PATH: &str = "models/random_forest.json";

/// Probability that an unconstrained draw injects an attack
pub const DEFAULT_ATTACK_PROBABILITY: f64 = 0.15;

/// Minimum time between two injected attacks (seconds)
pub const DEFAULT_ATTACK_COOLDOWN_SECS: u64 = 30;

/// Number of attributions kept per explanation
pub const TOP_ATTRIBUTIONS: usize = 5;

/// Ground-truth label column of the historical dataset
pub const LABEL_COLUMN: &str = "Attack Type";

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "FlowSight";

// ============================================
// Helper functions to read from env with fallback
// ============================================

/// Get dataset path from environment or use default
pub fn get_dataset_path() -> String {
    std::env::var("FLOWSIGHT_DATASET_PATH")
        .unwrap_or_else(|_| DEFAULT_DATASET_PATH.to_string())
}

/// Get model artifact path from environment or use default
pub fn get_model_path() -> String {
    std::env::var("FLOWSIGHT_MODEL_PATH")
        .unwrap_or_else(|_| DEFAULT_MODEL_PATH.to_string())
}

/// Get expected model checksum (hex sha256), if pinned
pub fn get_model_sha256() -> Option<String> {
    std::env::var("FLOWSIGHT_MODEL_SHA256")
        .ok()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
}

/// Get attack probability from environment or use default
pub fn get_attack_probability() -> f64 {
    std::env::var("FLOWSIGHT_ATTACK_PROBABILITY")
        .ok()
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|p| p.is_finite())
        .map(|p| p.clamp(0.0, 1.0))
        .unwrap_or(DEFAULT_ATTACK_PROBABILITY)
}

/// Get attack cooldown from environment or use default
pub fn get_attack_cooldown_secs() -> u64 {
    std::env::var("FLOWSIGHT_ATTACK_COOLDOWN_SECS")
        .ok()
        .and_then(|s| parse_cooldown_secs(&s))
        .unwrap_or(DEFAULT_ATTACK_COOLDOWN_SECS)
}

/// Parse a cooldown value; rejects anything chrono cannot hold as seconds
pub fn parse_cooldown_secs(raw: &str) -> Option<u64> {
    let secs = raw.trim().parse::<u64>().ok()?;
    let fits = i64::try_from(secs)
        .ok()
        .and_then(chrono::Duration::try_seconds)
        .is_some();
    if !fits {
        log::warn!("Attack cooldown {}s out of range, using default", secs);
        return None;
    }
    Some(secs)
}

/// Check if attribution is enabled
pub fn is_explain_enabled() -> bool {
    std::env::var("FLOWSIGHT_EXPLAIN_ENABLED")
        .map(|s| s.to_lowercase() != "false" && s != "0")
        .unwrap_or(true)
}
