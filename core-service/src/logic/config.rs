//! Engine Configuration
//!
//! Runtime knobs for the pipeline. Defaults come from `constants`,
//! `from_env()` applies the environment overrides.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants;
use crate::logic::threat::TrafficLabel;

// ============================================================================
// SAMPLER CONFIG
// ============================================================================

/// Traffic sampler configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplerConfig {
    /// Probability of an attack draw outside cooldown (0.0 - 1.0)
    pub attack_probability: f64,
    /// Minimum seconds between two injected attacks
    pub cooldown_secs: u64,
    /// Categorical distribution over attack labels
    pub attack_weights: Vec<(TrafficLabel, f64)>,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            attack_probability: constants::DEFAULT_ATTACK_PROBABILITY,
            cooldown_secs: constants::DEFAULT_ATTACK_COOLDOWN_SECS,
            attack_weights: vec![
                (TrafficLabel::Bot, 0.15),
                (TrafficLabel::BruteForce, 0.20),
                (TrafficLabel::DDoS, 0.15),
                (TrafficLabel::DoS, 0.20),
                (TrafficLabel::PortScan, 0.20),
                (TrafficLabel::WebAttack, 0.10),
            ],
        }
    }
}

impl SamplerConfig {
    pub fn from_env() -> Self {
        Self {
            attack_probability: constants::get_attack_probability(),
            cooldown_secs: constants::get_attack_cooldown_secs(),
            ..Default::default()
        }
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_secs)
    }
}

// ============================================================================
// ENGINE CONFIG
// ============================================================================

/// Full engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub dataset_path: PathBuf,
    pub model_path: PathBuf,
    /// Expected sha256 (hex) of the model artifact
    pub model_sha256: Option<String>,
    pub sampler: SamplerConfig,
    /// Kill-switch for attribution
    pub explain_enabled: bool,
    pub top_attributions: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            dataset_path: PathBuf::from(constants::DEFAULT_DATASET_PATH),
            model_path: PathBuf::from(constants::DEFAULT_MODEL_PATH),
            model_sha256: None,
            sampler: SamplerConfig::default(),
            explain_enabled: true,
            top_attributions: constants::TOP_ATTRIBUTIONS,
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            dataset_path: PathBuf::from(constants::get_dataset_path()),
            model_path: PathBuf::from(constants::get_model_path()),
            model_sha256: constants::get_model_sha256(),
            sampler: SamplerConfig::from_env(),
            explain_enabled: constants::is_explain_enabled(),
            top_attributions: constants::TOP_ATTRIBUTIONS,
        }
    }
}
