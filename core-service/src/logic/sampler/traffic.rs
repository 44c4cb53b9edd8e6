//! Traffic Sampler
//!
//! Simulates an incoming observation by drawing one historical record:
//! benign-only during the attack cooldown, otherwise a Bernoulli attack
//! draw followed by a weighted attack-category pick.

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use rand::distributions::{Distribution, WeightedIndex};
use rand::seq::SliceRandom;
use rand::Rng;

use super::dataset::FlowDataset;
use crate::logic::config::SamplerConfig;
use crate::logic::error::SamplingError;
use crate::logic::features::FlowRecord;
use crate::logic::threat::TrafficLabel;

// ============================================================================
// STATE
// ============================================================================

#[derive(Debug, Default, Clone)]
pub struct SamplerState {
    pub last_attack_time: Option<DateTime<Utc>>,
}

// ============================================================================
// SAMPLER
// ============================================================================

pub struct TrafficSampler {
    dataset: FlowDataset,
    config: SamplerConfig,
    state: Mutex<SamplerState>,
}

impl TrafficSampler {
    pub fn new(dataset: FlowDataset, config: SamplerConfig) -> Self {
        Self {
            dataset,
            config,
            state: Mutex::new(SamplerState::default()),
        }
    }

    pub fn dataset(&self) -> &FlowDataset {
        &self.dataset
    }

    pub fn state(&self) -> SamplerState {
        self.state.lock().clone()
    }

    /// Draw one record using the thread RNG and the wall clock
    pub fn sample(&self) -> Result<FlowRecord, SamplingError> {
        let mut rng = rand::thread_rng();
        self.sample_with(&mut rng, Utc::now())
    }

    /// Draw one record at instant `now`.
    ///
    /// Cooldown check, draw and timestamp update happen under one lock so
    /// two concurrent callers can never both inject an attack.
    pub fn sample_with<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        now: DateTime<Utc>,
    ) -> Result<FlowRecord, SamplingError> {
        let mut state = self.state.lock();

        if self.in_cooldown(&state, now) {
            log::debug!("Attack cooldown active, sampling benign traffic");
            return self.sample_label(rng, TrafficLabel::Benign);
        }

        let p_attack = match self.config.attack_probability {
            p if p.is_finite() => p.clamp(0.0, 1.0),
            _ => 0.0,
        };
        if rng.gen_bool(p_attack) {
            if let Some(label) = self.pick_attack(rng) {
                if let Ok(record) = self.sample_label(rng, label) {
                    state.last_attack_time = Some(now);
                    log::info!("Injected {} sample", label);
                    return Ok(record);
                }
                log::debug!("No records for {}, falling back to benign", label);
            }
        }

        self.sample_label(rng, TrafficLabel::Benign)
    }

    fn in_cooldown(&self, state: &SamplerState, now: DateTime<Utc>) -> bool {
        let cooldown = cooldown_window(self.config.cooldown_secs);
        match state.last_attack_time {
            Some(last) => now - last < cooldown,
            None => false,
        }
    }

    fn pick_attack<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<TrafficLabel> {
        let weights: Vec<f64> = self.config.attack_weights.iter().map(|(_, w)| *w).collect();
        match WeightedIndex::new(&weights) {
            Ok(dist) => Some(self.config.attack_weights[dist.sample(rng)].0),
            Err(e) => {
                log::warn!("Invalid attack weights: {}", e);
                None
            }
        }
    }

    fn sample_label<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        label: TrafficLabel,
    ) -> Result<FlowRecord, SamplingError> {
        self.dataset
            .indices(label.as_str())
            .choose(rng)
            .and_then(|&i| self.dataset.get(i))
            .cloned()
            .ok_or_else(|| SamplingError::EmptyCategory(label.as_str().to_string()))
    }
}

/// Cooldown length as a chrono duration, saturating at the largest
/// representable span instead of wrapping or panicking.
pub(crate) fn cooldown_window(secs: u64) -> Duration {
    i64::try_from(secs)
        .ok()
        .and_then(Duration::try_seconds)
        .unwrap_or(Duration::MAX)
}
