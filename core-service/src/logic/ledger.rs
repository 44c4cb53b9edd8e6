//! Attribution Ledger
//!
//! Per attack label, how often each feature appeared among the top
//! attributions. In-memory for the process lifetime; never reset.
//! BENIGN is never tracked.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::logic::threat::TrafficLabel;

pub type FeatureCounts = BTreeMap<String, u64>;

// ============================================================================
// SNAPSHOT
// ============================================================================

/// Point-in-time copy; always lists every attack label in ledger order
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerSnapshot {
    counts: Vec<(TrafficLabel, FeatureCounts)>,
}

impl Default for LedgerSnapshot {
    fn default() -> Self {
        Self {
            counts: TrafficLabel::ATTACKS
                .iter()
                .map(|&label| (label, FeatureCounts::new()))
                .collect(),
        }
    }
}

impl LedgerSnapshot {
    pub fn get(&self, label: &str) -> Option<&FeatureCounts> {
        self.counts
            .iter()
            .find(|(l, _)| l.as_str() == label)
            .map(|(_, c)| c)
    }

    pub fn count(&self, label: &str, feature: &str) -> u64 {
        self.get(label)
            .and_then(|c| c.get(feature))
            .copied()
            .unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (TrafficLabel, &FeatureCounts)> {
        self.counts.iter().map(|(l, c)| (*l, c))
    }

    /// Labels with at least one count, features by count descending
    /// (ties by name): `"\n<label>:\n  <feature>: <n> times..."`
    pub fn frequency_report(&self) -> String {
        let mut out = String::new();
        for (label, counts) in self.iter() {
            if counts.is_empty() {
                continue;
            }
            let mut sorted: Vec<(&String, &u64)> = counts.iter().collect();
            sorted.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));

            let lines: Vec<String> = sorted
                .iter()
                .map(|(feature, n)| format!("  {}: {} times", feature, n))
                .collect();

            out.push_str(&format!("\n{}:\n", label));
            out.push_str(&lines.join("\n"));
        }
        out
    }
}

impl Serialize for LedgerSnapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.counts.len()))?;
        for (label, counts) in &self.counts {
            map.serialize_entry(label.as_str(), counts)?;
        }
        map.end()
    }
}

// ============================================================================
// LEDGER
// ============================================================================

/// Shared by reference (or `Arc`) between concurrent pipeline runs
#[derive(Debug, Default)]
pub struct AttributionLedger {
    counters: Mutex<HashMap<TrafficLabel, FeatureCounts>>,
}

impl AttributionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Add one per feature under `label`. Returns false (no-op) for
    /// BENIGN and unknown labels.
    pub fn record<S: AsRef<str>>(&self, label: &str, features: &[S]) -> bool {
        let label = match TrafficLabel::parse(label) {
            Some(l) if l.is_attack() => l,
            _ => return false,
        };

        let mut counters = self.counters.lock();
        let counts = counters.entry(label).or_default();
        for feature in features {
            *counts.entry(feature.as_ref().to_string()).or_insert(0) += 1;
        }
        true
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        let counters = self.counters.lock();
        LedgerSnapshot {
            counts: TrafficLabel::ATTACKS
                .iter()
                .map(|label| (*label, counters.get(label).cloned().unwrap_or_default()))
                .collect(),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
