//! Traffic Labels
//!
//! Benign/attack taxonomy shared by the dataset, the model classes,
//! the ledger and the advice tables.
//! Data only, no logic.

use serde::{Deserialize, Serialize};

// ============================================================================
// TRAFFIC LABEL
// ============================================================================

/// Known traffic classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TrafficLabel {
    #[serde(rename = "BENIGN")]
    Benign,
    #[serde(rename = "DoS")]
    DoS,
    #[serde(rename = "DDoS")]
    DDoS,
    #[serde(rename = "Port Scan")]
    PortScan,
    #[serde(rename = "Brute Force")]
    BruteForce,
    #[serde(rename = "Bot")]
    Bot,
    #[serde(rename = "Web Attack")]
    WebAttack,
}

impl TrafficLabel {
    /// Attack labels in ledger/report order
    pub const ATTACKS: [TrafficLabel; 6] = [
        TrafficLabel::DoS,
        TrafficLabel::DDoS,
        TrafficLabel::PortScan,
        TrafficLabel::BruteForce,
        TrafficLabel::Bot,
        TrafficLabel::WebAttack,
    ];

    /// Label as written in the dataset and model classes
    pub fn as_str(&self) -> &'static str {
        match self {
            TrafficLabel::Benign => "BENIGN",
            TrafficLabel::DoS => "DoS",
            TrafficLabel::DDoS => "DDoS",
            TrafficLabel::PortScan => "Port Scan",
            TrafficLabel::BruteForce => "Brute Force",
            TrafficLabel::Bot => "Bot",
            TrafficLabel::WebAttack => "Web Attack",
        }
    }

    /// Parse a dataset/model label (exact match)
    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "BENIGN" => Some(TrafficLabel::Benign),
            "DoS" => Some(TrafficLabel::DoS),
            "DDoS" => Some(TrafficLabel::DDoS),
            "Port Scan" => Some(TrafficLabel::PortScan),
            "Brute Force" => Some(TrafficLabel::BruteForce),
            "Bot" => Some(TrafficLabel::Bot),
            "Web Attack" => Some(TrafficLabel::WebAttack),
            _ => None,
        }
    }

    pub fn is_attack(&self) -> bool {
        !matches!(self, TrafficLabel::Benign)
    }
}

impl std::fmt::Display for TrafficLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// TESTS
// ============================================================================
