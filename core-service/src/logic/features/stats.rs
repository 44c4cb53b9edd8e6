//! Feature Statistics - Display unscaling
//!
//! Training-time mean/std per model feature. Used only to turn a
//! standardized value back into a human-scale number for the curated
//! display subset. `std` is only ever a multiplier, never a divisor.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

// ============================================================================
// FEATURE STATS TABLE
// ============================================================================

/// Mean and standard deviation of one feature at training time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureStat {
    pub mean: f64,
    pub std: f64,
}

/// (feature, mean, std)
/// Flow Bytes/s and Flow Packets/s carry std = 1.0 (inf/NaN in the raw data)
const RAW_STATS: &[(&str, f64, f64)] = &[
    ("Destination Port", 8071.48, 18283.63),
    ("Flow Duration", 14785663.93, 33653744.09),
    ("Total Fwd Packets", 9.36, 749.67),
    ("Total Backward Packets", 10.39, 997.39),
    ("Total Length of Fwd Packets", 549.30, 9993.59),
    ("Total Length of Bwd Packets", 16162.64, 2263088.05),
    ("Fwd Packet Length Max", 207.60, 717.18),
    ("Fwd Packet Length Min", 18.71, 60.34),
    ("Fwd Packet Length Mean", 58.20, 186.09),
    ("Fwd Packet Length Std", 68.91, 281.19),
    ("Bwd Packet Length Max", 870.85, 1946.37),
    ("Bwd Packet Length Min", 41.05, 68.86),
    ("Bwd Packet Length Mean", 305.95, 605.26),
    ("Bwd Packet Length Std", 335.33, 839.69),
    ("Flow Bytes/s", 3715.0378579999997, 1.0),
    ("Flow Packets/s", 69.742244285, 1.0),
    ("Flow IAT Mean", 1298448.71, 4507944.17),
    ("Flow IAT Std", 2919270.92, 8045869.78),
    ("Flow IAT Max", 9182475.32, 24459539.25),
    ("Flow IAT Min", 162379.56, 2950281.78),
    ("Fwd IAT Total", 14482961.73, 33575811.65),
    ("Fwd IAT Mean", 2610192.97, 9525722.49),
    ("Fwd IAT Std", 3266957.22, 9639055.40),
    ("Fwd IAT Max", 9042938.56, 24529157.40),
    ("Fwd IAT Min", 1021892.91, 8591436.34),
    ("Bwd IAT Total", 9893830.35, 28736614.20),
    ("Bwd IAT Mean", 1805783.77, 8887197.08),
    ("Bwd IAT Std", 1485973.35, 6278468.56),
    ("Bwd IAT Max", 4684692.43, 17160950.06),
    ("Bwd IAT Min", 967261.37, 8308983.09),
    ("Fwd PSH Flags", 0.05, 0.21),
    ("Fwd URG Flags", 0.00, 0.01),
    ("Fwd Header Length", -25997.39, 21052857.87),
    ("Bwd Header Length", -2273.28, 1452208.94),
    ("Fwd Packets/s", 63865.35, 247537.13),
    ("Bwd Packets/s", 6995.19, 38151.70),
    ("Min Packet Length", 16.43, 25.24),
    ("Max Packet Length", 950.40, 2028.23),
    ("Packet Length Mean", 171.94, 305.49),
    ("Packet Length Std", 294.98, 631.80),
    ("Packet Length Variance", 486154.79, 1647489.87),
    ("FIN Flag Count", 0.04, 0.18),
    ("SYN Flag Count", 0.05, 0.21),
    ("RST Flag Count", 0.00, 0.02),
    ("PSH Flag Count", 0.30, 0.46),
    ("ACK Flag Count", 0.32, 0.46),
    ("URG Flag Count", 0.09, 0.29),
    ("CWE Flag Count", 0.00, 0.01),
    ("ECE Flag Count", 0.00, 0.02),
    ("Down/Up Ratio", 0.68, 0.68),
    ("Average Packet Size", 191.98, 331.86),
    ("Avg Fwd Segment Size", 58.20, 186.09),
    ("Avg Bwd Segment Size", 305.95, 605.26),
    ("Fwd Header Length Extra", -25997.39, 21052857.87),
    ("Subflow Fwd Packets", 9.36, 749.67),
    ("Subflow Fwd Bytes", 549.29, 9980.07),
    ("Subflow Bwd Packets", 10.39, 997.39),
    ("Subflow Bwd Bytes", 16162.30, 2263057.28),
    ("Init_Win_bytes_forward", 6989.84, 14338.73),
    ("Init_Win_bytes_backward", 1989.43, 8456.88),
    ("act_data_pkt_fwd", 5.42, 636.43),
    ("min_seg_size_forward", -2741.69, 1084989.38),
    ("Active Mean", 81551.32, 648599.94),
    ("Active Std", 41134.12, 393381.52),
    ("Active Max", 153182.52, 1025824.97),
    ("Active Min", 58295.82, 577092.28),
    ("Idle Mean", 8316036.63, 23630078.58),
    ("Idle Std", 503843.95, 4602984.48),
    ("Idle Max", 8695751.98, 24366888.33),
    ("Idle Min", 7920031.01, 23363418.93),
];

static FEATURE_STATS: Lazy<HashMap<&'static str, FeatureStat>> = Lazy::new(|| {
    RAW_STATS
        .iter()
        .map(|&(name, mean, std)| (name, FeatureStat { mean, std }))
        .collect()
});

/// Lookup training statistics for a feature
pub fn feature_stat(name: &str) -> Option<FeatureStat> {
    FEATURE_STATS.get(name).copied()
}

// ============================================================================
// DISPLAY SUBSET
// ============================================================================

/// Features shown to operators, in display order.
/// Everything else stays internal to the model.
pub const DISPLAY_FEATURES: &[&str] = &[
    "Destination Port", "Flow Duration", "Flow Bytes/s",
    "Total Fwd Packets", "Total Backward Packets", "Flow Packets/s",
    "Fwd Packet Length Mean", "Fwd Packet Length Max", "Fwd Packet Length Min",
    "Bwd Packet Length Mean", "Bwd Packet Length Max", "Bwd Packet Length Min",
    "Fwd IAT Mean", "Fwd IAT Max", "Fwd IAT Min",
    "Bwd IAT Mean", "Bwd IAT Max", "Bwd IAT Min",
    "PSH Flag Count", "ACK Flag Count", "SYN Flag Count",
    "Active Mean", "Active Max", "Active Min",
    "Idle Mean", "Idle Max", "Idle Min",
];

/// Never displayed below zero
const NON_NEGATIVE_FEATURES: &[&str] = &["Destination Port", "Flow Duration"];

/// Displayed as whole numbers
const PORT_FEATURES: &[&str] = &["Destination Port"];

// ============================================================================
// UNSCALING
// ============================================================================

/// Human-scale display value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DisplayValue {
    Integer(i64),
    Decimal(f64),
}

impl DisplayValue {
    pub fn as_f64(&self) -> f64 {
        match self {
            DisplayValue::Integer(i) => *i as f64,
            DisplayValue::Decimal(d) => *d,
        }
    }
}

/// `original = scaled * std + mean`, clamped and rounded for display.
///
/// Returns `None` for features without training statistics.
pub fn unscale(feature: &str, scaled_value: f64) -> Option<DisplayValue> {
    let stat = feature_stat(feature)?;
    let mut value = scaled_value * stat.std + stat.mean;

    if NON_NEGATIVE_FEATURES.contains(&feature) {
        value = value.max(0.0);
    }

    if PORT_FEATURES.contains(&feature) {
        Some(DisplayValue::Integer(value.round() as i64))
    } else {
        Some(DisplayValue::Decimal((value * 100.0).round() / 100.0))
    }
}

// ============================================================================
// TESTS
// ============================================================================
