//! Feature Adapter
//!
//! Projects a raw `FlowRecord` onto the ordered model schema and pulls
//! the identity columns out verbatim for display.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use super::layout::FEATURE_LAYOUT;
use super::record::FlowRecord;
use super::stats::{unscale, DisplayValue, DISPLAY_FEATURES};
use super::vector::ModelFeatures;

// ============================================================================
// COLUMNS
// ============================================================================

pub const SOURCE_IP: &str = "Source IP";
pub const DESTINATION_IP: &str = "Destination IP";
pub const SOURCE_PORT: &str = "Source Port";
pub const PROTOCOL: &str = "Protocol";

/// Label/identity columns never fed to the model
pub const NON_MODEL_COLUMNS: &[&str] = &[
    crate::constants::LABEL_COLUMN,
    SOURCE_IP,
    DESTINATION_IP,
    SOURCE_PORT,
    PROTOCOL,
    "Label",
];

const UNKNOWN: &str = "unknown";

// ============================================================================
// DISPLAY FIELDS
// ============================================================================

/// Identity columns shown next to a classification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayFields {
    pub source_ip: String,
    pub destination_ip: String,
    pub source_port: i64,
    pub protocol: String,
}

// ============================================================================
// ADAPT
// ============================================================================

/// Split a record into model input and display identity.
///
/// Missing, non-numeric or non-finite model features become 0.
pub fn adapt(record: &FlowRecord) -> (ModelFeatures, DisplayFields) {
    let mut features = ModelFeatures::new();
    let mut missing = 0usize;

    for name in FEATURE_LAYOUT {
        // Identity columns never leak into the model even if a layout names them
        if NON_MODEL_COLUMNS.contains(name) {
            continue;
        }
        match record.number(name) {
            Some(value) => {
                features.set_by_name(name, value);
            }
            None => missing += 1,
        }
    }

    if missing > 0 {
        log::debug!("Adapter filled {} missing model features with 0", missing);
    }

    let display = DisplayFields {
        source_ip: record.text(SOURCE_IP).unwrap_or_else(|| UNKNOWN.to_string()),
        destination_ip: record.text(DESTINATION_IP).unwrap_or_else(|| UNKNOWN.to_string()),
        source_port: record
            .number(SOURCE_PORT)
            .filter(|p| p.is_finite())
            .map(|p| p.round() as i64)
            .unwrap_or(0),
        protocol: record.text(PROTOCOL).unwrap_or_else(|| UNKNOWN.to_string()),
    };

    (features, display)
}

// ============================================================================
// DISPLAY VALUES
// ============================================================================

/// Unscaled display values, kept in `DISPLAY_FEATURES` order.
/// Serializes as a JSON object in that order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrafficStats(Vec<(String, DisplayValue)>);

impl TrafficStats {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&DisplayValue> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DisplayValue)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v))
    }
}

impl Serialize for TrafficStats {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Human-scale values of the curated display subset
pub fn display_values(features: &ModelFeatures) -> TrafficStats {
    TrafficStats(
        DISPLAY_FEATURES
            .iter()
            .filter_map(|&name| {
                let scaled = features.get_by_name(name)?;
                unscale(name, scaled).map(|v| (name.to_string(), v))
            })
            .collect(),
    )
}
