//! Recommendation Engine
//!
//! Composition logic only: no tables, no state.
//! Input: predicted label + top attributing features
//! Output: operator guidance text

use super::rules::{table_for, UNKNOWN_LABEL_MESSAGE};
use super::types::TrafficLabel;

// ============================================================================
// MAIN FUNCTION
// ============================================================================

/// Compose guidance for a label from its advice table.
///
/// Pure and deterministic: the base sentence is always present, every rule
/// whose feature is among `top_features` adds its detail in table order, and
/// a closing sentence follows only when at least one detail fired.
/// Unknown labels return [`UNKNOWN_LABEL_MESSAGE`].
pub fn recommend<S: AsRef<str>>(label: &str, top_features: &[S]) -> String {
    let Some(table) = TrafficLabel::parse(label).and_then(table_for) else {
        return UNKNOWN_LABEL_MESSAGE.to_string();
    };

    let mut parts: Vec<&str> = vec![table.base];

    for detail in table.details {
        if top_features.iter().any(|f| f.as_ref() == detail.feature) {
            parts.push(detail.sentence);
        }
    }

    if parts.len() > 1 {
        parts.push(table.closing);
    }

    parts.join("\n")
}

// ============================================================================
// TESTS
// ============================================================================
