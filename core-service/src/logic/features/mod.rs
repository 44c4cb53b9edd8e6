//! Features Module - Model Input Schema & Adaptation
//!
//! Schema and adaptation live apart from the model.
//! Adding a feature only touches `layout.rs` + `stats.rs`.

pub mod layout;
pub mod record;
pub mod stats;
pub mod vector;
pub mod adapter;


// Re-export common types
pub use layout::{feature_index, feature_name, layout_hash, FEATURE_COUNT, FEATURE_LAYOUT};
pub use record::{FieldValue, FlowRecord};
pub use stats::{unscale, DisplayValue, DISPLAY_FEATURES};
pub use vector::ModelFeatures;
pub use adapter::{adapt, display_values, DisplayFields, TrafficStats};
