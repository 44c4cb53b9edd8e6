//! Explain Module - Per-instance attribution
//!
//! `tree_shap` is the algorithm, `engine` the ranking + narrative layer.

pub mod engine;
pub mod tree_shap;
pub mod types;

pub use engine::{Explainer, UNAVAILABLE_NARRATIVE};
pub use tree_shap::{ensemble_expected_value, ensemble_shap, tree_shap};
pub use types::{Explanation, FeatureAttribution, TopAttributions};
