//! Threat Module
//!
//! Traffic taxonomy and the Recommendation Engine.
//!
//! ## Structure
//! - `types`: `TrafficLabel` (benign + six attack classes)
//! - `rules`: Declarative advice tables
//! - `recommend`: Pure composition of guidance text
//!
//! ## Usage
//! ```ignore
//! use crate::logic::threat::recommend;
//!
//! let advice = recommend("DoS", &["SYN Flag Count"]);
//! ```

pub mod types;
pub mod rules;
pub mod recommend;

// Re-export main types for convenience
pub use types::TrafficLabel;

pub use rules::{
    AdviceTable,
    DetailRule,
    ADVICE_TABLES,
    ATTACK_CLOSING,
    BENIGN_CLOSING,
    UNKNOWN_LABEL_MESSAGE,
};

pub use recommend::recommend;
