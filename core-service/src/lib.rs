//! FlowSight Core - Flow Classification Engine
//!
//! Request-time decision pipeline:
//! Sampler → Feature Adapter → Classifier Gateway → Explainer → Ledger → Advice.
//!
//! ## Structure
//! - `logic::sampler` - Historical traffic replay with attack cooldown
//! - `logic::features` - Feature schema, adaptation, display unscaling
//! - `logic::model` - Tree-ensemble model, scaler, inference gateway
//! - `logic::explain` - TreeSHAP attribution + narrative
//! - `logic::ledger` - Cross-request attribution frequency counters
//! - `logic::threat` - Traffic labels and recommendation tables
//! - `logic::pipeline` - Orchestrator producing `TrafficReport`

pub mod constants;
pub mod logic;

pub use logic::config::{EngineConfig, SamplerConfig};
pub use logic::error::{
    ExplanationError, InferenceError, ModelError, PipelineError, SamplingError,
};
pub use logic::ledger::{AttributionLedger, LedgerSnapshot};
pub use logic::model::{ClassifierGateway, EngineStatus, RandomForest};
pub use logic::pipeline::{Pipeline, TrafficReport};
pub use logic::sampler::{FlowDataset, TrafficSampler};
