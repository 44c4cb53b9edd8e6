//! Logic Module - Detection Pipeline & Engines
//!
//! - `sampler/` - Historical traffic replay
//! - `features/` - Feature schema & adaptation
//! - `model/` - Tree-ensemble inference
//! - `explain/` - Attribution engine
//! - `threat/` - Labels & operator advice
//! - `ledger` / `pipeline` - Shared counters & orchestration

pub mod config;
pub mod error;

pub mod features;
pub mod sampler;
pub mod model;
pub mod explain;
pub mod threat;
pub mod ledger;
pub mod pipeline;
