//! Traffic Sampling Module
//!
//! Historical flow dataset + cooldown-gated sampler.

pub mod dataset;
pub mod traffic;


pub use dataset::FlowDataset;
pub use traffic::{SamplerState, TrafficSampler};
