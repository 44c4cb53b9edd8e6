//! HTTP handlers

pub mod health;
pub mod traffic;
pub mod stats;
