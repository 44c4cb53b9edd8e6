//! Error Taxonomy
//!
//! - `SamplingError`, `InferenceError`: abort the run.
//! - `ExplanationError`: recovered inside the Explainer.
//! - `ModelError`: startup only (artifact load).

use thiserror::Error;

// ============================================================================
// SAMPLING
// ============================================================================

#[derive(Debug, Error)]
pub enum SamplingError {
    #[error("dataset unavailable: {0}")]
    DatasetIo(#[from] std::io::Error),

    #[error("dataset parse error at line {line}: {reason}")]
    DatasetParse { line: usize, reason: String },

    #[error("dataset has no '{0}' column")]
    MissingLabelColumn(String),

    #[error("dataset contains no records")]
    EmptyDataset,

    #[error("no records labeled '{0}'")]
    EmptyCategory(String),
}

// ============================================================================
// MODEL (startup)
// ============================================================================

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model artifact unavailable: {0}")]
    Io(#[from] std::io::Error),

    #[error("model artifact is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("model checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    #[error("feature layout mismatch: expected hash {expected:08x}, got {actual:08x}")]
    LayoutMismatch { expected: u32, actual: u32 },

    #[error("invalid tree #{tree}: {reason}")]
    InvalidTree { tree: usize, reason: String },

    #[error("invalid scaler: {0}")]
    InvalidScaler(String),

    #[error("model declares no classes")]
    NoClasses,

    #[error("unsupported model artifact: {0}")]
    Unsupported(String),
}

// ============================================================================
// INFERENCE
// ============================================================================

#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("expected {expected} features, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("model produced no output")]
    NoOutput,

    #[error("invalid class probabilities: {0}")]
    InvalidProbabilities(String),
}

// ============================================================================
// EXPLANATION
// ============================================================================

#[derive(Debug, Error)]
pub enum ExplanationError {
    #[error("predicted label '{0}' is not a model class")]
    UnknownClass(String),

    #[error("instance has {actual} features, model expects {expected}")]
    FeatureCountMismatch { expected: usize, actual: usize },

    #[error("attribution for '{0}' is not finite")]
    NonFiniteAttribution(String),

    #[error("tree cannot be attributed: {0}")]
    MalformedTree(String),
}

// ============================================================================
// PIPELINE
// ============================================================================

/// Errors that abort a pipeline run (`Model` only at load time)
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("sampling failed: {0}")]
    Sampling(#[from] SamplingError),

    #[error("inference failed: {0}")]
    Inference(#[from] InferenceError),

    #[error("model load failed: {0}")]
    Model(#[from] ModelError),
}
