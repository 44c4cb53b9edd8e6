//! Model Module - Tree-ensemble inference
//!
//! Artifact loading is separate from inference so the model family can
//! be swapped behind the `Classifier`/`TreeEnsemble` traits.

pub mod artifact;
pub mod forest;
pub mod scaler;
pub mod inference;

// Re-export common types
pub use artifact::{load_model, LoadedModel, ModelArtifact};
pub use forest::{DecisionTree, RandomForest, Split, TreeNode};
pub use inference::{
    ClassificationResult, Classifier, ClassifierGateway, EngineStatus, TreeEnsemble,
};
pub use scaler::StandardScaler;
