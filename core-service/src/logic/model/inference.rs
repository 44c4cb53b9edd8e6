//! Classifier Gateway - Model inference boundary
//!
//! The model is a capability set (`transform`, `predict_proba`, `predict`)
//! plus tree structure for attribution. Any model family implementing
//! `TreeEnsemble` plugs in; the gateway adds validation and latency stats.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::artifact::{load_model, LoadedModel};
use super::forest::DecisionTree;
use crate::logic::error::{InferenceError, ModelError};
use crate::logic::features::layout::LayoutInfo;
use crate::logic::features::ModelFeatures;

/// Tolerance on `sum(class_probabilities) == 1`
const PROBABILITY_TOLERANCE: f64 = 1e-6;

// ============================================================================
// CAPABILITIES
// ============================================================================

/// Opaque classifier capability
pub trait Classifier: Send + Sync {
    fn classes(&self) -> &[String];

    /// Training-time normalization
    fn transform(&self, features: &[f64]) -> Result<Vec<f64>, InferenceError>;

    /// Class probabilities for an already transformed instance
    fn predict_proba(&self, scaled: &[f64]) -> Result<Vec<f64>, InferenceError>;

    /// Predicted class index (first wins on ties)
    fn predict(&self, scaled: &[f64]) -> Result<usize, InferenceError> {
        let proba = self.predict_proba(scaled)?;
        argmax(&proba).ok_or(InferenceError::NoOutput)
    }

    fn class_index(&self, label: &str) -> Option<usize> {
        self.classes().iter().position(|c| c == label)
    }
}

/// Tree structure needed for local attribution
pub trait TreeEnsemble: Classifier {
    fn trees(&self) -> &[DecisionTree];
}

pub(crate) fn argmax(values: &[f64]) -> Option<usize> {
    values
        .iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f64)>, (i, &v)| match best {
            Some((_, b)) if b >= v => best,
            _ => Some((i, v)),
        })
        .map(|(i, _)| i)
}

impl Classifier for LoadedModel {
    fn classes(&self) -> &[String] {
        self.forest.classes()
    }

    fn transform(&self, features: &[f64]) -> Result<Vec<f64>, InferenceError> {
        Ok(self.scaler.transform(features)?.to_vec())
    }

    fn predict_proba(&self, scaled: &[f64]) -> Result<Vec<f64>, InferenceError> {
        if scaled.len() != self.forest.n_features() {
            return Err(InferenceError::ShapeMismatch {
                expected: self.forest.n_features(),
                actual: scaled.len(),
            });
        }
        Ok(self.forest.predict_proba(scaled))
    }
}

impl TreeEnsemble for LoadedModel {
    fn trees(&self) -> &[DecisionTree] {
        self.forest.trees()
    }
}

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// Label + class distribution for one instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub label: String,
    pub class_index: usize,
    /// Ordered as the model classes, sums to 1
    pub class_probabilities: Vec<f64>,
    /// Transformed instance the model saw
    pub scaled: Vec<f64>,
    pub inference_time_us: u64,
}

impl ClassificationResult {
    /// max(class_probabilities) as a percentage
    pub fn confidence(&self) -> f64 {
        self.class_probabilities
            .iter()
            .copied()
            .fold(0.0, f64::max)
            * 100.0
    }
}

/// Engine status for the status endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineStatus {
    pub model_loaded: bool,
    pub model_path: String,
    pub model_sha256: String,
    pub classes: Vec<String>,
    pub tree_count: usize,
    pub inference_count: u64,
    pub avg_latency_ms: f64,
    pub loaded_at: DateTime<Utc>,
    /// Feature layout the engine was built against
    pub feature_layout: LayoutInfo,
}

// ============================================================================
// GATEWAY
// ============================================================================

pub struct ClassifierGateway {
    model: Box<dyn TreeEnsemble>,
    model_path: String,
    model_sha256: String,
    loaded_at: DateTime<Utc>,
    latency_sum_us: AtomicU64,
    inference_count: AtomicU64,
}

impl ClassifierGateway {
    pub fn new(
        model: impl TreeEnsemble + 'static,
        model_path: impl Into<String>,
        model_sha256: impl Into<String>,
    ) -> Self {
        Self {
            model: Box::new(model),
            model_path: model_path.into(),
            model_sha256: model_sha256.into(),
            loaded_at: Utc::now(),
            latency_sum_us: AtomicU64::new(0),
            inference_count: AtomicU64::new(0),
        }
    }

    /// Load a model artifact from disk
    pub fn load(path: &Path, expected_sha256: Option<&str>) -> Result<Self, ModelError> {
        let model = load_model(path, expected_sha256)?;
        let sha256 = model.sha256.clone();
        Ok(Self::new(model, path.display().to_string(), sha256))
    }

    pub fn model(&self) -> &dyn TreeEnsemble {
        self.model.as_ref()
    }

    pub fn classes(&self) -> &[String] {
        self.model.classes()
    }

    /// Transform + predict. Never defaults: any model failure is an error.
    pub fn classify(&self, features: &ModelFeatures) -> Result<ClassificationResult, InferenceError> {
        let start = Instant::now();

        let scaled = self.model.transform(features.as_slice())?;
        let class_probabilities = self.model.predict_proba(&scaled)?;

        let classes = self.model.classes();
        if class_probabilities.is_empty() {
            return Err(InferenceError::NoOutput);
        }
        if class_probabilities.len() != classes.len() {
            return Err(InferenceError::InvalidProbabilities(format!(
                "{} probabilities for {} classes",
                class_probabilities.len(),
                classes.len()
            )));
        }
        if class_probabilities.iter().any(|p| !p.is_finite()) {
            return Err(InferenceError::InvalidProbabilities("non-finite value".to_string()));
        }
        let total: f64 = class_probabilities.iter().sum();
        if (total - 1.0).abs() > PROBABILITY_TOLERANCE {
            return Err(InferenceError::InvalidProbabilities(format!("sum is {}", total)));
        }

        let class_index = argmax(&class_probabilities).ok_or(InferenceError::NoOutput)?;
        let label = classes
            .get(class_index)
            .cloned()
            .ok_or(InferenceError::NoOutput)?;

        let inference_time_us = start.elapsed().as_micros() as u64;
        self.latency_sum_us.fetch_add(inference_time_us, Ordering::Relaxed);
        self.inference_count.fetch_add(1, Ordering::Relaxed);

        Ok(ClassificationResult {
            label,
            class_index,
            class_probabilities,
            scaled,
            inference_time_us,
        })
    }

    pub fn status(&self) -> EngineStatus {
        let sum = self.latency_sum_us.load(Ordering::Relaxed);
        let count = self.inference_count.load(Ordering::Relaxed);
        let avg = if count > 0 { (sum as f64 / count as f64) / 1000.0 } else { 0.0 };

        EngineStatus {
            model_loaded: true,
            model_path: self.model_path.clone(),
            model_sha256: self.model_sha256.clone(),
            classes: self.model.classes().to_vec(),
            tree_count: self.model.trees().len(),
            inference_count: count,
            avg_latency_ms: avg,
            loaded_at: self.loaded_at,
            feature_layout: LayoutInfo::current(),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::features::{layout_hash, FEATURE_COUNT};
    use crate::logic::model::artifact::fixtures;

    fn gateway() -> ClassifierGateway {
        let (forest, scaler) = fixtures::artifact().into_model().unwrap();
        let model = LoadedModel { forest, scaler, sha256: "abc".to_string() };
        ClassifierGateway::new(model, "memory", "abc")
    }

    /// Model that returns a fixed distribution
    struct Fixed(Vec<String>, Vec<f64>);

    impl Classifier for Fixed {
        fn classes(&self) -> &[String] {
            &self.0
        }
        fn transform(&self, features: &[f64]) -> Result<Vec<f64>, InferenceError> {
            Ok(features.to_vec())
        }
        fn predict_proba(&self, _scaled: &[f64]) -> Result<Vec<f64>, InferenceError> {
            Ok(self.1.clone())
        }
    }

    impl TreeEnsemble for Fixed {
        fn trees(&self) -> &[DecisionTree] {
            &[]
        }
    }

    /// Fixed distribution that counts forest evaluations
    struct Counting(Vec<String>, AtomicU64);

    impl Classifier for Counting {
        fn classes(&self) -> &[String] {
            &self.0
        }
        fn transform(&self, features: &[f64]) -> Result<Vec<f64>, InferenceError> {
            Ok(features.to_vec())
        }
        fn predict_proba(&self, _scaled: &[f64]) -> Result<Vec<f64>, InferenceError> {
            self.1.fetch_add(1, Ordering::SeqCst);
            Ok(vec![0.25, 0.75])
        }
    }

    impl TreeEnsemble for Counting {
        fn trees(&self) -> &[DecisionTree] {
            &[]
        }
    }

    fn fixed(proba: Vec<f64>) -> ClassifierGateway {
        let classes = vec!["BENIGN".to_string(), "DoS".to_string()];
        ClassifierGateway::new(Fixed(classes, proba), "mock", "")
    }

    #[test]
    fn test_benign_instance() {
        let gw = gateway();
        let result = gw.classify(&ModelFeatures::new()).unwrap();

        assert_eq!(result.label, "BENIGN");
        assert_eq!(result.class_index, 0);
        let expected = (55.0 / 60.0 + 0.8) / 2.0;
        assert!((result.class_probabilities[0] - expected).abs() < 1e-12);
        assert!((result.confidence() - expected * 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_attack_instance() {
        let gw = gateway();
        let mut features = ModelFeatures::new();
        features.set_by_name("SYN Flag Count", 1.0);
        features.set_by_name("Flow Duration", 1.0);
        features.set_by_name("Destination Port", 1.0);

        let result = gw.classify(&features).unwrap();
        assert_eq!(result.label, "DoS");
        assert!((result.class_probabilities[1] - 0.65).abs() < 1e-12);
        assert_eq!(result.scaled.len(), features.len());
        assert_eq!(gw.model().predict(&result.scaled).unwrap(), result.class_index);
    }

    #[test]
    fn test_classify_evaluates_model_once() {
        use std::sync::Arc;

        struct Shared(Arc<Counting>);
        impl Classifier for Shared {
            fn classes(&self) -> &[String] {
                self.0.classes()
            }
            fn transform(&self, features: &[f64]) -> Result<Vec<f64>, InferenceError> {
                self.0.transform(features)
            }
            fn predict_proba(&self, scaled: &[f64]) -> Result<Vec<f64>, InferenceError> {
                self.0.predict_proba(scaled)
            }
        }
        impl TreeEnsemble for Shared {
            fn trees(&self) -> &[DecisionTree] {
                &[]
            }
        }

        let counting = Arc::new(Counting(
            vec!["BENIGN".to_string(), "DoS".to_string()],
            AtomicU64::new(0),
        ));
        let gw = ClassifierGateway::new(Shared(Arc::clone(&counting)), "mock", "");

        let result = gw.classify(&ModelFeatures::new()).unwrap();
        assert_eq!(result.label, "DoS");
        assert_eq!(result.class_index, 1);
        assert_eq!(counting.1.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_status_counts_inferences() {
        let gw = gateway();
        for _ in 0..3 {
            gw.classify(&ModelFeatures::new()).unwrap();
        }
        let status = gw.status();
        assert!(status.model_loaded);
        assert_eq!(status.inference_count, 3);
        assert_eq!(status.tree_count, 2);
        assert_eq!(status.classes, fixtures::CLASSES);
        assert_eq!(status.model_sha256, "abc");
        assert_eq!(status.feature_layout.feature_count, FEATURE_COUNT);
        assert_eq!(status.feature_layout.hash, layout_hash());
    }

    #[test]
    fn test_empty_output_is_error() {
        let gw = fixed(vec![]);
        assert!(matches!(gw.classify(&ModelFeatures::new()), Err(InferenceError::NoOutput)));
        assert_eq!(gw.status().inference_count, 0);
    }

    #[test]
    fn test_bad_probabilities_are_errors() {
        assert!(matches!(
            fixed(vec![0.5]).classify(&ModelFeatures::new()),
            Err(InferenceError::InvalidProbabilities(_))
        ));
        assert!(matches!(
            fixed(vec![0.5, 0.6]).classify(&ModelFeatures::new()),
            Err(InferenceError::InvalidProbabilities(_))
        ));
        assert!(matches!(
            fixed(vec![f64::NAN, 1.0]).classify(&ModelFeatures::new()),
            Err(InferenceError::InvalidProbabilities(_))
        ));
    }

    #[test]
    fn test_argmax_first_wins() {
        assert_eq!(argmax(&[0.5, 0.5]), Some(0));
        assert_eq!(argmax(&[0.1, 0.7, 0.2]), Some(1));
        assert_eq!(argmax(&[]), None);
    }
}
