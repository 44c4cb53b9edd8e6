//! Standard Scaler
//!
//! `(x - mean) / scale`, fitted at training time and shipped in the artifact.

use ndarray::{Array1, ArrayView1};
use crate::logic::error::{InferenceError, ModelError};

#[derive(Debug, Clone)]
pub struct StandardScaler {
    mean: Array1<f64>,
    scale: Array1<f64>,
}

impl StandardScaler {
    /// Zero scale entries become 1 (constant training columns)
    pub fn new(mean: Vec<f64>, scale: Vec<f64>) -> Result<Self, ModelError> {
        if mean.len() != scale.len() {
            return Err(ModelError::InvalidScaler(format!(
                "mean has {} entries, scale has {}",
                mean.len(),
                scale.len()
            )));
        }
        if mean.iter().chain(scale.iter()).any(|v| !v.is_finite()) {
            return Err(ModelError::InvalidScaler("non-finite parameter".to_string()));
        }

        let scale = scale
            .into_iter()
            .map(|s| if s == 0.0 { 1.0 } else { s })
            .collect::<Array1<f64>>();

        Ok(Self { mean: Array1::from(mean), scale })
    }

    /// Identity transform over `n` features
    pub fn identity(n: usize) -> Self {
        Self {
            mean: Array1::zeros(n),
            scale: Array1::ones(n),
        }
    }

    pub fn len(&self) -> usize {
        self.mean.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mean.is_empty()
    }

    pub fn transform(&self, x: &[f64]) -> Result<Array1<f64>, InferenceError> {
        if x.len() != self.mean.len() {
            return Err(InferenceError::ShapeMismatch {
                expected: self.mean.len(),
                actual: x.len(),
            });
        }
        Ok((&ArrayView1::from(x) - &self.mean) / &self.scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform() {
        let scaler = StandardScaler::new(vec![1.0, -2.0], vec![2.0, 0.5]).unwrap();
        let out = scaler.transform(&[3.0, -1.0]).unwrap();
        assert_eq!(out.to_vec(), vec![1.0, 2.0]);
    }

    #[test]
    fn test_zero_scale_treated_as_one() {
        let scaler = StandardScaler::new(vec![5.0], vec![0.0]).unwrap();
        assert_eq!(scaler.transform(&[7.0]).unwrap().to_vec(), vec![2.0]);
    }

    #[test]
    fn test_shape_mismatch() {
        let scaler = StandardScaler::identity(3);
        match scaler.transform(&[1.0]) {
            Err(InferenceError::ShapeMismatch { expected, actual }) => {
                assert_eq!((expected, actual), (3, 1));
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_rejects_bad_params() {
        assert!(StandardScaler::new(vec![0.0], vec![]).is_err());
        assert!(StandardScaler::new(vec![f64::NAN], vec![1.0]).is_err());
    }
}
