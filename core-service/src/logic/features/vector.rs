//! Model Features - Ordered model input
//!
//! **Versioned feature vector with layout validation**
//!
//! Values follow `FEATURE_LAYOUT` exactly. Every slot holds a finite
//! number; absent or unusable source values are 0.

use serde::{Deserialize, Serialize};

use super::layout::{layout_hash, FEATURE_COUNT, FEATURE_LAYOUT, FEATURE_VERSION};

// ============================================================================
// MODEL FEATURES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelFeatures {
    /// Feature layout version
    pub version: u8,
    /// CRC32 hash of the feature layout (for mismatch detection)
    pub layout_hash: u32,
    /// Values in order defined by FEATURE_LAYOUT
    values: Vec<f64>,
}

impl ModelFeatures {
    /// Zeroed vector with current layout
    pub fn new() -> Self {
        Self {
            version: FEATURE_VERSION,
            layout_hash: layout_hash(),
            values: vec![0.0; FEATURE_COUNT],
        }
    }

    /// Create from raw values (truncates or pads with 0 if wrong size)
    pub fn from_vec(mut values: Vec<f64>) -> Self {
        values.resize(FEATURE_COUNT, 0.0);
        for v in values.iter_mut() {
            if !v.is_finite() {
                *v = 0.0;
            }
        }
        Self {
            version: FEATURE_VERSION,
            layout_hash: layout_hash(),
            values,
        }
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied()
    }

    pub fn get_by_name(&self, name: &str) -> Option<f64> {
        super::layout::feature_index(name).and_then(|i| self.get(i))
    }

    /// Set feature by name; non-finite values are stored as 0
    pub fn set_by_name(&mut self, name: &str, value: f64) -> bool {
        match super::layout::feature_index(name) {
            Some(index) => {
                self.values[index] = if value.is_finite() { value } else { 0.0 };
                true
            }
            None => false,
        }
    }

    /// (name, value) pairs in layout order
    pub fn named_values(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        FEATURE_LAYOUT.iter().copied().zip(self.values.iter().copied())
    }
}

impl Default for ModelFeatures {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_zeroed_with_layout() {
        let v = ModelFeatures::new();
        assert_eq!(v.len(), FEATURE_COUNT);
        assert_eq!(v.layout_hash, layout_hash());
        assert!(v.as_slice().iter().all(|&x| x == 0.0));
    }

    #[test]
    fn test_from_vec_pads_and_sanitizes() {
        let v = ModelFeatures::from_vec(vec![1.0, f64::INFINITY, f64::NAN]);
        assert_eq!(v.len(), FEATURE_COUNT);
        assert_eq!(v.get(0), Some(1.0));
        assert_eq!(v.get(1), Some(0.0));
        assert_eq!(v.get(2), Some(0.0));
    }

    #[test]
    fn test_set_by_name() {
        let mut v = ModelFeatures::new();
        assert!(v.set_by_name("SYN Flag Count", 3.0));
        assert_eq!(v.get_by_name("SYN Flag Count"), Some(3.0));
        assert!(!v.set_by_name("Source IP", 1.0));
    }
}
