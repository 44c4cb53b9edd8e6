//! Model Artifact - On-disk format, checksum and validation
//!
//! JSON export of a trained random forest using parallel node arrays
//! (`-1` child = leaf), plus the StandardScaler fitted alongside it.
//! Nothing unvalidated reaches the inference path.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::forest::{DecisionTree, RandomForest, Split, TreeNode};
use super::scaler::StandardScaler;
use crate::logic::error::ModelError;
use crate::logic::features::layout::{compute_layout_hash, layout_hash, FEATURE_COUNT, FEATURE_VERSION};

pub const ARTIFACT_FORMAT_VERSION: u32 = 1;
pub const MODEL_TYPE_RANDOM_FOREST: &str = "random_forest";

/// Relative tolerance for `cover[parent] == cover[left] + cover[right]`
const COVER_TOLERANCE: f64 = 1e-6;

// ============================================================================
// FORMAT
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScalerParams {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeArtifact {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    /// Per-node class counts (or fractions)
    pub value: Vec<Vec<f64>>,
    pub node_sample_weight: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub format_version: u32,
    pub model_type: String,
    pub feature_names: Vec<String>,
    pub classes: Vec<String>,
    pub scaler: ScalerParams,
    pub trees: Vec<TreeArtifact>,
}

/// Validated model ready for inference
#[derive(Debug, Clone)]
pub struct LoadedModel {
    pub forest: RandomForest,
    pub scaler: StandardScaler,
    /// Hex sha256 of the artifact bytes
    pub sha256: String,
}

// ============================================================================
// LOADING
// ============================================================================

pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Read, checksum and validate an artifact
pub fn load_model(path: &Path, expected_sha256: Option<&str>) -> Result<LoadedModel, ModelError> {
    log::info!("Loading model artifact from: {:?}", path);

    let bytes = fs::read(path)?;
    let sha256 = sha256_hex(&bytes);

    if let Some(expected) = expected_sha256 {
        if !expected.eq_ignore_ascii_case(&sha256) {
            return Err(ModelError::ChecksumMismatch {
                expected: expected.to_lowercase(),
                actual: sha256,
            });
        }
    }

    let artifact: ModelArtifact = serde_json::from_slice(&bytes)?;
    let (forest, scaler) = artifact.into_model()?;

    log::info!(
        "Model loaded: sha256={} classes={:?} trees={} layout={:08x}",
        sha256,
        forest.classes(),
        forest.trees().len(),
        layout_hash()
    );

    Ok(LoadedModel { forest, scaler, sha256 })
}

impl ModelArtifact {
    /// Validate and decode into inference structures
    pub fn into_model(self) -> Result<(RandomForest, StandardScaler), ModelError> {
        if self.format_version != ARTIFACT_FORMAT_VERSION {
            return Err(ModelError::Unsupported(format!(
                "format_version {}",
                self.format_version
            )));
        }
        if self.model_type != MODEL_TYPE_RANDOM_FOREST {
            return Err(ModelError::Unsupported(format!("model_type '{}'", self.model_type)));
        }

        let actual = compute_layout_hash(FEATURE_VERSION, &self.feature_names);
        if actual != layout_hash() {
            return Err(ModelError::LayoutMismatch {
                expected: layout_hash(),
                actual,
            });
        }

        if self.classes.is_empty() {
            return Err(ModelError::NoClasses);
        }

        let scaler = StandardScaler::new(self.scaler.mean, self.scaler.scale)?;
        if scaler.len() != FEATURE_COUNT {
            return Err(ModelError::InvalidScaler(format!(
                "expected {} entries, got {}",
                FEATURE_COUNT,
                scaler.len()
            )));
        }

        if self.trees.is_empty() {
            return Err(ModelError::Unsupported("forest has no trees".to_string()));
        }

        let n_classes = self.classes.len();
        let trees = self
            .trees
            .into_iter()
            .enumerate()
            .map(|(i, t)| decode_tree(i, t, FEATURE_COUNT, n_classes))
            .collect::<Result<Vec<_>, _>>()?;

        Ok((RandomForest::new(self.classes, FEATURE_COUNT, trees), scaler))
    }
}

// ============================================================================
// TREE VALIDATION
// ============================================================================

fn decode_tree(
    tree: usize,
    raw: TreeArtifact,
    n_features: usize,
    n_classes: usize,
) -> Result<DecisionTree, ModelError> {
    let invalid = |reason: String| ModelError::InvalidTree { tree, reason };

    let n = raw.children_left.len();
    if n == 0 {
        return Err(invalid("no nodes".to_string()));
    }
    let lengths = [
        raw.children_right.len(),
        raw.feature.len(),
        raw.threshold.len(),
        raw.value.len(),
        raw.node_sample_weight.len(),
    ];
    if lengths.iter().any(|&l| l != n) {
        return Err(invalid(format!("node arrays differ in length ({} nodes)", n)));
    }

    let mut parents = vec![0usize; n];
    let mut nodes = Vec::with_capacity(n);

    for i in 0..n {
        let cover = raw.node_sample_weight[i];
        if !(cover.is_finite() && cover > 0.0) {
            return Err(invalid(format!("node {} has cover {}", i, cover)));
        }

        let row = &raw.value[i];
        if row.len() != n_classes {
            return Err(invalid(format!(
                "node {} has {} class values, expected {}",
                i,
                row.len(),
                n_classes
            )));
        }
        if row.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(invalid(format!("node {} has invalid class values", i)));
        }
        let total: f64 = row.iter().sum();

        let split = match (raw.children_left[i], raw.children_right[i]) {
            (-1, -1) => {
                if total <= 0.0 {
                    return Err(invalid(format!("leaf {} has empty class distribution", i)));
                }
                None
            }
            (l, r) if l > i as i64 && r > i as i64 && (l as usize) < n && (r as usize) < n => {
                let (left, right) = (l as usize, r as usize);
                parents[left] += 1;
                parents[right] += 1;

                let feature = raw.feature[i];
                if feature < 0 || feature as usize >= n_features {
                    return Err(invalid(format!("node {} splits on feature {}", i, feature)));
                }
                let threshold = raw.threshold[i];
                if !threshold.is_finite() {
                    return Err(invalid(format!("node {} has non-finite threshold", i)));
                }

                let children = raw.node_sample_weight[left] + raw.node_sample_weight[right];
                if (children - cover).abs() > COVER_TOLERANCE * cover {
                    return Err(invalid(format!(
                        "node {} cover {} != children cover {}",
                        i, cover, children
                    )));
                }

                Some(Split {
                    feature: feature as usize,
                    threshold,
                    left,
                    right,
                })
            }
            (l, r) => {
                return Err(invalid(format!("node {} has bad children ({}, {})", i, l, r)));
            }
        };

        let value = if total > 0.0 {
            row.iter().map(|v| v / total).collect()
        } else {
            row.clone()
        };

        nodes.push(TreeNode { split, cover, value });
    }

    if let Some(i) = (1..n).find(|&i| parents[i] != 1) {
        return Err(invalid(format!("node {} has {} parents", i, parents[i])));
    }

    Ok(DecisionTree::from_nodes(nodes))
}

// ============================================================================
// TESTS
// ============================================================================


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use tempfile::tempdir;

    fn write(artifact: &ModelArtifact) -> (tempfile::TempDir, std::path::PathBuf, Vec<u8>) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("model.json");
        let bytes = serde_json::to_vec(artifact).unwrap();
        fs::write(&path, &bytes).unwrap();
        (dir, path, bytes)
    }

    #[test]
    fn test_load_valid_artifact() {
        let (_dir, path, bytes) = write(&artifact());
        let model = load_model(&path, None).unwrap();

        assert_eq!(model.forest.classes(), &CLASSES);
        assert_eq!(model.forest.trees().len(), 2);
        assert_eq!(model.sha256, sha256_hex(&bytes));
        // Leaf distributions are normalized
        let leaf = model.forest.trees()[0].node(1);
        assert!((leaf.value.iter().sum::<f64>() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_checksum_pinning() {
        let (_dir, path, bytes) = write(&artifact());
        let good = sha256_hex(&bytes).to_uppercase();
        assert!(load_model(&path, Some(&good)).is_ok());

        let bad = "0".repeat(64);
        assert!(matches!(
            load_model(&path, Some(&bad)),
            Err(ModelError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn test_layout_mismatch_rejected() {
        let mut a = artifact();
        a.feature_names.swap(0, 1);
        assert!(matches!(a.into_model(), Err(ModelError::LayoutMismatch { .. })));
    }

    #[test]
    fn test_cycle_rejected() {
        let mut a = artifact();
        a.trees[1].children_left[0] = 0;
        assert!(matches!(a.into_model(), Err(ModelError::InvalidTree { tree: 1, .. })));
    }

    #[test]
    fn test_cover_mismatch_rejected() {
        let mut a = artifact();
        a.trees[0].node_sample_weight[1] = 61.0;
        assert!(matches!(a.into_model(), Err(ModelError::InvalidTree { tree: 0, .. })));
    }

    #[test]
    fn test_feature_out_of_range_rejected() {
        let mut a = artifact();
        a.trees[1].feature[0] = FEATURE_COUNT as i64;
        assert!(matches!(a.into_model(), Err(ModelError::InvalidTree { .. })));
    }

    #[test]
    fn test_half_leaf_rejected() {
        let mut a = artifact();
        a.trees[1].children_right[0] = -1;
        assert!(matches!(a.into_model(), Err(ModelError::InvalidTree { .. })));
    }

    #[test]
    fn test_scaler_length_checked() {
        let mut a = artifact();
        a.scaler.mean.pop();
        a.scaler.scale.pop();
        assert!(matches!(a.into_model(), Err(ModelError::InvalidScaler(_))));
    }

    #[test]
    fn test_no_classes_rejected() {
        let mut a = artifact();
        a.classes.clear();
        assert!(matches!(a.into_model(), Err(ModelError::NoClasses)));
    }

    #[test]
    fn test_unsupported_model_type() {
        let mut a = artifact();
        a.model_type = "gradient_boosting".to_string();
        assert!(matches!(a.into_model(), Err(ModelError::Unsupported(_))));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            load_model(Path::new("/nonexistent/model.json"), None),
            Err(ModelError::Io(_))
        ));
    }
}
