//! Exact TreeSHAP (path-dependent)
//!
//! Polynomial-time Shapley values for decision trees (Lundberg et al.,
//! Algorithm 2). Missing features are marginalized using node covers, so
//! `expected_value + sum(phi) == f(x)` holds exactly per tree.

use crate::logic::error::ExplanationError;
use crate::logic::model::{DecisionTree, TreeNode};

#[derive(Debug, Clone, Copy)]
struct PathElement {
    /// `None` for the root sentinel
    feature: Option<usize>,
    zero_fraction: f64,
    one_fraction: f64,
    pweight: f64,
}

/// Append an element at `unique_depth` and grow the permutation weights
fn extend_path(
    path: &mut Vec<PathElement>,
    unique_depth: usize,
    zero_fraction: f64,
    one_fraction: f64,
    feature: Option<usize>,
) {
    path.push(PathElement {
        feature,
        zero_fraction,
        one_fraction,
        pweight: if unique_depth == 0 { 1.0 } else { 0.0 },
    });

    let d = unique_depth as f64;
    for i in (0..unique_depth).rev() {
        let w = path[i].pweight;
        path[i + 1].pweight += one_fraction * w * (i as f64 + 1.0) / (d + 1.0);
        path[i].pweight = zero_fraction * w * (d - i as f64) / (d + 1.0);
    }
}

/// Inverse of `extend_path` for the element at `path_index`
fn unwind_path(path: &mut Vec<PathElement>, unique_depth: usize, path_index: usize) {
    let one_fraction = path[path_index].one_fraction;
    let zero_fraction = path[path_index].zero_fraction;
    let d = unique_depth as f64;
    let mut next_one_portion = path[unique_depth].pweight;

    for i in (0..unique_depth).rev() {
        if one_fraction != 0.0 {
            let tmp = path[i].pweight;
            path[i].pweight = next_one_portion * (d + 1.0) / ((i as f64 + 1.0) * one_fraction);
            next_one_portion = tmp - path[i].pweight * zero_fraction * (d - i as f64) / (d + 1.0);
        } else {
            path[i].pweight = path[i].pweight * (d + 1.0) / (zero_fraction * (d - i as f64));
        }
    }

    for i in path_index..unique_depth {
        path[i].feature = path[i + 1].feature;
        path[i].zero_fraction = path[i + 1].zero_fraction;
        path[i].one_fraction = path[i + 1].one_fraction;
    }
    path.truncate(unique_depth);
}

/// Total permutation weight if `path_index` were unwound (path untouched)
fn unwound_path_sum(path: &[PathElement], unique_depth: usize, path_index: usize) -> f64 {
    let one_fraction = path[path_index].one_fraction;
    let zero_fraction = path[path_index].zero_fraction;
    let d = unique_depth as f64;
    let mut next_one_portion = path[unique_depth].pweight;
    let mut total = 0.0;

    if one_fraction != 0.0 {
        for i in (0..unique_depth).rev() {
            let tmp = next_one_portion / ((i as f64 + 1.0) * one_fraction);
            total += tmp;
            next_one_portion = path[i].pweight - tmp * zero_fraction * (d - i as f64);
        }
    } else if zero_fraction != 0.0 {
        for i in (0..unique_depth).rev() {
            total += path[i].pweight / (zero_fraction * (d - i as f64));
        }
    }

    total * (d + 1.0)
}

struct Walk<'a> {
    tree: &'a DecisionTree,
    x: &'a [f64],
    class: usize,
    phi: &'a mut [f64],
}

fn node_at(tree: &DecisionTree, index: usize) -> Result<&TreeNode, ExplanationError> {
    tree.nodes()
        .get(index)
        .ok_or_else(|| ExplanationError::MalformedTree(format!("node {} does not exist", index)))
}

impl Walk<'_> {
    fn recurse(
        &mut self,
        node_index: usize,
        mut unique_depth: usize,
        parent_path: &[PathElement],
        zero_fraction: f64,
        one_fraction: f64,
        feature: Option<usize>,
    ) -> Result<(), ExplanationError> {
        let mut path = Vec::with_capacity(unique_depth + 2);
        path.extend_from_slice(&parent_path[..unique_depth]);
        extend_path(&mut path, unique_depth, zero_fraction, one_fraction, feature);

        let tree = self.tree;
        let node = node_at(tree, node_index)?;
        let node_cover = node.cover;
        let split = match node.split {
            None => {
                let leaf_value = *node.value.get(self.class).ok_or_else(|| {
                    ExplanationError::MalformedTree(format!(
                        "leaf {} has no value for class {}",
                        node_index, self.class
                    ))
                })?;
                for i in 1..=unique_depth {
                    let w = unwound_path_sum(&path, unique_depth, i);
                    let el = path[i];
                    if let Some(f) = el.feature {
                        let slot = self.phi.get_mut(f).ok_or_else(|| {
                            ExplanationError::MalformedTree(format!("feature {} out of range", f))
                        })?;
                        *slot += w * (el.one_fraction - el.zero_fraction) * leaf_value;
                    }
                }
                return Ok(());
            }
            Some(split) => split,
        };

        let value = *self.x.get(split.feature).ok_or(ExplanationError::FeatureCountMismatch {
            expected: split.feature + 1,
            actual: self.x.len(),
        })?;
        let (hot, cold) = if value <= split.threshold {
            (split.left, split.right)
        } else {
            (split.right, split.left)
        };
        let hot_zero_fraction = node_at(tree, hot)?.cover / node_cover;
        let cold_zero_fraction = node_at(tree, cold)?.cover / node_cover;

        let mut incoming_zero_fraction = 1.0;
        let mut incoming_one_fraction = 1.0;

        // Feature already on the path: undo that split and redo it here
        if let Some(k) = path.iter().position(|el| el.feature == Some(split.feature)) {
            incoming_zero_fraction = path[k].zero_fraction;
            incoming_one_fraction = path[k].one_fraction;
            unwind_path(&mut path, unique_depth, k);
            unique_depth -= 1;
        }

        self.recurse(
            hot,
            unique_depth + 1,
            &path,
            hot_zero_fraction * incoming_zero_fraction,
            incoming_one_fraction,
            Some(split.feature),
        )?;
        self.recurse(
            cold,
            unique_depth + 1,
            &path,
            cold_zero_fraction * incoming_zero_fraction,
            0.0,
            Some(split.feature),
        )
    }
}

/// Add the SHAP values of one tree's `class` output for `x` into `phi`
pub fn tree_shap(
    tree: &DecisionTree,
    x: &[f64],
    class: usize,
    phi: &mut [f64],
) -> Result<(), ExplanationError> {
    let mut walk = Walk { tree, x, class, phi };
    walk.recurse(0, 0, &[], 1.0, 1.0, None)
}

/// Mean SHAP values over an ensemble
pub fn ensemble_shap(
    trees: &[DecisionTree],
    x: &[f64],
    class: usize,
) -> Result<Vec<f64>, ExplanationError> {
    let mut phi = vec![0.0; x.len()];
    if trees.is_empty() {
        return Ok(phi);
    }
    for tree in trees {
        tree_shap(tree, x, class, &mut phi)?;
    }
    let n = trees.len() as f64;
    phi.iter_mut().for_each(|p| *p /= n);
    Ok(phi)
}

/// Mean per-tree baseline for `class`, checked against the leaf distributions
pub fn ensemble_expected_value(trees: &[DecisionTree], class: usize) -> Result<f64, ExplanationError> {
    if trees.is_empty() {
        return Ok(0.0);
    }
    let mut total = 0.0;
    for tree in trees {
        let root_cover = tree
            .nodes()
            .first()
            .map(|n| n.cover)
            .ok_or_else(|| ExplanationError::MalformedTree("empty tree".to_string()))?;
        for node in tree.nodes().iter().filter(|n| n.is_leaf()) {
            let v = node.value.get(class).ok_or_else(|| {
                ExplanationError::MalformedTree(format!("leaf has no value for class {}", class))
            })?;
            total += node.cover * v / root_cover;
        }
    }
    Ok(total / trees.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::model::Split;

    fn leaf(cover: f64, value: [f64; 2]) -> TreeNode {
        TreeNode { split: None, cover, value: value.to_vec() }
    }

    fn split(feature: usize, threshold: f64, left: usize, right: usize, cover: f64) -> TreeNode {
        TreeNode {
            split: Some(Split { feature, threshold, left, right }),
            cover,
            value: vec![],
        }
    }

    fn stump() -> DecisionTree {
        DecisionTree::from_nodes(vec![
            split(0, 0.5, 1, 2, 10.0),
            leaf(5.0, [1.0, 0.0]),
            leaf(5.0, [0.0, 1.0]),
        ])
    }

    /// Three features; feature 0 is split twice on one path
    fn repeated_feature_tree() -> DecisionTree {
        DecisionTree::from_nodes(vec![
            split(0, 0.5, 1, 2, 100.0),
            split(1, 0.0, 3, 4, 60.0),
            split(0, 2.0, 5, 6, 40.0),
            leaf(30.0, [1.0, 0.0]),
            split(2, 1.0, 7, 8, 30.0),
            leaf(25.0, [0.3, 0.7]),
            leaf(15.0, [0.0, 1.0]),
            leaf(10.0, [0.5, 0.5]),
            leaf(20.0, [0.9, 0.1]),
        ])
    }

    /// E[f(x) | x_S] with cover-weighted marginalization of features outside S
    fn conditional_expectation(tree: &DecisionTree, x: &[f64], class: usize, known: u32, node: usize) -> f64 {
        let n = tree.node(node);
        match n.split {
            None => n.value[class],
            Some(s) if known & (1 << s.feature) != 0 => {
                let next = if x[s.feature] <= s.threshold { s.left } else { s.right };
                conditional_expectation(tree, x, class, known, next)
            }
            Some(s) => {
                let l = tree.node(s.left).cover / n.cover;
                let r = tree.node(s.right).cover / n.cover;
                l * conditional_expectation(tree, x, class, known, s.left)
                    + r * conditional_expectation(tree, x, class, known, s.right)
            }
        }
    }

    fn factorial(n: usize) -> f64 {
        (1..=n).map(|k| k as f64).product()
    }

    /// Shapley values by subset enumeration
    fn brute_force(tree: &DecisionTree, x: &[f64], class: usize) -> Vec<f64> {
        let m = x.len();
        let mut phi = vec![0.0; m];
        for i in 0..m {
            for subset in 0u32..(1 << m) {
                if subset & (1 << i) != 0 {
                    continue;
                }
                let s = subset.count_ones() as usize;
                let weight = factorial(s) * factorial(m - s - 1) / factorial(m);
                let with = conditional_expectation(tree, x, class, subset | (1 << i), 0);
                let without = conditional_expectation(tree, x, class, subset, 0);
                phi[i] += weight * (with - without);
            }
        }
        phi
    }

    fn assert_close(a: &[f64], b: &[f64]) {
        for (x, y) in a.iter().zip(b) {
            assert!((x - y).abs() < 1e-9, "{:?} vs {:?}", a, b);
        }
    }

    #[test]
    fn test_stump_attribution() {
        let mut phi = vec![0.0];
        tree_shap(&stump(), &[1.0], 1, &mut phi).unwrap();
        assert!((phi[0] - 0.5).abs() < 1e-12);

        let mut phi = vec![0.0];
        tree_shap(&stump(), &[0.0], 1, &mut phi).unwrap();
        assert!((phi[0] + 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_local_accuracy() {
        let tree = repeated_feature_tree();
        let instances = [
            [0.0, -1.0, 0.0],
            [0.0, 1.0, 0.5],
            [0.0, 1.0, 3.0],
            [1.0, 0.0, 0.0],
            [3.0, 5.0, 5.0],
        ];
        for x in &instances {
            for class in 0..2 {
                let mut phi = vec![0.0; 3];
                tree_shap(&tree, x, class, &mut phi).unwrap();
                let total = tree.expected_value(class) + phi.iter().sum::<f64>();
                assert!(
                    (total - tree.predict_proba(x)[class]).abs() < 1e-9,
                    "x={:?} class={}",
                    x,
                    class
                );
            }
        }
    }

    #[test]
    fn test_matches_brute_force_shapley() {
        let tree = repeated_feature_tree();
        for x in &[[0.0, 1.0, 0.5], [1.0, -1.0, 2.0], [2.5, 0.0, 0.0]] {
            let mut phi = vec![0.0; 3];
            tree_shap(&tree, x, 1, &mut phi).unwrap();
            assert_close(&phi, &brute_force(&tree, x, 1));
        }
    }

    #[test]
    fn test_unused_feature_gets_zero() {
        let mut phi = vec![0.0; 3];
        tree_shap(&stump(), &[1.0, 9.0, -9.0], 0, &mut phi).unwrap();
        assert_eq!(phi[1], 0.0);
        assert_eq!(phi[2], 0.0);
    }

    #[test]
    fn test_ensemble_is_tree_mean() {
        let trees = vec![stump(), repeated_feature_tree()];
        let x = [1.0, 1.0, 0.5];
        let phi = ensemble_shap(&trees, &x, 1).unwrap();

        let mut a = vec![0.0; 3];
        let mut b = vec![0.0; 3];
        tree_shap(&trees[0], &x, 1, &mut a).unwrap();
        tree_shap(&trees[1], &x, 1, &mut b).unwrap();
        let mean: Vec<f64> = a.iter().zip(&b).map(|(p, q)| (p + q) / 2.0).collect();
        assert_close(&phi, &mean);
    }

    #[test]
    fn test_ensemble_expected_value_is_tree_mean() {
        let trees = vec![stump(), repeated_feature_tree()];
        let expected = (trees[0].expected_value(1) + trees[1].expected_value(1)) / 2.0;
        assert!((ensemble_expected_value(&trees, 1).unwrap() - expected).abs() < 1e-12);
        assert_eq!(ensemble_expected_value(&[], 1).unwrap(), 0.0);
    }

    #[test]
    fn test_malformed_input_is_error_not_panic() {
        // Split on a feature the instance does not carry
        let mut phi = vec![0.0];
        let wide = DecisionTree::from_nodes(vec![
            split(4, 0.5, 1, 2, 10.0),
            leaf(5.0, [1.0, 0.0]),
            leaf(5.0, [0.0, 1.0]),
        ]);
        assert!(matches!(
            tree_shap(&wide, &[1.0], 1, &mut phi),
            Err(ExplanationError::FeatureCountMismatch { .. })
        ));

        // Child index past the node table
        let dangling = DecisionTree::from_nodes(vec![split(0, 0.5, 1, 7, 10.0), leaf(5.0, [1.0, 0.0])]);
        assert!(matches!(
            tree_shap(&dangling, &[0.0], 1, &mut phi),
            Err(ExplanationError::MalformedTree(_))
        ));

        // Class outside the leaf distributions
        assert!(matches!(
            tree_shap(&stump(), &[0.0], 5, &mut phi),
            Err(ExplanationError::MalformedTree(_))
        ));
        assert!(matches!(
            ensemble_expected_value(&[stump()], 5),
            Err(ExplanationError::MalformedTree(_))
        ));
    }
}
