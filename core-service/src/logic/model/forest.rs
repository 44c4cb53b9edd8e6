//! Decision Trees & Random Forest
//!
//! Parallel-array trees decoded into nodes. Leaves hold normalized class
//! distributions; the forest averages them.

use serde::Serialize;

// ============================================================================
// TREE
// ============================================================================

/// Internal node test: `x[feature] <= threshold` goes left
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Split {
    pub feature: usize,
    pub threshold: f64,
    pub left: usize,
    pub right: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeNode {
    /// `None` for leaves
    pub split: Option<Split>,
    /// Training sample weight reaching this node
    pub cover: f64,
    /// Class distribution (sums to 1 on leaves)
    pub value: Vec<f64>,
}

impl TreeNode {
    pub fn is_leaf(&self) -> bool {
        self.split.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecisionTree {
    nodes: Vec<TreeNode>,
}

impl DecisionTree {
    /// Nodes must already be validated (root at 0, children after parents)
    pub(crate) fn from_nodes(nodes: Vec<TreeNode>) -> Self {
        Self { nodes }
    }

    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }

    pub fn node(&self, index: usize) -> &TreeNode {
        &self.nodes[index]
    }

    pub fn depth(&self) -> usize {
        fn walk(tree: &DecisionTree, index: usize) -> usize {
            match tree.nodes[index].split {
                Some(s) => 1 + walk(tree, s.left).max(walk(tree, s.right)),
                None => 0,
            }
        }
        walk(self, 0)
    }

    /// Leaf reached by `x`
    pub fn leaf(&self, x: &[f64]) -> &TreeNode {
        let mut node = &self.nodes[0];
        while let Some(split) = node.split {
            let next = if x[split.feature] <= split.threshold {
                split.left
            } else {
                split.right
            };
            node = &self.nodes[next];
        }
        node
    }

    pub fn predict_proba(&self, x: &[f64]) -> &[f64] {
        &self.leaf(x).value
    }

    /// Cover-weighted mean leaf value for `class` (the tree's baseline)
    pub fn expected_value(&self, class: usize) -> f64 {
        let root_cover = self.nodes[0].cover;
        self.nodes
            .iter()
            .filter(|n| n.is_leaf())
            .map(|n| n.cover * n.value[class])
            .sum::<f64>()
            / root_cover
    }
}

// ============================================================================
// FOREST
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct RandomForest {
    classes: Vec<String>,
    n_features: usize,
    trees: Vec<DecisionTree>,
}

impl RandomForest {
    /// Trees must be validated against `n_features` and `classes.len()`
    pub(crate) fn new(classes: Vec<String>, n_features: usize, trees: Vec<DecisionTree>) -> Self {
        Self { classes, n_features, trees }
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }

    pub fn class_index(&self, label: &str) -> Option<usize> {
        self.classes.iter().position(|c| c == label)
    }

    /// Mean of per-tree leaf distributions
    pub fn predict_proba(&self, x: &[f64]) -> Vec<f64> {
        let mut proba = vec![0.0; self.classes.len()];
        if self.trees.is_empty() {
            return proba;
        }
        for tree in &self.trees {
            for (p, v) in proba.iter_mut().zip(tree.predict_proba(x)) {
                *p += v;
            }
        }
        let n = self.trees.len() as f64;
        proba.iter_mut().for_each(|p| *p /= n);
        proba
    }

    /// Mean of per-tree baselines for `class`
    pub fn expected_value(&self, class: usize) -> f64 {
        if self.trees.is_empty() {
            return 0.0;
        }
        self.trees.iter().map(|t| t.expected_value(class)).sum::<f64>() / self.trees.len() as f64
    }
}

// ============================================================================
// TESTS
// ============================================================================
