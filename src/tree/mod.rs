//! Regression trees and the random forest ensemble built on them.
//!
//! This module implements:
//! - CART regression trees split on sum-of-squared-error reduction
//! - Random forest regression (bootstrap aggregation with per-split
//!   random feature subsets)
//! - Mean-decrease-in-impurity feature importances
//!
//! # Example
//!
//! ```
//! use building_energy::primitives::{Matrix, Vector};
//! use building_energy::tree::RandomForestRegressor;
//! use building_energy::traits::Estimator;
//!
//! let x = Matrix::from_vec(6, 1, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).expect("valid shape");
//! let y = Vector::from_slice(&[10.0, 10.0, 10.0, 50.0, 50.0, 50.0]);
//!
//! let mut rf = RandomForestRegressor::new(20)
//!     .with_max_depth(3)
//!     .with_random_state(42);
//! rf.fit(&x, &y).expect("fit should succeed");
//!
//! let importances = rf.feature_importances().expect("fitted");
//! assert!((importances.iter().sum::<f64>() - 1.0).abs() < 1e-6);
//! ```

mod forest;

pub use forest::{MaxFeatures, RandomForestRegressor};

use crate::error::{EnergyError, Result};
use crate::primitives::{Matrix, Vector};
use crate::traits::Estimator;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// Leaf node in a regression tree.
///
/// Holds the mean target of the training samples that reached it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionLeaf {
    /// Predicted value for this leaf (mean of y values)
    pub value: f64,
    /// Number of training samples in this leaf
    pub n_samples: usize,
}

/// Internal node in a regression tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionNode {
    /// Index of the feature to split on
    pub feature_idx: usize,
    /// Threshold value for the split
    pub threshold: f64,
    /// Reduction in sum of squared errors achieved by this split
    pub impurity_decrease: f64,
    /// Number of training samples that reached this node
    pub n_samples: usize,
    /// Left subtree (samples where feature <= threshold)
    pub left: Box<RegressionTreeNode>,
    /// Right subtree (samples where feature > threshold)
    pub right: Box<RegressionTreeNode>,
}

/// A node in a regression tree (either internal node or leaf).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RegressionTreeNode {
    /// Internal decision node with split condition
    Node(RegressionNode),
    /// Leaf node with value prediction
    Leaf(RegressionLeaf),
}

impl RegressionTreeNode {
    /// Returns the depth of the tree rooted at this node.
    ///
    /// Leaf nodes have depth 0, internal nodes have depth 1 + max(left, right).
    #[must_use]
    pub fn depth(&self) -> usize {
        match self {
            RegressionTreeNode::Leaf(_) => 0,
            RegressionTreeNode::Node(node) => 1 + node.left.depth().max(node.right.depth()),
        }
    }

    /// Number of leaves below (and including) this node.
    #[must_use]
    pub fn n_leaves(&self) -> usize {
        match self {
            RegressionTreeNode::Leaf(_) => 1,
            RegressionTreeNode::Node(node) => node.left.n_leaves() + node.right.n_leaves(),
        }
    }

    fn predict_row(&self, row: &[f64]) -> f64 {
        let mut node = self;
        loop {
            match node {
                RegressionTreeNode::Leaf(leaf) => return leaf.value,
                RegressionTreeNode::Node(internal) => {
                    node = if row[internal.feature_idx] <= internal.threshold {
                        &internal.left
                    } else {
                        &internal.right
                    };
                }
            }
        }
    }

    /// First split feature index that is not below `n_features`.
    fn out_of_range_feature(&self, n_features: usize) -> Option<usize> {
        match self {
            RegressionTreeNode::Leaf(_) => None,
            RegressionTreeNode::Node(n) if n.feature_idx >= n_features => Some(n.feature_idx),
            RegressionTreeNode::Node(n) => n
                .left
                .out_of_range_feature(n_features)
                .or_else(|| n.right.out_of_range_feature(n_features)),
        }
    }

    fn accumulate_importances(&self, importances: &mut [f64]) {
        if let RegressionTreeNode::Node(n) = self {
            importances[n.feature_idx] += n.impurity_decrease;
            n.left.accumulate_importances(importances);
            n.right.accumulate_importances(importances);
        }
    }
}

/// Decision tree regressor using the CART algorithm.
///
/// Splits minimize the summed squared error of the two children. When
/// `max_features` is set, each split only considers that many randomly
/// chosen features.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTreeRegressor {
    tree: Option<RegressionTreeNode>,
    n_features: usize,
    max_depth: Option<usize>,
    min_samples_split: usize,
    min_samples_leaf: usize,
    max_features: Option<usize>,
    random_state: Option<u64>,
}

impl DecisionTreeRegressor {
    /// Creates a new decision tree regressor with default parameters.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tree: None,
            n_features: 0,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            random_state: None,
        }
    }

    /// Sets the maximum depth of the tree (root has depth 0).
    #[must_use]
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Sets the minimum number of samples required to split an internal node.
    #[must_use]
    pub fn with_min_samples_split(mut self, min_samples: usize) -> Self {
        self.min_samples_split = min_samples.max(2);
        self
    }

    /// Sets the minimum number of samples required to be at a leaf node.
    #[must_use]
    pub fn with_min_samples_leaf(mut self, min_samples: usize) -> Self {
        self.min_samples_leaf = min_samples.max(1);
        self
    }

    /// Limits each split to `n` randomly chosen candidate features.
    #[must_use]
    pub fn with_max_features(mut self, n: usize) -> Self {
        self.max_features = Some(n.max(1));
        self
    }

    /// Sets the seed used for feature subsampling.
    #[must_use]
    pub fn with_random_state(mut self, random_state: u64) -> Self {
        self.random_state = Some(random_state);
        self
    }

    /// Root of the fitted tree, if any.
    #[must_use]
    pub fn root(&self) -> Option<&RegressionTreeNode> {
        self.tree.as_ref()
    }

    /// Number of features seen during fit.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Predicts a single sample.
    ///
    /// # Errors
    ///
    /// Returns `NotFitted` before `fit`, or `DimensionMismatch` if the row
    /// length differs from the training feature count.
    pub fn predict_row(&self, row: &[f64]) -> Result<f64> {
        let tree = self.tree.as_ref().ok_or(EnergyError::NotFitted)?;
        if row.len() != self.n_features {
            return Err(EnergyError::dimension_mismatch(
                "n_features",
                self.n_features,
                row.len(),
            ));
        }
        Ok(tree.predict_row(row))
    }

    /// Checks that every split refers to a feature seen during fit.
    ///
    /// Fitted trees always pass; this guards trees read back from disk.
    ///
    /// # Errors
    ///
    /// Returns `Serialization` naming the first out-of-range feature index.
    pub fn check_structure(&self) -> Result<()> {
        match self
            .tree
            .as_ref()
            .and_then(|root| root.out_of_range_feature(self.n_features))
        {
            Some(idx) => Err(EnergyError::Serialization(format!(
                "split on feature {idx} but the tree has {} features",
                self.n_features
            ))),
            None => Ok(()),
        }
    }

    /// Total impurity decrease per feature (not normalized).
    #[must_use]
    pub fn raw_feature_importances(&self) -> Option<Vec<f64>> {
        let tree = self.tree.as_ref()?;
        let mut importances = vec![0.0; self.n_features];
        tree.accumulate_importances(&mut importances);
        Some(importances)
    }

    /// Feature importances normalized to sum to 1.0.
    #[must_use]
    pub fn feature_importances(&self) -> Option<Vec<f64>> {
        self.raw_feature_importances().map(normalize_importances)
    }

    pub(crate) fn fit_indices(
        &mut self,
        x: &Matrix<f64>,
        y: &[f64],
        indices: Vec<usize>,
        rng: &mut StdRng,
    ) {
        let n_features = x.n_cols();
        let params = SplitParams {
            max_depth: self.max_depth,
            min_samples_split: self.min_samples_split,
            min_samples_leaf: self.min_samples_leaf,
            max_features: self.max_features.map_or(n_features, |m| m.min(n_features)),
        };
        self.n_features = n_features;
        self.tree = Some(build_regression_tree(x, y, indices, 0, &params, rng));
    }
}

impl Default for DecisionTreeRegressor {
    fn default() -> Self {
        Self::new()
    }
}

impl Estimator for DecisionTreeRegressor {
    fn fit(&mut self, x: &Matrix<f64>, y: &Vector<f64>) -> Result<()> {
        let (n_rows, n_cols) = x.shape();
        if n_rows != y.len() {
            return Err(EnergyError::dimension_mismatch("n_samples", n_rows, y.len()));
        }
        if n_rows == 0 {
            return Err(EnergyError::empty("cannot fit a tree with zero samples"));
        }
        if n_cols == 0 {
            return Err(EnergyError::empty("cannot fit a tree with zero features"));
        }

        let mut rng = match self.random_state {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        self.fit_indices(x, y.as_slice(), (0..n_rows).collect(), &mut rng);
        Ok(())
    }

    fn predict(&self, x: &Matrix<f64>) -> Result<Vector<f64>> {
        let predictions = (0..x.n_rows())
            .map(|row| self.predict_row(x.row(row)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Vector::from_vec(predictions))
    }
}

/// Scales importances so they sum to 1.0.
///
/// A forest that never split carries no signal about any feature; it gets
/// uniform importances.
pub(crate) fn normalize_importances(mut importances: Vec<f64>) -> Vec<f64> {
    let total: f64 = importances.iter().sum();
    if total > 0.0 && total.is_finite() {
        for importance in &mut importances {
            *importance /= total;
        }
    } else if !importances.is_empty() {
        let uniform = 1.0 / importances.len() as f64;
        importances.iter_mut().for_each(|v| *v = uniform);
    }
    importances
}

// ========================================================================
// Tree building
// ========================================================================

struct SplitParams {
    max_depth: Option<usize>,
    min_samples_split: usize,
    min_samples_leaf: usize,
    max_features: usize,
}

struct BestSplit {
    feature_idx: usize,
    threshold: f64,
    gain: f64,
}

/// Sum of squared deviations from the mean.
fn sum_squared_error(y: &[f64], indices: &[usize]) -> f64 {
    if indices.len() < 2 {
        return 0.0;
    }
    let mean = mean_of(y, indices);
    indices.iter().map(|&i| (y[i] - mean).powi(2)).sum()
}

fn mean_of(y: &[f64], indices: &[usize]) -> f64 {
    if indices.is_empty() {
        return 0.0;
    }
    indices.iter().map(|&i| y[i]).sum::<f64>() / indices.len() as f64
}

fn make_leaf(y: &[f64], indices: &[usize]) -> RegressionTreeNode {
    RegressionTreeNode::Leaf(RegressionLeaf {
        value: mean_of(y, indices),
        n_samples: indices.len(),
    })
}

fn at_max_depth(depth: usize, max_depth: Option<usize>) -> bool {
    max_depth.is_some_and(|max_d| depth >= max_d)
}

/// Sweeps the sorted values of one feature, scoring every midpoint threshold
/// with running sums so each candidate costs O(1).
fn best_split_for_feature(
    x: &Matrix<f64>,
    y: &[f64],
    indices: &[usize],
    feature_idx: usize,
    parent_sse: f64,
    min_samples_leaf: usize,
) -> Option<(f64, f64)> {
    let mut order: Vec<(f64, f64)> = indices
        .iter()
        .map(|&i| (x.get(i, feature_idx), y[i]))
        .collect();
    order.sort_by(|a, b| a.0.total_cmp(&b.0));

    let n = order.len();
    let total_sum: f64 = order.iter().map(|(_, t)| t).sum();
    let total_sq: f64 = order.iter().map(|(_, t)| t * t).sum();

    let mut left_sum = 0.0;
    let mut left_sq = 0.0;
    let mut best: Option<(f64, f64)> = None;

    for i in 0..n - 1 {
        let (value, target) = order[i];
        left_sum += target;
        left_sq += target * target;

        let n_left = i + 1;
        let n_right = n - n_left;
        if n_left < min_samples_leaf || n_right < min_samples_leaf {
            continue;
        }
        let next_value = order[i + 1].0;
        if next_value <= value {
            continue;
        }

        let right_sum = total_sum - left_sum;
        let right_sq = total_sq - left_sq;
        let left_sse = (left_sq - left_sum * left_sum / n_left as f64).max(0.0);
        let right_sse = (right_sq - right_sum * right_sum / n_right as f64).max(0.0);
        let gain = parent_sse - left_sse - right_sse;

        if gain > best.map_or(0.0, |(_, g)| g) {
            best = Some(((value + next_value) / 2.0, gain));
        }
    }

    best
}

fn find_best_regression_split(
    x: &Matrix<f64>,
    y: &[f64],
    indices: &[usize],
    parent_sse: f64,
    params: &SplitParams,
    rng: &mut StdRng,
) -> Option<BestSplit> {
    let n_features = x.n_cols();
    let candidates: Vec<usize> = if params.max_features >= n_features {
        (0..n_features).collect()
    } else {
        rand::seq::index::sample(rng, n_features, params.max_features).into_vec()
    };

    let mut best: Option<BestSplit> = None;
    for feature_idx in candidates {
        if let Some((threshold, gain)) = best_split_for_feature(
            x,
            y,
            indices,
            feature_idx,
            parent_sse,
            params.min_samples_leaf,
        ) {
            if best.as_ref().map_or(true, |b| gain > b.gain) {
                best = Some(BestSplit {
                    feature_idx,
                    threshold,
                    gain,
                });
            }
        }
    }

    // Gains within rounding noise of zero are not real splits.
    best.filter(|b| b.gain > parent_sse * 1e-12)
}

fn build_regression_tree(
    x: &Matrix<f64>,
    y: &[f64],
    indices: Vec<usize>,
    depth: usize,
    params: &SplitParams,
    rng: &mut StdRng,
) -> RegressionTreeNode {
    let n_samples = indices.len();
    let parent_sse = sum_squared_error(y, &indices);

    if n_samples < params.min_samples_split
        || at_max_depth(depth, params.max_depth)
        || parent_sse <= 1e-10
    {
        return make_leaf(y, &indices);
    }

    let Some(split) = find_best_regression_split(x, y, &indices, parent_sse, params, rng) else {
        return make_leaf(y, &indices);
    };

    let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = indices
        .into_iter()
        .partition(|&i| x.get(i, split.feature_idx) <= split.threshold);

    let left = build_regression_tree(x, y, left_indices, depth + 1, params, rng);
    let right = build_regression_tree(x, y, right_indices, depth + 1, params, rng);

    RegressionTreeNode::Node(RegressionNode {
        feature_idx: split.feature_idx,
        threshold: split.threshold,
        impurity_decrease: split.gain,
        n_samples,
        left: Box::new(left),
        right: Box::new(right),
    })
}
