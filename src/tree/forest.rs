//! Random forest regression.

use super::{normalize_importances, DecisionTreeRegressor};
use crate::error::{EnergyError, Result};
use crate::primitives::{Matrix, Vector};
use crate::traits::Estimator;
use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// How many candidate features each split may look at.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum MaxFeatures {
    /// Every feature (plain bagging)
    #[default]
    All,
    /// `ceil(sqrt(n_features))`
    Sqrt,
    /// `ceil(log2(n_features))`
    Log2,
    /// `ceil(fraction * n_features)`, fraction in (0, 1]
    Fraction(f64),
    /// A fixed count, clamped to `1..=n_features`
    Count(usize),
}

impl MaxFeatures {
    /// Resolves to a concrete feature count for `n_features` inputs.
    #[must_use]
    pub fn resolve(self, n_features: usize) -> usize {
        let n = n_features as f64;
        let count = match self {
            MaxFeatures::All => n_features,
            MaxFeatures::Sqrt => n.sqrt().ceil() as usize,
            MaxFeatures::Log2 => n.log2().ceil() as usize,
            MaxFeatures::Fraction(f) => (f * n).ceil() as usize,
            MaxFeatures::Count(c) => c,
        };
        count.clamp(1, n_features.max(1))
    }

    /// Checks that the setting is usable.
    ///
    /// # Errors
    ///
    /// Returns `InvalidHyperparameter` for a fraction outside (0, 1] or a
    /// zero count.
    pub fn validate(self) -> Result<()> {
        match self {
            MaxFeatures::Fraction(f) if !(f > 0.0 && f <= 1.0) => Err(
                EnergyError::invalid_hyperparameter("max_features", f, "fraction in (0, 1]"),
            ),
            MaxFeatures::Count(0) => Err(EnergyError::invalid_hyperparameter(
                "max_features",
                0,
                "count >= 1",
            )),
            _ => Ok(()),
        }
    }
}

/// Random Forest Regressor.
///
/// Ensemble of decision tree regressors, each trained on a bootstrap sample
/// and restricted to a random subset of features at every split.
/// Predictions are averaged across all trees.
///
/// # Examples
///
/// ```
/// use building_energy::prelude::*;
///
/// let x = Matrix::from_vec(5, 1, vec![1.0, 2.0, 3.0, 4.0, 5.0]).expect("valid shape");
/// let y = Vector::from_slice(&[2.0, 4.0, 6.0, 8.0, 10.0]);
///
/// let mut rf = RandomForestRegressor::new(10).with_max_depth(5).with_random_state(7);
/// rf.fit(&x, &y).expect("fit should succeed");
/// let predictions = rf.predict(&x).expect("fitted");
/// assert_eq!(predictions.len(), 5);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForestRegressor {
    trees: Vec<DecisionTreeRegressor>,
    n_estimators: usize,
    max_depth: Option<usize>,
    min_samples_split: usize,
    min_samples_leaf: usize,
    max_features: MaxFeatures,
    random_state: Option<u64>,
    n_features: usize,
    /// Out-of-bag R², when at least one sample was left out of some bootstrap
    oob_score: Option<f64>,
}

impl RandomForestRegressor {
    /// Creates a new Random Forest regressor with `n_estimators` trees.
    #[must_use]
    pub fn new(n_estimators: usize) -> Self {
        Self {
            trees: Vec::new(),
            n_estimators,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: MaxFeatures::All,
            random_state: None,
            n_features: 0,
            oob_score: None,
        }
    }

    /// Sets the maximum depth for each tree.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    /// Sets the minimum number of samples required to split a node.
    #[must_use]
    pub fn with_min_samples_split(mut self, min_samples: usize) -> Self {
        self.min_samples_split = min_samples.max(2);
        self
    }

    /// Sets the minimum number of samples per leaf.
    #[must_use]
    pub fn with_min_samples_leaf(mut self, min_samples: usize) -> Self {
        self.min_samples_leaf = min_samples.max(1);
        self
    }

    /// Sets the per-split feature subset size.
    #[must_use]
    pub fn with_max_features(mut self, max_features: MaxFeatures) -> Self {
        self.max_features = max_features;
        self
    }

    /// Sets the random state for reproducibility.
    #[must_use]
    pub fn with_random_state(mut self, random_state: u64) -> Self {
        self.random_state = Some(random_state);
        self
    }

    /// Number of trees requested.
    #[must_use]
    pub fn n_estimators(&self) -> usize {
        self.n_estimators
    }

    /// Fitted trees.
    #[must_use]
    pub fn trees(&self) -> &[DecisionTreeRegressor] {
        &self.trees
    }

    /// Returns true once `fit` has succeeded.
    #[must_use]
    pub fn is_fitted(&self) -> bool {
        !self.trees.is_empty()
    }

    /// Out-of-bag R² computed during fit.
    ///
    /// `None` before fit, or when every sample landed in every bootstrap.
    #[must_use]
    pub fn oob_score(&self) -> Option<f64> {
        self.oob_score
    }

    /// Checks every tree against the forest's feature count.
    ///
    /// # Errors
    ///
    /// Returns `Serialization` if a tree disagrees on the feature count or
    /// splits on a feature index outside it.
    pub fn check_structure(&self) -> Result<()> {
        for (i, tree) in self.trees.iter().enumerate() {
            if tree.n_features() != self.n_features {
                return Err(EnergyError::Serialization(format!(
                    "tree {i} has {} features, forest has {}",
                    tree.n_features(),
                    self.n_features
                )));
            }
            tree.check_structure()?;
        }
        Ok(())
    }

    /// Predicts a single sample by averaging the trees.
    ///
    /// # Errors
    ///
    /// Returns `NotFitted` before `fit`, or `DimensionMismatch` for a row of
    /// the wrong length.
    pub fn predict_row(&self, row: &[f64]) -> Result<f64> {
        if self.trees.is_empty() {
            return Err(EnergyError::NotFitted);
        }
        let mut total = 0.0;
        for tree in &self.trees {
            total += tree.predict_row(row)?;
        }
        Ok(total / self.trees.len() as f64)
    }

    /// Returns feature importances based on mean decrease in impurity.
    ///
    /// Each split credits its feature with the reduction in summed squared
    /// error it achieved; credits are averaged over trees and normalized to
    /// sum to 1.0.
    ///
    /// `None` if the model has not been fitted.
    #[must_use]
    pub fn feature_importances(&self) -> Option<Vec<f64>> {
        if self.trees.is_empty() {
            return None;
        }

        let mut total = vec![0.0; self.n_features];
        for tree in &self.trees {
            // Each tree is normalized first so deep trees on high-variance
            // bootstraps do not dominate.
            if let Some(importances) = tree.raw_feature_importances() {
                let tree_sum: f64 = importances.iter().sum();
                if tree_sum > 0.0 {
                    for (acc, imp) in total.iter_mut().zip(importances) {
                        *acc += imp / tree_sum;
                    }
                }
            }
        }

        Some(normalize_importances(total))
    }

    fn validate(&self) -> Result<()> {
        if self.n_estimators == 0 {
            return Err(EnergyError::invalid_hyperparameter(
                "n_estimators",
                0,
                ">= 1",
            ));
        }
        if self.max_depth == Some(0) {
            return Err(EnergyError::invalid_hyperparameter("max_depth", 0, ">= 1"));
        }
        self.max_features.validate()
    }

    fn template_tree(&self, n_features: usize) -> DecisionTreeRegressor {
        let mut tree = DecisionTreeRegressor::new()
            .with_min_samples_split(self.min_samples_split)
            .with_min_samples_leaf(self.min_samples_leaf)
            .with_max_features(self.max_features.resolve(n_features));
        if let Some(depth) = self.max_depth {
            tree = tree.with_max_depth(depth);
        }
        tree
    }

    fn compute_oob_score(&self, x: &Matrix<f64>, y: &[f64], in_bag: &[Vec<bool>]) -> Option<f64> {
        let n_samples = y.len();
        let mut sums = vec![0.0; n_samples];
        let mut counts = vec![0usize; n_samples];

        for (tree, bag) in self.trees.iter().zip(in_bag) {
            for sample in (0..n_samples).filter(|&s| !bag[s]) {
                if let Ok(pred) = tree.predict_row(x.row(sample)) {
                    sums[sample] += pred;
                    counts[sample] += 1;
                }
            }
        }

        let covered: Vec<usize> = (0..n_samples).filter(|&s| counts[s] > 0).collect();
        if covered.is_empty() {
            return None;
        }
        let preds = Vector::from_vec(
            covered
                .iter()
                .map(|&s| sums[s] / counts[s] as f64)
                .collect(),
        );
        let truth = Vector::from_vec(covered.iter().map(|&s| y[s]).collect());
        Some(crate::metrics::r_squared(&preds, &truth))
    }
}

impl Default for RandomForestRegressor {
    fn default() -> Self {
        Self::new(100)
    }
}

impl Estimator for RandomForestRegressor {
    fn fit(&mut self, x: &Matrix<f64>, y: &Vector<f64>) -> Result<()> {
        let (n_samples, n_features) = x.shape();

        if n_samples != y.len() {
            return Err(EnergyError::dimension_mismatch("n_samples", n_samples, y.len()));
        }
        if n_samples == 0 {
            return Err(EnergyError::empty("cannot fit a forest with zero samples"));
        }
        if n_features == 0 {
            return Err(EnergyError::empty("cannot fit a forest with zero features"));
        }
        self.validate()?;

        let mut rng = match self.random_state {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let dist = Uniform::from(0..n_samples);

        self.trees = Vec::with_capacity(self.n_estimators);
        self.n_features = n_features;
        let mut in_bag = Vec::with_capacity(self.n_estimators);

        for i in 0..self.n_estimators {
            let mut tree_rng = StdRng::seed_from_u64(rng.gen());
            let bootstrap: Vec<usize> = (0..n_samples).map(|_| dist.sample(&mut tree_rng)).collect();

            let mut bag = vec![false; n_samples];
            for &idx in &bootstrap {
                bag[idx] = true;
            }
            in_bag.push(bag);

            let mut tree = self.template_tree(n_features);
            tree.fit_indices(x, y.as_slice(), bootstrap, &mut tree_rng);
            if let Some(root) = tree.root() {
                tracing::trace!(tree = i, depth = root.depth(), leaves = root.n_leaves(), "tree grown");
            }
            self.trees.push(tree);
        }

        self.oob_score = self.compute_oob_score(x, y.as_slice(), &in_bag);
        tracing::debug!(
            n_trees = self.trees.len(),
            n_samples,
            n_features,
            oob_score = ?self.oob_score,
            "random forest fitted"
        );
        Ok(())
    }

    fn predict(&self, x: &Matrix<f64>) -> Result<Vector<f64>> {
        let predictions = (0..x.n_rows())
            .map(|row| self.predict_row(x.row(row)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Vector::from_vec(predictions))
    }
}

#[cfg(test)]
#[path = "forest_tests.rs"]
mod tests;
