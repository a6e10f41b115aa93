//! Pipeline and forest hyperparameters.
//!
//! Both structs deserialize from JSON with every field optional, so a config
//! file only needs the values it changes:
//!
//! ```json
//! { "reference_year": 2025, "forest": { "n_estimators": 200 } }
//! ```

use crate::error::{EnergyError, Result};
use crate::tree::{MaxFeatures, RandomForestRegressor};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Random forest hyperparameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestConfig {
    /// Number of trees
    pub n_estimators: usize,
    /// Depth limit per tree; `None` grows until leaves are pure
    pub max_depth: Option<usize>,
    /// Minimum samples needed to split a node
    pub min_samples_split: usize,
    /// Minimum samples in each leaf
    pub min_samples_leaf: usize,
    /// Candidate features per split
    pub max_features: MaxFeatures,
    /// Seed for bootstrap sampling and feature subsets
    pub random_state: Option<u64>,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_depth: Some(10),
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: MaxFeatures::All,
            random_state: Some(42),
        }
    }
}

impl ForestConfig {
    /// Sets the number of trees.
    #[must_use]
    pub fn with_n_estimators(mut self, n_estimators: usize) -> Self {
        self.n_estimators = n_estimators;
        self
    }

    /// Sets the depth limit.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Sets the minimum samples per leaf.
    #[must_use]
    pub fn with_min_samples_leaf(mut self, min_samples_leaf: usize) -> Self {
        self.min_samples_leaf = min_samples_leaf;
        self
    }

    /// Sets the per-split feature subset size.
    #[must_use]
    pub fn with_max_features(mut self, max_features: MaxFeatures) -> Self {
        self.max_features = max_features;
        self
    }

    /// Sets the seed; `None` draws from entropy.
    #[must_use]
    pub fn with_random_state(mut self, random_state: Option<u64>) -> Self {
        self.random_state = random_state;
        self
    }

    /// Checks every hyperparameter.
    ///
    /// # Errors
    ///
    /// Returns `InvalidHyperparameter` naming the first bad value.
    pub fn validate(&self) -> Result<()> {
        if self.n_estimators == 0 {
            return Err(EnergyError::invalid_hyperparameter("n_estimators", 0, ">= 1"));
        }
        if self.max_depth == Some(0) {
            return Err(EnergyError::invalid_hyperparameter("max_depth", 0, ">= 1"));
        }
        if self.min_samples_split < 2 {
            return Err(EnergyError::invalid_hyperparameter(
                "min_samples_split",
                self.min_samples_split,
                ">= 2",
            ));
        }
        if self.min_samples_leaf == 0 {
            return Err(EnergyError::invalid_hyperparameter("min_samples_leaf", 0, ">= 1"));
        }
        self.max_features.validate()
    }

    /// Unfitted forest carrying these hyperparameters.
    ///
    /// # Errors
    ///
    /// See [`ForestConfig::validate`].
    pub fn build(&self) -> Result<RandomForestRegressor> {
        self.validate()?;
        let mut forest = RandomForestRegressor::new(self.n_estimators)
            .with_min_samples_split(self.min_samples_split)
            .with_min_samples_leaf(self.min_samples_leaf)
            .with_max_features(self.max_features);
        if let Some(depth) = self.max_depth {
            forest = forest.with_max_depth(depth);
        }
        if let Some(seed) = self.random_state {
            forest = forest.with_random_state(seed);
        }
        Ok(forest)
    }
}

/// End-to-end settings for derive → evaluate → fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Year `building_age` is measured from
    pub reference_year: i32,
    /// Share of labeled rows held out for evaluation, in (0, 1)
    pub test_size: f64,
    /// Forest hyperparameters
    pub forest: ForestConfig,
    /// Number of features listed in the report
    pub top_features: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            reference_year: 2024,
            test_size: 0.2,
            forest: ForestConfig::default(),
            top_features: 3,
        }
    }
}

impl PipelineConfig {
    /// Sets the reference year.
    #[must_use]
    pub fn with_reference_year(mut self, year: i32) -> Self {
        self.reference_year = year;
        self
    }

    /// Sets the hold-out fraction.
    #[must_use]
    pub fn with_test_size(mut self, test_size: f64) -> Self {
        self.test_size = test_size;
        self
    }

    /// Replaces the forest settings.
    #[must_use]
    pub fn with_forest(mut self, forest: ForestConfig) -> Self {
        self.forest = forest;
        self
    }

    /// Sets how many features the report lists.
    #[must_use]
    pub fn with_top_features(mut self, n: usize) -> Self {
        self.top_features = n;
        self
    }

    /// Reads a JSON config; absent keys keep their defaults.
    ///
    /// # Errors
    ///
    /// `MissingFile` if `path` does not exist, `Serialization` for invalid
    /// JSON, `InvalidHyperparameter` for out-of-range values.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(EnergyError::MissingFile {
                path: path.to_path_buf(),
            });
        }
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;
        tracing::debug!(path = %path.display(), ?config, "configuration loaded");
        Ok(config)
    }

    /// Checks every setting.
    ///
    /// # Errors
    ///
    /// Returns `InvalidHyperparameter` naming the first bad value.
    pub fn validate(&self) -> Result<()> {
        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            return Err(EnergyError::invalid_hyperparameter(
                "test_size",
                self.test_size,
                "a value in (0, 1)",
            ));
        }
        self.forest.validate()
    }
}
