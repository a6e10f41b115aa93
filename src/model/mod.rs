//! Trained consumption model: a feature encoding bound to a fitted forest.
//!
//! An [`EnergyModel`] can only be built from a [`DerivedTable`], so the
//! encoding used at prediction time is always the one the forest was fit
//! with. Saving and loading keeps the pair together.

use crate::config::{ForestConfig, PipelineConfig};
use crate::data::BuildingProfile;
use crate::error::{EnergyError, Result};
use crate::features::{DerivedTable, FeatureEncoding, FeatureVector, FEATURE_NAMES, N_FEATURES};
use crate::metrics;
use crate::model_selection::train_test_indices;
use crate::primitives::{Matrix, Vector};
use crate::traits::Estimator;
use crate::tree::RandomForestRegressor;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Importance of one model input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    /// Feature name, one of [`FEATURE_NAMES`]
    pub name: String,
    /// Share of total impurity decrease, in [0, 1]
    pub importance: f64,
}

/// Random forest over the derived building features.
///
/// # Examples
///
/// ```
/// use building_energy::config::ForestConfig;
/// use building_energy::data::{BuildingRecord, Dataset};
/// use building_energy::features::derive_features;
/// use building_energy::model::EnergyModel;
///
/// let records = (0..6)
///     .map(|i| BuildingRecord {
///         id: i + 1,
///         building_type: if i % 2 == 0 { "Commercial" } else { "Residential" }.to_string(),
///         square_footage: 1000.0 + 250.0 * i as f64,
///         year_built: 1980 + i as i32,
///         heating_type: "Gas".to_string(),
///         occupant_count: 5,
///         month: 3,
///         avg_temperature: 10.0,
///         avg_humidity: 55.0,
///         energy_consumption: Some(3000.0 + 500.0 * i as f64),
///     })
///     .collect();
/// let dataset = Dataset::from_records(records).expect("valid records");
/// let table = derive_features(&dataset, 2024).expect("derivable");
///
/// let model = EnergyModel::fit(&table, &ForestConfig::default().with_n_estimators(10))
///     .expect("labeled rows");
/// let estimate = model
///     .predict(&dataset.records()[0].profile())
///     .expect("known categories");
/// assert!(estimate > 0.0);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnergyModel {
    feature_names: Vec<String>,
    encoding: FeatureEncoding,
    forest: RandomForestRegressor,
    n_training_samples: usize,
}

impl EnergyModel {
    /// Fits a forest on the labeled rows of `table`.
    ///
    /// # Errors
    ///
    /// - `EmptyDataset` if no row has `energy_consumption`
    /// - `InvalidHyperparameter` for a bad `config`
    pub fn fit(table: &DerivedTable, config: &ForestConfig) -> Result<Self> {
        let (x, y) = table.training_data()?;
        let mut forest = config.build()?;
        forest.fit(&x, &y)?;

        tracing::info!(
            n_samples = y.len(),
            n_trees = forest.n_estimators(),
            oob_score = ?forest.oob_score(),
            "energy model fitted"
        );

        Ok(Self {
            feature_names: FEATURE_NAMES.iter().map(ToString::to_string).collect(),
            encoding: table.encoding().clone(),
            forest,
            n_training_samples: y.len(),
        })
    }

    /// Estimated `energy_consumption` (kWh) for one building.
    ///
    /// # Errors
    ///
    /// `UnseenCategory` for a category absent at fit time, `MalformedRecord`
    /// for out-of-range fields.
    pub fn predict(&self, profile: &BuildingProfile) -> Result<f64> {
        let features = self.encoding.encode(profile)?;
        self.predict_features(&features)
    }

    /// Estimate for an already-encoded feature vector.
    ///
    /// # Errors
    ///
    /// Returns an error only if the forest is not fitted.
    pub fn predict_features(&self, features: &FeatureVector) -> Result<f64> {
        self.forest.predict_row(features)
    }

    /// Importances in feature order; they sum to 1.
    #[must_use]
    pub fn feature_importances(&self) -> Vec<FeatureImportance> {
        let scores = self
            .forest
            .feature_importances()
            .unwrap_or_else(|| vec![1.0 / FEATURE_NAMES.len() as f64; FEATURE_NAMES.len()]);
        self.feature_names
            .iter()
            .zip(scores)
            .map(|(name, importance)| FeatureImportance {
                name: name.clone(),
                importance,
            })
            .collect()
    }

    /// Importances sorted from most to least important.
    #[must_use]
    pub fn ranked_importances(&self) -> Vec<FeatureImportance> {
        let mut ranked = self.feature_importances();
        ranked.sort_by(|a, b| b.importance.total_cmp(&a.importance));
        ranked
    }

    /// Importance of the named feature, if it exists.
    #[must_use]
    pub fn importance_of(&self, name: &str) -> Option<f64> {
        self.feature_importances()
            .into_iter()
            .find(|f| f.name == name)
            .map(|f| f.importance)
    }

    /// Encoding the model was fit with.
    #[must_use]
    pub fn encoding(&self) -> &FeatureEncoding {
        &self.encoding
    }

    /// Underlying forest.
    #[must_use]
    pub fn forest(&self) -> &RandomForestRegressor {
        &self.forest
    }

    /// Labeled rows used for fitting.
    #[must_use]
    pub fn n_training_samples(&self) -> usize {
        self.n_training_samples
    }

    /// Writes the model as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string(self)?;
        std::fs::write(path, json)?;
        tracing::info!(path = %path.display(), "model saved");
        Ok(())
    }

    /// Reads a model written by [`EnergyModel::save_json`].
    ///
    /// # Errors
    ///
    /// `MissingFile` if absent, `Serialization` if the file is not a model
    /// or was written for a different feature layout.
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(EnergyError::MissingFile {
                path: path.to_path_buf(),
            });
        }
        let model: Self = serde_json::from_str(&std::fs::read_to_string(path)?)?;

        if model.feature_names != FEATURE_NAMES {
            return Err(EnergyError::Serialization(format!(
                "model features {:?} do not match {:?}",
                model.feature_names, FEATURE_NAMES
            )));
        }
        if !model.forest.is_fitted() {
            return Err(EnergyError::NotFitted);
        }
        model.forest.check_structure()?;
        if let Some(tree) = model.forest.trees().first() {
            if tree.n_features() != N_FEATURES {
                return Err(EnergyError::Serialization(format!(
                    "model trees take {} features, expected {N_FEATURES}",
                    tree.n_features()
                )));
            }
        }
        tracing::info!(path = %path.display(), "model loaded");
        Ok(model)
    }
}

/// Accuracy of a model on held-out (or, for tiny datasets, training) rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    /// Mean absolute error (kWh)
    pub mae: f64,
    /// Root mean squared error (kWh)
    pub rmse: f64,
    /// Coefficient of determination
    pub r2: f64,
    /// Rows used for fitting
    pub n_train: usize,
    /// Rows scored
    pub n_test: usize,
    /// True when the dataset was too small to split and the scores are
    /// measured on the training rows
    pub in_sample: bool,
}

impl Evaluation {
    fn score(y_pred: &Vector<f64>, y_true: &Vector<f64>, n_train: usize, in_sample: bool) -> Self {
        Self {
            mae: metrics::mae(y_pred, y_true),
            rmse: metrics::rmse(y_pred, y_true),
            r2: metrics::r_squared(y_pred, y_true),
            n_train,
            n_test: y_true.len(),
            in_sample,
        }
    }
}

/// Hold-out evaluation of any estimator.
///
/// Splits `x`/`y` with `test_size`, fits on the train rows and scores the
/// test rows. When the split would leave either side empty, fits and scores
/// on all rows instead and marks the result `in_sample`.
///
/// # Errors
///
/// Propagates estimator errors and `InvalidHyperparameter` for a bad
/// `test_size`.
pub fn evaluate_estimator<E: Estimator>(
    estimator: &mut E,
    x: &Matrix<f64>,
    y: &Vector<f64>,
    test_size: f64,
    random_state: Option<u64>,
) -> Result<Evaluation> {
    match train_test_indices(x.n_rows(), test_size, random_state) {
        Ok(split) => {
            let y_test = y.select(&split.test);
            estimator.fit(&x.select_rows(&split.train), &y.select(&split.train))?;
            let y_pred = estimator.predict(&x.select_rows(&split.test))?;
            Ok(Evaluation::score(&y_pred, &y_test, split.train.len(), false))
        }
        Err(EnergyError::EmptyDataset { context }) => {
            tracing::warn!(%context, "too few rows to hold out a test set; scoring in-sample");
            estimator.fit(x, y)?;
            let y_pred = estimator.predict(x)?;
            Ok(Evaluation::score(&y_pred, y, y.len(), true))
        }
        Err(other) => Err(other),
    }
}

/// Evaluates a forest configured by `config` on the labeled rows of `table`.
///
/// # Errors
///
/// `EmptyDataset` if nothing is labeled, `InvalidHyperparameter` for a bad
/// configuration.
pub fn evaluate(table: &DerivedTable, config: &PipelineConfig) -> Result<Evaluation> {
    config.validate()?;
    let (x, y) = table.training_data()?;
    let mut forest = config.forest.build()?;
    let evaluation = evaluate_estimator(
        &mut forest,
        &x,
        &y,
        config.test_size,
        config.forest.random_state,
    )?;
    tracing::info!(
        mae = evaluation.mae,
        rmse = evaluation.rmse,
        r2 = evaluation.r2,
        n_test = evaluation.n_test,
        in_sample = evaluation.in_sample,
        "model evaluated"
    );
    Ok(evaluation)
}

#[cfg(test)]
#[path = "model_tests.rs"]
mod tests;
