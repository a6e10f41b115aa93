//! Convenience re-exports for common usage.
//!
//! # Usage
//!
//! ```
//! use building_energy::prelude::*;
//! ```

pub use crate::analysis::{assess, Assessment, DatasetSummary, EfficiencyRating, Recommendation};
pub use crate::config::{ForestConfig, PipelineConfig};
pub use crate::data::{BuildingProfile, BuildingRecord, Dataset};
pub use crate::error::EnergyError;
pub use crate::features::{derive_features, DerivedTable, FeatureEncoding, FEATURE_NAMES};
pub use crate::metrics::{mae, mse, r_squared, rmse};
pub use crate::model::{evaluate, EnergyModel, Evaluation, FeatureImportance};
pub use crate::primitives::{Matrix, Vector};
pub use crate::report::TrainingReport;
pub use crate::traits::Estimator;
pub use crate::tree::{DecisionTreeRegressor, MaxFeatures, RandomForestRegressor};
