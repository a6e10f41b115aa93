//! Building energy: consumption forecasting for buildings with random
//! forest regression.
//!
//! The crate turns a table of building-month observations into model inputs,
//! fits a random forest on them, and reports predictions, feature
//! importances and efficiency advice.
//!
//! # Quick Start
//!
//! ```
//! use building_energy::prelude::*;
//!
//! let records = vec![
//!     BuildingRecord {
//!         id: 1,
//!         building_type: "Commercial".to_string(),
//!         square_footage: 1000.0,
//!         year_built: 2000,
//!         heating_type: "Electric".to_string(),
//!         occupant_count: 10,
//!         month: 6,
//!         avg_temperature: 22.0,
//!         avg_humidity: 50.0,
//!         energy_consumption: Some(5000.0),
//!     },
//!     BuildingRecord {
//!         id: 2,
//!         building_type: "Residential".to_string(),
//!         square_footage: 2000.0,
//!         year_built: 1990,
//!         heating_type: "Gas".to_string(),
//!         occupant_count: 4,
//!         month: 1,
//!         avg_temperature: 5.0,
//!         avg_humidity: 60.0,
//!         energy_consumption: Some(8000.0),
//!     },
//! ];
//! let dataset = Dataset::from_records(records).expect("valid records");
//!
//! // Derive building_age and category codes
//! let table = derive_features(&dataset, 2024).expect("derivable");
//! assert_eq!(table.records()[1].building_age, 34);
//!
//! // Fit and predict with the same encoding
//! let model = EnergyModel::fit(&table, &ForestConfig::default().with_n_estimators(10))
//!     .expect("labeled rows");
//! let estimate = model.predict(&dataset.records()[0].profile()).expect("known categories");
//! assert!(estimate > 0.0);
//!
//! let total: f64 = model.feature_importances().iter().map(|f| f.importance).sum();
//! assert!((total - 1.0).abs() < 1e-6);
//! ```
//!
//! # Modules
//!
//! - [`data`]: Building records and the CSV-backed [`data::Dataset`]
//! - [`features`]: Derived columns and category encoding
//! - [`tree`]: Decision tree and random forest regressors
//! - [`model`]: The fitted consumption model and its evaluation
//! - [`analysis`]: Efficiency ratings, recommendations, dataset summaries
//! - [`report`]: Plain-text training report
//! - [`config`]: Pipeline and forest hyperparameters
//! - [`metrics`]: Regression metrics
//! - [`model_selection`]: Train/test splitting
//! - [`primitives`]: Core Vector and Matrix types

pub mod analysis;
pub mod config;
pub mod data;
pub mod error;
pub mod features;
pub mod metrics;
pub mod model;
pub mod model_selection;
pub mod prelude;
pub mod primitives;
pub mod report;
pub mod traits;
pub mod tree;

pub use error::{EnergyError, Result};
pub use primitives::{Matrix, Vector};
pub use traits::Estimator;
