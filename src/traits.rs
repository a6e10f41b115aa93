//! Core trait for supervised regressors.
//!
//! The energy model treats its regressor as a swappable component behind
//! this trait; evaluation helpers are generic over it.

use crate::error::Result;
use crate::metrics::r_squared;
use crate::primitives::{Matrix, Vector};

/// Primary trait for supervised learning estimators.
///
/// Estimators implement fit/predict/score following sklearn conventions.
///
/// # Examples
///
/// ```
/// use building_energy::prelude::*;
///
/// let x = Matrix::from_vec(4, 1, vec![1.0, 2.0, 3.0, 4.0]).expect("valid shape");
/// let y = Vector::from_slice(&[1.0, 1.0, 9.0, 9.0]);
///
/// let mut tree = DecisionTreeRegressor::new().with_max_depth(2);
/// tree.fit(&x, &y).expect("fit should succeed");
/// let predictions = tree.predict(&x).expect("fitted");
/// assert_eq!(predictions.len(), 4);
/// assert!(tree.score(&x, &y).expect("fitted") > 0.99);
/// ```
pub trait Estimator {
    /// Fits the model to training data.
    ///
    /// # Errors
    ///
    /// Returns an error if the data is empty or `x` and `y` disagree in length.
    fn fit(&mut self, x: &Matrix<f64>, y: &Vector<f64>) -> Result<()>;

    /// Predicts target values for input data.
    ///
    /// # Errors
    ///
    /// Returns an error if the estimator is not fitted or the feature count
    /// differs from training.
    fn predict(&self, x: &Matrix<f64>) -> Result<Vector<f64>>;

    /// Computes the R² score on the given data.
    ///
    /// # Errors
    ///
    /// Propagates prediction errors.
    fn score(&self, x: &Matrix<f64>, y: &Vector<f64>) -> Result<f64> {
        let predictions = self.predict(x)?;
        Ok(r_squared(&predictions, y))
    }
}
