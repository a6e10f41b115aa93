//! Regression metrics for model evaluation.
//!
//! Includes R², MSE, MAE and RMSE.

use crate::primitives::Vector;

/// Computes the coefficient of determination (R²).
///
/// R² = 1 - (`SS_res` / `SS_tot`)
///
/// Returns 0.0 when the true values have no variance.
///
/// # Examples
///
/// ```
/// use building_energy::metrics::r_squared;
/// use building_energy::primitives::Vector;
///
/// let y_true = Vector::from_slice(&[3.0, -0.5, 2.0, 7.0]);
/// let y_pred = Vector::from_slice(&[2.5, 0.0, 2.0, 8.0]);
/// let r2 = r_squared(&y_pred, &y_true);
/// assert!(r2 > 0.9);
/// ```
///
/// # Panics
///
/// Panics if vectors have different lengths.
#[must_use]
pub fn r_squared(y_pred: &Vector<f64>, y_true: &Vector<f64>) -> f64 {
    assert_eq!(y_pred.len(), y_true.len(), "Vectors must have same length");

    let y_mean = y_true.mean();

    let ss_res: f64 = y_true
        .as_slice()
        .iter()
        .zip(y_pred.as_slice())
        .map(|(t, p)| (t - p).powi(2))
        .sum();

    let ss_tot: f64 = y_true.as_slice().iter().map(|t| (t - y_mean).powi(2)).sum();

    if ss_tot == 0.0 {
        return 0.0;
    }

    1.0 - (ss_res / ss_tot)
}

/// Computes the Mean Squared Error (MSE).
///
/// # Panics
///
/// Panics if vectors have different lengths or are empty.
#[must_use]
pub fn mse(y_pred: &Vector<f64>, y_true: &Vector<f64>) -> f64 {
    assert_eq!(y_pred.len(), y_true.len(), "Vectors must have same length");
    assert!(!y_true.is_empty(), "Vectors cannot be empty");

    let sum_sq_error: f64 = y_true
        .as_slice()
        .iter()
        .zip(y_pred.as_slice())
        .map(|(t, p)| (t - p).powi(2))
        .sum();

    sum_sq_error / y_true.len() as f64
}

/// Computes the Mean Absolute Error (MAE).
///
/// ```
/// use building_energy::metrics::mae;
/// use building_energy::primitives::Vector;
///
/// let y_true = Vector::from_slice(&[3.0, -0.5, 2.0, 7.0]);
/// let y_pred = Vector::from_slice(&[2.5, 0.0, 2.0, 8.0]);
/// assert!((mae(&y_pred, &y_true) - 0.5).abs() < 1e-12);
/// ```
///
/// # Panics
///
/// Panics if vectors have different lengths or are empty.
#[must_use]
pub fn mae(y_pred: &Vector<f64>, y_true: &Vector<f64>) -> f64 {
    assert_eq!(y_pred.len(), y_true.len(), "Vectors must have same length");
    assert!(!y_true.is_empty(), "Vectors cannot be empty");

    let sum_abs_error: f64 = y_true
        .as_slice()
        .iter()
        .zip(y_pred.as_slice())
        .map(|(t, p)| (t - p).abs())
        .sum();

    sum_abs_error / y_true.len() as f64
}

/// Computes the Root Mean Squared Error (RMSE).
///
/// # Panics
///
/// Panics if vectors have different lengths or are empty.
#[must_use]
pub fn rmse(y_pred: &Vector<f64>, y_true: &Vector<f64>) -> f64 {
    mse(y_pred, y_true).sqrt()
}

/// Largest absolute residual.
///
/// # Panics
///
/// Panics if vectors have different lengths.
#[must_use]
pub fn max_error(y_pred: &Vector<f64>, y_true: &Vector<f64>) -> f64 {
    assert_eq!(y_pred.len(), y_true.len(), "Vectors must have same length");
    y_true
        .as_slice()
        .iter()
        .zip(y_pred.as_slice())
        .map(|(t, p)| (t - p).abs())
        .fold(0.0, f64::max)
}
