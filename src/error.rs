//! Error types for building energy operations.
//!
//! Every failure carries enough context (file, line, field, value) for a
//! person to find and fix the offending input.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for dataset, feature and model operations.
///
/// # Examples
///
/// ```
/// use building_energy::error::EnergyError;
///
/// let err = EnergyError::UnseenCategory {
///     column: "building_type".to_string(),
///     value: "Industrial".to_string(),
/// };
/// assert!(err.to_string().contains("Industrial"));
/// ```
#[derive(Debug, Error)]
pub enum EnergyError {
    /// Input table does not exist.
    #[error("input file not found: {}", .path.display())]
    MissingFile {
        /// Path that was requested
        path: PathBuf,
    },

    /// A field was non-numeric, out of range, or otherwise unusable.
    #[error("malformed record at line {line}: field '{field}' = '{value}' ({reason})")]
    MalformedRecord {
        /// 1-based line in the source table (0 when not read from a file)
        line: usize,
        /// Column name
        field: String,
        /// Raw value as found
        value: String,
        /// What is wrong with it
        reason: String,
    },

    /// A category value at prediction time was absent when the encoder was fit.
    #[error("unseen category in '{column}': '{value}' was not present at fit time")]
    UnseenCategory {
        /// Categorical column
        column: String,
        /// Offending value
        value: String,
    },

    /// Fit was called without any usable training records.
    #[error("empty dataset: {context}")]
    EmptyDataset {
        /// Where the empty input was found
        context: String,
    },

    /// Matrix/vector dimensions don't match for the operation.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimensions description
        expected: String,
        /// Actual dimensions found
        actual: String,
    },

    /// Invalid hyperparameter value provided.
    #[error("invalid hyperparameter: {param} = {value}, expected {constraint}")]
    InvalidHyperparameter {
        /// Parameter name
        param: String,
        /// Provided value
        value: String,
        /// Constraint description
        constraint: String,
    },

    /// Prediction was requested from an estimator that was never fit.
    #[error("model not fitted: call fit() first")]
    NotFitted,

    /// I/O error (permission denied, disk full, ...).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV reader or writer failure not attributable to a single field.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl EnergyError {
    /// Create a malformed record error.
    #[must_use]
    pub fn malformed(
        line: usize,
        field: &str,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        Self::MalformedRecord {
            line,
            field: field.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    /// Create an empty dataset error with descriptive context.
    #[must_use]
    pub fn empty(context: &str) -> Self {
        Self::EmptyDataset {
            context: context.to_string(),
        }
    }

    /// Create a dimension mismatch error with descriptive context.
    #[must_use]
    pub fn dimension_mismatch(context: &str, expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch {
            expected: format!("{context}={expected}"),
            actual: format!("{actual}"),
        }
    }

    /// Create an invalid hyperparameter error.
    #[must_use]
    pub fn invalid_hyperparameter(param: &str, value: impl ToString, constraint: &str) -> Self {
        Self::InvalidHyperparameter {
            param: param.to_string(),
            value: value.to_string(),
            constraint: constraint.to_string(),
        }
    }
}

impl From<serde_json::Error> for EnergyError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results.
pub type Result<T> = std::result::Result<T, EnergyError>;
