//! Core compute primitives (Vector, Matrix).
//!
//! Feature matrices and target vectors handed to the estimators.

mod matrix;
mod vector;

pub use matrix::Matrix;
pub use vector::Vector;
