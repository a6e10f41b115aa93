//! Vector type for 1D numeric data.

use serde::{Deserialize, Serialize};
use std::ops::Index;

/// A 1D vector of numeric values.
///
/// # Examples
///
/// ```
/// use building_energy::primitives::Vector;
///
/// let v = Vector::from_slice(&[1.0, 2.0, 3.0]);
/// assert_eq!(v.len(), 3);
/// assert!((v.mean() - 2.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vector<T> {
    data: Vec<T>,
}

impl<T: Copy> Vector<T> {
    /// Creates a vector that owns `data`.
    #[must_use]
    pub fn from_vec(data: Vec<T>) -> Self {
        Self { data }
    }

    /// Creates a vector by copying a slice.
    #[must_use]
    pub fn from_slice(data: &[T]) -> Self {
        Self {
            data: data.to_vec(),
        }
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the vector has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the underlying data as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Gathers the given positions into a new vector.
    #[must_use]
    pub fn select(&self, indices: &[usize]) -> Self {
        Self {
            data: indices.iter().map(|&i| self.data[i]).collect(),
        }
    }

    /// Consumes the vector, returning the inner `Vec`.
    #[must_use]
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }
}

impl Vector<f64> {
    /// Sum of all elements.
    #[must_use]
    pub fn sum(&self) -> f64 {
        self.data.iter().sum()
    }

    /// Arithmetic mean (0.0 for an empty vector).
    #[must_use]
    pub fn mean(&self) -> f64 {
        if self.data.is_empty() {
            return 0.0;
        }
        self.sum() / self.data.len() as f64
    }

    /// Population variance (0.0 for fewer than two elements).
    #[must_use]
    pub fn variance(&self) -> f64 {
        if self.data.len() < 2 {
            return 0.0;
        }
        let mean = self.mean();
        self.data.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / self.data.len() as f64
    }
}

impl<T> Index<usize> for Vector<T> {
    type Output = T;

    fn index(&self, idx: usize) -> &T {
        &self.data[idx]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_and_variance() {
        let v = Vector::from_slice(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert!((v.mean() - 5.0).abs() < 1e-12);
        assert!((v.variance() - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_stats() {
        let v: Vector<f64> = Vector::from_vec(Vec::new());
        assert!(v.is_empty());
        assert_eq!(v.mean(), 0.0);
        assert_eq!(v.variance(), 0.0);
    }

    #[test]
    fn test_select_and_index() {
        let v = Vector::from_slice(&[1.0, 2.0, 3.0]);
        let s = v.select(&[2, 0]);
        assert_eq!(s[0], 3.0);
        assert_eq!(s[1], 1.0);
    }
}
