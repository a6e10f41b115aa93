//! Train/test splitting for hold-out evaluation.

use crate::error::{EnergyError, Result};
use crate::primitives::{Matrix, Vector};

/// Row indices of a train/test partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitIndices {
    /// Rows used for fitting
    pub train: Vec<usize>,
    /// Rows held out for scoring
    pub test: Vec<usize>,
}

/// Number of train and test rows for `n_samples` at `test_size`.
///
/// The test count is rounded to the nearest integer.
///
/// # Errors
///
/// Returns `InvalidHyperparameter` if `test_size` is outside (0, 1), and
/// `EmptyDataset` if either side of the split would be empty.
pub fn split_sizes(n_samples: usize, test_size: f64) -> Result<(usize, usize)> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(EnergyError::invalid_hyperparameter(
            "test_size",
            test_size,
            "a value in (0, 1)",
        ));
    }

    let n_test = (n_samples as f64 * test_size).round() as usize;
    let n_train = n_samples.saturating_sub(n_test);

    if n_test == 0 || n_train == 0 {
        return Err(EnergyError::empty(&format!(
            "split would result in empty train or test set (n_train={n_train}, n_test={n_test})"
        )));
    }

    Ok((n_train, n_test))
}

/// Shuffles indices with optional random seed.
fn shuffle_indices(n_samples: usize, random_state: Option<u64>) -> Vec<usize> {
    use rand::seq::SliceRandom;
    use rand::SeedableRng;

    let mut indices: Vec<usize> = (0..n_samples).collect();

    if let Some(seed) = random_state {
        let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
        indices.shuffle(&mut rng);
    } else {
        let mut rng = rand::thread_rng();
        indices.shuffle(&mut rng);
    }

    indices
}

/// Randomly partitions `0..n_samples` into train and test rows.
///
/// # Errors
///
/// See [`split_sizes`].
pub fn train_test_indices(
    n_samples: usize,
    test_size: f64,
    random_state: Option<u64>,
) -> Result<SplitIndices> {
    let (n_train, _) = split_sizes(n_samples, test_size)?;
    let mut indices = shuffle_indices(n_samples, random_state);
    let test = indices.split_off(n_train);
    Ok(SplitIndices {
        train: indices,
        test,
    })
}

/// Split arrays into random train and test subsets.
///
/// Returns `(x_train, x_test, y_train, y_test)`.
///
/// # Example
///
/// ```rust
/// use building_energy::model_selection::train_test_split;
/// use building_energy::primitives::{Matrix, Vector};
///
/// let x = Matrix::from_vec(10, 2, (0..20).map(f64::from).collect()).expect("valid shape");
/// let y = Vector::from_vec((0..10).map(f64::from).collect());
///
/// let (x_train, x_test, y_train, y_test) = train_test_split(&x, &y, 0.2, Some(42)).expect("valid split");
/// assert_eq!(x_train.n_rows(), 8);
/// assert_eq!(x_test.n_rows(), 2);
/// assert_eq!(y_train.len() + y_test.len(), 10);
/// ```
///
/// # Errors
///
/// Returns `DimensionMismatch` if `x` and `y` disagree in length, otherwise
/// see [`split_sizes`].
#[allow(clippy::type_complexity)]
pub fn train_test_split(
    x: &Matrix<f64>,
    y: &Vector<f64>,
    test_size: f64,
    random_state: Option<u64>,
) -> Result<(Matrix<f64>, Matrix<f64>, Vector<f64>, Vector<f64>)> {
    let n_samples = x.n_rows();
    if n_samples != y.len() {
        return Err(EnergyError::dimension_mismatch("n_samples", n_samples, y.len()));
    }

    let split = train_test_indices(n_samples, test_size, random_state)?;
    Ok((
        x.select_rows(&split.train),
        x.select_rows(&split.test),
        y.select(&split.train),
        y.select(&split.test),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_sizes_80_20() {
        assert_eq!(split_sizes(10, 0.2).expect("valid"), (8, 2));
        assert_eq!(split_sizes(7, 0.2).expect("valid"), (6, 1));
    }

    #[test]
    fn test_split_sizes_rejects_bad_fraction() {
        for bad in [0.0, 1.0, -0.1, 1.5, f64::NAN] {
            assert!(matches!(
                split_sizes(10, bad).unwrap_err(),
                EnergyError::InvalidHyperparameter { .. }
            ));
        }
    }

    #[test]
    fn test_split_sizes_too_small() {
        // 2 * 0.2 rounds to 0 test rows
        assert!(matches!(
            split_sizes(2, 0.2).unwrap_err(),
            EnergyError::EmptyDataset { .. }
        ));
    }

    #[test]
    fn test_indices_partition_all_rows() {
        let split = train_test_indices(20, 0.25, Some(42)).expect("valid");
        assert_eq!(split.train.len(), 15);
        assert_eq!(split.test.len(), 5);

        let mut all: Vec<usize> = split.train.iter().chain(&split.test).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn test_split_reproducibility() {
        let a = train_test_indices(30, 0.2, Some(7)).expect("valid");
        let b = train_test_indices(30, 0.2, Some(7)).expect("valid");
        assert_eq!(a, b);
    }

    #[test]
    fn test_train_test_split_keeps_rows_aligned() {
        let x = Matrix::from_vec(10, 1, (0..10).map(f64::from).collect()).expect("valid");
        let y = Vector::from_vec((0..10).map(|i| f64::from(i) * 10.0).collect());
        let (x_train, x_test, y_train, y_test) =
            train_test_split(&x, &y, 0.3, Some(1)).expect("valid");

        for i in 0..x_train.n_rows() {
            assert_eq!(x_train.get(i, 0) * 10.0, y_train[i]);
        }
        for i in 0..x_test.n_rows() {
            assert_eq!(x_test.get(i, 0) * 10.0, y_test[i]);
        }
    }

    #[test]
    fn test_train_test_split_dimension_mismatch() {
        let x = Matrix::from_vec(4, 1, vec![0.0; 4]).expect("valid");
        let y = Vector::from_slice(&[1.0, 2.0]);
        assert!(matches!(
            train_test_split(&x, &y, 0.5, None).unwrap_err(),
            EnergyError::DimensionMismatch { .. }
        ));
    }
}
