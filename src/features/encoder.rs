//! Category → integer code mapping.

use crate::error::{EnergyError, Result};
use serde::{Deserialize, Serialize};

/// Maps category values of one column to stable integer codes.
///
/// Codes are assigned 0, 1, 2, … in order of first appearance, so fitting
/// twice on values with the same first-appearance order gives the same
/// mapping. Values not seen during `fit` are rejected by `transform`.
///
/// # Examples
///
/// ```
/// use building_energy::features::CategoryEncoder;
///
/// let encoder = CategoryEncoder::fit("heating_type", ["Gas", "Electric", "Gas"]);
/// assert_eq!(encoder.transform("Gas").expect("seen"), 0);
/// assert_eq!(encoder.transform("Electric").expect("seen"), 1);
/// assert!(encoder.transform("Oil").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryEncoder {
    column: String,
    classes: Vec<String>,
}

impl CategoryEncoder {
    /// Fits an encoder on the values of `column`.
    pub fn fit<I, S>(column: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut classes: Vec<String> = Vec::new();
        for value in values {
            let value = value.as_ref();
            if !classes.iter().any(|c| c == value) {
                classes.push(value.to_string());
            }
        }
        Self {
            column: column.to_string(),
            classes,
        }
    }

    /// Code for `value`.
    ///
    /// # Errors
    ///
    /// Returns `UnseenCategory` if `value` was not present at fit time.
    pub fn transform(&self, value: &str) -> Result<usize> {
        self.classes
            .iter()
            .position(|c| c == value)
            .ok_or_else(|| EnergyError::UnseenCategory {
                column: self.column.clone(),
                value: value.to_string(),
            })
    }

    /// Category name for `code`, if the code exists.
    #[must_use]
    pub fn inverse(&self, code: usize) -> Option<&str> {
        self.classes.get(code).map(String::as_str)
    }

    /// Column this encoder was fit on.
    #[must_use]
    pub fn column(&self) -> &str {
        &self.column
    }

    /// Known categories, indexed by code.
    #[must_use]
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Number of known categories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Returns true if no category was seen at fit time.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_follow_first_appearance() {
        let encoder =
            CategoryEncoder::fit("building_type", ["Residential", "Commercial", "Residential"]);
        assert_eq!(encoder.classes(), ["Residential", "Commercial"]);
        assert_eq!(encoder.transform("Residential").expect("seen"), 0);
        assert_eq!(encoder.transform("Commercial").expect("seen"), 1);
    }

    #[test]
    fn test_fit_is_deterministic() {
        let values = ["Gas", "Electric", "Gas", "Electric"];
        assert_eq!(
            CategoryEncoder::fit("heating_type", values),
            CategoryEncoder::fit("heating_type", values)
        );
    }

    #[test]
    fn test_unseen_value_names_column_and_value() {
        let encoder = CategoryEncoder::fit("building_type", ["Commercial", "Residential"]);
        match encoder.transform("Industrial").unwrap_err() {
            EnergyError::UnseenCategory { column, value } => {
                assert_eq!(column, "building_type");
                assert_eq!(value, "Industrial");
            }
            other => panic!("expected UnseenCategory, got {other:?}"),
        }
    }

    #[test]
    fn test_matching_is_case_sensitive() {
        let encoder = CategoryEncoder::fit("heating_type", ["Gas"]);
        assert!(encoder.transform("gas").is_err());
    }

    #[test]
    fn test_inverse() {
        let encoder = CategoryEncoder::fit("heating_type", ["Electric", "Gas"]);
        assert_eq!(encoder.inverse(1), Some("Gas"));
        assert_eq!(encoder.inverse(2), None);
        assert_eq!(encoder.len(), 2);
        assert!(!encoder.is_empty());
    }

    #[test]
    fn test_empty_fit() {
        let encoder = CategoryEncoder::fit("heating_type", Vec::<String>::new());
        assert!(encoder.is_empty());
        assert!(encoder.transform("Gas").is_err());
    }
}
