//! Feature derivation: building age, consumption per square foot, and
//! integer codes for the categorical columns.
//!
//! The [`FeatureEncoding`] produced here is the single source of truth for
//! how a building is turned into model inputs. It is fit from the dataset,
//! stored alongside the model, and reused unchanged at prediction time.
//!
//! # Example
//!
//! ```
//! use building_energy::data::{BuildingRecord, Dataset};
//! use building_energy::features::derive_features;
//!
//! let dataset = Dataset::from_records(vec![BuildingRecord {
//!     id: 1,
//!     building_type: "Commercial".to_string(),
//!     square_footage: 1000.0,
//!     year_built: 2000,
//!     heating_type: "Electric".to_string(),
//!     occupant_count: 10,
//!     month: 6,
//!     avg_temperature: 22.0,
//!     avg_humidity: 50.0,
//!     energy_consumption: Some(5000.0),
//! }])
//! .expect("valid records");
//!
//! let table = derive_features(&dataset, 2024).expect("derivable");
//! assert_eq!(table.records()[0].building_age, 24);
//! assert_eq!(table.records()[0].energy_per_sqft, Some(5.0));
//! ```

mod encoder;

pub use encoder::CategoryEncoder;

use crate::data::{BuildingProfile, BuildingRecord, Dataset};
use crate::error::{EnergyError, Result};
use crate::primitives::{Matrix, Vector};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Number of model inputs.
pub const N_FEATURES: usize = 7;

/// Model input names, in feature-vector order.
pub const FEATURE_NAMES: [&str; N_FEATURES] = [
    "square_footage",
    "occupant_count",
    "avg_temperature",
    "avg_humidity",
    "building_age",
    "building_type_encoded",
    "heating_type_encoded",
];

/// Columns appended to the raw table by [`DerivedTable::save_csv`].
pub const DERIVED_COLUMNS: [&str; 4] = [
    "building_age",
    "energy_per_sqft",
    "building_type_encoded",
    "heating_type_encoded",
];

/// One building as model input, ordered as [`FEATURE_NAMES`].
pub type FeatureVector = [f64; N_FEATURES];

/// Reference year plus the fitted category encoders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureEncoding {
    reference_year: i32,
    building_type: CategoryEncoder,
    heating_type: CategoryEncoder,
}

impl FeatureEncoding {
    /// Fits encoders on every record of `dataset`.
    #[must_use]
    pub fn fit(dataset: &Dataset, reference_year: i32) -> Self {
        let building_type =
            CategoryEncoder::fit("building_type", dataset.iter().map(|r| &r.building_type));
        let heating_type =
            CategoryEncoder::fit("heating_type", dataset.iter().map(|r| &r.heating_type));
        tracing::debug!(
            reference_year,
            building_types = ?building_type.classes(),
            heating_types = ?heating_type.classes(),
            "category encoders fitted"
        );
        Self {
            reference_year,
            building_type,
            heating_type,
        }
    }

    /// Year that `building_age` is measured from.
    #[must_use]
    pub fn reference_year(&self) -> i32 {
        self.reference_year
    }

    /// Encoder for the `building_type` column.
    #[must_use]
    pub fn building_type(&self) -> &CategoryEncoder {
        &self.building_type
    }

    /// Encoder for the `heating_type` column.
    #[must_use]
    pub fn heating_type(&self) -> &CategoryEncoder {
        &self.heating_type
    }

    /// `reference_year - year_built`.
    ///
    /// # Errors
    ///
    /// Returns `MalformedRecord` (at `line`) for a building newer than the
    /// reference year.
    pub fn building_age(&self, year_built: i32, line: usize) -> Result<i32> {
        building_age(year_built, self.reference_year, line)
    }

    /// Builds the model input vector for one building.
    ///
    /// # Errors
    ///
    /// - `MalformedRecord` if a field is out of range or the building is
    ///   newer than the reference year
    /// - `UnseenCategory` if a category was not present at fit time
    pub fn encode(&self, profile: &BuildingProfile) -> Result<FeatureVector> {
        profile.validate(0)?;
        let age = self.building_age(profile.year_built, 0)?;
        let building_type = self.building_type.transform(&profile.building_type)?;
        let heating_type = self.heating_type.transform(&profile.heating_type)?;

        Ok([
            profile.square_footage,
            f64::from(profile.occupant_count),
            profile.avg_temperature,
            profile.avg_humidity,
            f64::from(age),
            building_type as f64,
            heating_type as f64,
        ])
    }
}

/// A raw record with its derived columns.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedRecord {
    /// The untouched input row
    pub record: BuildingRecord,
    /// Years between construction and the reference year
    pub building_age: i32,
    /// kWh per square foot; unset when the record is unlabeled
    pub energy_per_sqft: Option<f64>,
    /// Code of `building_type`
    pub building_type_encoded: usize,
    /// Code of `heating_type`
    pub heating_type_encoded: usize,
}

impl DerivedRecord {
    /// Model inputs for this record.
    #[must_use]
    pub fn features(&self) -> FeatureVector {
        let r = &self.record;
        [
            r.square_footage,
            f64::from(r.occupant_count),
            r.avg_temperature,
            r.avg_humidity,
            f64::from(self.building_age),
            self.building_type_encoded as f64,
            self.heating_type_encoded as f64,
        ]
    }
}

/// Output of [`derive_features`]: derived rows plus the encoding that made them.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedTable {
    records: Vec<DerivedRecord>,
    encoding: FeatureEncoding,
}

impl DerivedTable {
    /// Derived rows in input order.
    #[must_use]
    pub fn records(&self) -> &[DerivedRecord] {
        &self.records
    }

    /// Encoding shared by every row.
    #[must_use]
    pub fn encoding(&self) -> &FeatureEncoding {
        &self.encoding
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if there are no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Rows with a known `energy_consumption`.
    pub fn labeled(&self) -> impl Iterator<Item = &DerivedRecord> {
        self.records.iter().filter(|r| r.record.is_labeled())
    }

    /// Feature matrix and target vector over the labeled rows.
    ///
    /// # Errors
    ///
    /// Returns `EmptyDataset` if no row is labeled.
    pub fn training_data(&self) -> Result<(Matrix<f64>, Vector<f64>)> {
        let mut rows = Vec::new();
        let mut targets = Vec::new();
        for derived in &self.records {
            match derived.record.energy_consumption {
                Some(energy) => {
                    rows.push(derived.features());
                    targets.push(energy);
                }
                None => tracing::warn!(
                    building_id = derived.record.id,
                    "skipping record without energy_consumption"
                ),
            }
        }

        if rows.is_empty() {
            return Err(EnergyError::empty(&format!(
                "no labeled records among {} rows",
                self.records.len()
            )));
        }
        Ok((Matrix::from_rows(N_FEATURES, &rows)?, Vector::from_vec(targets)))
    }

    /// Writes the raw columns followed by [`DERIVED_COLUMNS`].
    ///
    /// The file can be loaded back with [`Dataset::load`]; derived columns
    /// are ignored there and recomputed by the next derivation.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or written.
    pub fn save_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let mut writer = csv::Writer::from_path(path)?;
        if self.records.is_empty() {
            let header: Vec<&str> = crate::data::RAW_COLUMNS
                .iter()
                .chain(DERIVED_COLUMNS.iter())
                .copied()
                .collect();
            writer.write_record(&header)?;
        }
        for derived in &self.records {
            writer.serialize(DerivedRow::from(derived))?;
        }
        writer.flush()?;

        tracing::info!(path = %path.display(), rows = self.records.len(), "derived table written");
        Ok(())
    }
}

/// Flat CSV row; csv cannot serialize nested structs.
#[derive(Serialize)]
struct DerivedRow<'a> {
    building_id: u64,
    building_type: &'a str,
    square_footage: f64,
    year_built: i32,
    heating_type: &'a str,
    occupant_count: u32,
    month: u8,
    avg_temperature: f64,
    avg_humidity: f64,
    energy_consumption: Option<f64>,
    building_age: i32,
    energy_per_sqft: Option<f64>,
    building_type_encoded: usize,
    heating_type_encoded: usize,
}

impl<'a> From<&'a DerivedRecord> for DerivedRow<'a> {
    fn from(derived: &'a DerivedRecord) -> Self {
        let r = &derived.record;
        Self {
            building_id: r.id,
            building_type: &r.building_type,
            square_footage: r.square_footage,
            year_built: r.year_built,
            heating_type: &r.heating_type,
            occupant_count: r.occupant_count,
            month: r.month,
            avg_temperature: r.avg_temperature,
            avg_humidity: r.avg_humidity,
            energy_consumption: r.energy_consumption,
            building_age: derived.building_age,
            energy_per_sqft: derived.energy_per_sqft,
            building_type_encoded: derived.building_type_encoded,
            heating_type_encoded: derived.heating_type_encoded,
        }
    }
}

/// `reference_year - year_built`, rejecting buildings from the future.
///
/// # Errors
///
/// Returns `MalformedRecord` (at `line`) when `year_built` is after
/// `reference_year`.
pub fn building_age(year_built: i32, reference_year: i32, line: usize) -> Result<i32> {
    if year_built > reference_year {
        return Err(EnergyError::malformed(
            line,
            "year_built",
            year_built,
            format!("after reference year {reference_year}"),
        ));
    }
    Ok(reference_year - year_built)
}

/// Computes derived columns for every record of `dataset`.
///
/// Encoders are fit fresh from `dataset`, so the returned table carries the
/// encoding that any model trained on it must use.
///
/// # Errors
///
/// Returns `MalformedRecord` if any building was built after
/// `reference_year`; no partial table is returned.
pub fn derive_features(dataset: &Dataset, reference_year: i32) -> Result<DerivedTable> {
    let encoding = FeatureEncoding::fit(dataset, reference_year);

    let records = dataset
        .iter()
        .enumerate()
        .map(|(i, record)| {
            let building_age = encoding.building_age(record.year_built, i + 2)?;
            Ok(DerivedRecord {
                building_age,
                energy_per_sqft: record
                    .energy_consumption
                    .map(|energy| energy / record.square_footage),
                building_type_encoded: encoding.building_type.transform(&record.building_type)?,
                heating_type_encoded: encoding.heating_type.transform(&record.heating_type)?,
                record: record.clone(),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    tracing::info!(
        rows = records.len(),
        reference_year,
        building_types = encoding.building_type.len(),
        heating_types = encoding.heating_type.len(),
        "features derived"
    );
    Ok(DerivedTable { records, encoding })
}
