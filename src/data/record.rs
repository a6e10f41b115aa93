//! Building records and their field-level validation.

use crate::error::{EnergyError, Result};
use serde::{Deserialize, Serialize};

/// Column names of the raw building table, in file order.
pub const RAW_COLUMNS: [&str; 10] = [
    "building_id",
    "building_type",
    "square_footage",
    "year_built",
    "heating_type",
    "occupant_count",
    "month",
    "avg_temperature",
    "avg_humidity",
    "energy_consumption",
];

/// One building-month observation.
///
/// `building_type` is expected to be `Commercial` or `Residential` and
/// `heating_type` `Electric` or `Gas`, but both are kept as free strings so
/// that an unexpected value reaches the category encoder and is reported
/// there instead of being rejected at load time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingRecord {
    /// Row identifier
    #[serde(rename = "building_id")]
    pub id: u64,
    /// Usage category, e.g. `Commercial`
    pub building_type: String,
    /// Floor area in square feet (> 0)
    pub square_footage: f64,
    /// Construction year
    pub year_built: i32,
    /// Heating system, e.g. `Gas`
    pub heating_type: String,
    /// People using the building
    pub occupant_count: u32,
    /// Month of the observation (1-12)
    pub month: u8,
    /// Mean outdoor temperature in °C
    pub avg_temperature: f64,
    /// Mean relative humidity in percent (0-100)
    pub avg_humidity: f64,
    /// Metered consumption in kWh; unset for unlabeled records
    pub energy_consumption: Option<f64>,
}

/// Prediction-time description of a building.
///
/// Same fields the model consumes, without id, month or target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingProfile {
    /// Usage category, e.g. `Residential`
    pub building_type: String,
    /// Floor area in square feet (> 0)
    pub square_footage: f64,
    /// Construction year
    pub year_built: i32,
    /// Heating system, e.g. `Electric`
    pub heating_type: String,
    /// People using the building
    pub occupant_count: u32,
    /// Mean outdoor temperature in °C
    pub avg_temperature: f64,
    /// Mean relative humidity in percent (0-100)
    pub avg_humidity: f64,
}

impl BuildingRecord {
    /// Prediction inputs carried by this record.
    #[must_use]
    pub fn profile(&self) -> BuildingProfile {
        BuildingProfile {
            building_type: self.building_type.clone(),
            square_footage: self.square_footage,
            year_built: self.year_built,
            heating_type: self.heating_type.clone(),
            occupant_count: self.occupant_count,
            avg_temperature: self.avg_temperature,
            avg_humidity: self.avg_humidity,
        }
    }

    /// Returns true if the target is set.
    #[must_use]
    pub fn is_labeled(&self) -> bool {
        self.energy_consumption.is_some()
    }

    /// Checks every field range.
    ///
    /// `line` is reported in the error; pass 0 for records not read from a file.
    ///
    /// # Errors
    ///
    /// Returns `MalformedRecord` naming the first offending field.
    pub fn validate(&self, line: usize) -> Result<()> {
        self.profile().validate(line)?;
        if !(1..=12).contains(&self.month) {
            return Err(EnergyError::malformed(
                line,
                "month",
                self.month,
                "must be between 1 and 12",
            ));
        }
        if let Some(energy) = self.energy_consumption {
            if !energy.is_finite() || energy < 0.0 {
                return Err(EnergyError::malformed(
                    line,
                    "energy_consumption",
                    energy,
                    "must be a non-negative number",
                ));
            }
        }
        Ok(())
    }
}

impl BuildingProfile {
    /// Checks every field range.
    ///
    /// # Errors
    ///
    /// Returns `MalformedRecord` naming the first offending field.
    pub fn validate(&self, line: usize) -> Result<()> {
        check_category(line, "building_type", &self.building_type)?;
        check_category(line, "heating_type", &self.heating_type)?;

        if !self.square_footage.is_finite() || self.square_footage <= 0.0 {
            return Err(EnergyError::malformed(
                line,
                "square_footage",
                self.square_footage,
                "must be a positive number",
            ));
        }
        if !(MIN_YEAR..=MAX_YEAR).contains(&self.year_built) {
            return Err(EnergyError::malformed(
                line,
                "year_built",
                self.year_built,
                format!("must be a year between {MIN_YEAR} and {MAX_YEAR}"),
            ));
        }
        if !self.avg_temperature.is_finite() {
            return Err(EnergyError::malformed(
                line,
                "avg_temperature",
                self.avg_temperature,
                "must be a finite number",
            ));
        }
        if !(0.0..=100.0).contains(&self.avg_humidity) {
            return Err(EnergyError::malformed(
                line,
                "avg_humidity",
                self.avg_humidity,
                "must be between 0 and 100",
            ));
        }
        Ok(())
    }
}

const MIN_YEAR: i32 = 1000;
const MAX_YEAR: i32 = 9999;

fn check_category(line: usize, field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(EnergyError::malformed(line, field, value, "must not be empty"));
    }
    Ok(())
}
