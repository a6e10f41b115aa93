//! Append-only store of building records backed by a CSV file.
//!
//! Provides:
//! - CSV loading with per-field validation (`Dataset::load`)
//! - Appending new observations with the next free id
//! - Writing the table back out
//! - Descriptive statistics over the numeric columns

mod record;

pub use record::{BuildingProfile, BuildingRecord, RAW_COLUMNS};

use crate::error::{EnergyError, Result};
use crate::primitives::Vector;
use csv::{ReaderBuilder, StringRecord, Trim};
use std::path::Path;
use std::str::FromStr;

/// A flat table of building records.
///
/// Records are never mutated or removed once added; the table only grows.
///
/// # Examples
///
/// ```
/// use building_energy::data::{BuildingRecord, Dataset};
///
/// let mut dataset = Dataset::new();
/// let id = dataset
///     .append(BuildingRecord {
///         id: 0,
///         building_type: "Residential".to_string(),
///         square_footage: 1800.0,
///         year_built: 1985,
///         heating_type: "Gas".to_string(),
///         occupant_count: 3,
///         month: 2,
///         avg_temperature: -1.5,
///         avg_humidity: 70.0,
///         energy_consumption: Some(2400.0),
///     })
///     .expect("valid record");
/// assert_eq!(id, 1);
/// assert_eq!(dataset.len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    records: Vec<BuildingRecord>,
}

impl Dataset {
    /// Creates an empty dataset.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a dataset from already-constructed records.
    ///
    /// # Errors
    ///
    /// Returns `MalformedRecord` for the first invalid record (the reported
    /// line is the 1-based data row plus the header line).
    pub fn from_records(records: Vec<BuildingRecord>) -> Result<Self> {
        for (i, record) in records.iter().enumerate() {
            record.validate(i + 2)?;
        }
        Ok(Self { records })
    }

    /// Loads a dataset from a CSV file with a header row.
    ///
    /// Columns are matched by name; extra columns (such as derived features)
    /// are ignored, and `energy_consumption` may be absent or empty.
    ///
    /// # Errors
    ///
    /// - `MissingFile` if `path` does not exist
    /// - `MalformedRecord` for the first unparsable or out-of-range field;
    ///   the whole batch is rejected
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(EnergyError::MissingFile {
                path: path.to_path_buf(),
            });
        }

        let mut reader = ReaderBuilder::new().trim(Trim::All).from_path(path)?;
        let headers = reader.headers()?.clone();
        let columns = ColumnIndex::resolve(&headers)?;

        let mut records = Vec::new();
        for result in reader.records() {
            let row = result.map_err(row_error)?;
            let line = row
                .position()
                .map_or(records.len() + 2, |p| p.line() as usize);
            let record = columns.parse(&row, line)?;
            record.validate(line)?;
            records.push(record);
        }

        tracing::info!(
            path = %path.display(),
            records = records.len(),
            labeled = records.iter().filter(|r| r.is_labeled()).count(),
            "dataset loaded"
        );
        Ok(Self { records })
    }

    /// Loads `path` if it exists, otherwise starts an empty dataset.
    ///
    /// # Errors
    ///
    /// Same as [`Dataset::load`] except that a missing file is not an error.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        match Self::load(path) {
            Err(EnergyError::MissingFile { .. }) => Ok(Self::new()),
            other => other,
        }
    }

    /// Writes the table (header plus all records) to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or written.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let mut writer = csv::Writer::from_path(path)?;
        if self.records.is_empty() {
            writer.write_record(RAW_COLUMNS)?;
        }
        for record in &self.records {
            writer.serialize(record)?;
        }
        writer.flush()?;
        tracing::debug!(path = %path.display(), records = self.records.len(), "dataset saved");
        Ok(())
    }

    /// Appends a record, assigning it the next free id.
    ///
    /// The `id` field of `record` is ignored. Returns the assigned id.
    ///
    /// # Errors
    ///
    /// Returns `MalformedRecord` if the record fails validation; the dataset
    /// is left unchanged.
    pub fn append(&mut self, mut record: BuildingRecord) -> Result<u64> {
        record.validate(0)?;
        record.id = self.next_id();
        let id = record.id;
        self.records.push(record);
        Ok(id)
    }

    /// One past the highest id in the table (1 for an empty table).
    #[must_use]
    pub fn next_id(&self) -> u64 {
        self.records.iter().map(|r| r.id).max().map_or(1, |max| max + 1)
    }

    /// All records in insertion order.
    #[must_use]
    pub fn records(&self) -> &[BuildingRecord] {
        &self.records
    }

    /// Iterates over records in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &BuildingRecord> {
        self.records.iter()
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the table has no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of records with `energy_consumption` set.
    #[must_use]
    pub fn labeled_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_labeled()).count()
    }

    /// Descriptive statistics for each numeric column.
    ///
    /// `energy_consumption` statistics cover labeled records only.
    #[must_use]
    pub fn describe(&self) -> Vec<ColumnStats> {
        let numeric: [(&str, fn(&BuildingRecord) -> Option<f64>); 7] = [
            ("square_footage", |r| Some(r.square_footage)),
            ("year_built", |r| Some(f64::from(r.year_built))),
            ("occupant_count", |r| Some(f64::from(r.occupant_count))),
            ("month", |r| Some(f64::from(r.month))),
            ("avg_temperature", |r| Some(r.avg_temperature)),
            ("avg_humidity", |r| Some(r.avg_humidity)),
            ("energy_consumption", |r| r.energy_consumption),
        ];

        numeric
            .iter()
            .map(|(name, get)| {
                let values: Vec<f64> = self.records.iter().filter_map(get).collect();
                ColumnStats::from_values(name, values)
            })
            .collect()
    }
}

/// Descriptive statistics for a column.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ColumnStats {
    /// Column name.
    pub name: String,
    /// Number of values.
    pub count: usize,
    /// Mean value.
    pub mean: f64,
    /// Standard deviation (population).
    pub std: f64,
    /// Minimum value.
    pub min: f64,
    /// Median value.
    pub median: f64,
    /// Maximum value.
    pub max: f64,
}

impl ColumnStats {
    fn from_values(name: &str, mut sorted: Vec<f64>) -> Self {
        sorted.sort_by(f64::total_cmp);
        let column = Vector::from_slice(&sorted);

        let median = if sorted.is_empty() {
            0.0
        } else if sorted.len() % 2 == 0 {
            (sorted[sorted.len() / 2 - 1] + sorted[sorted.len() / 2]) / 2.0
        } else {
            sorted[sorted.len() / 2]
        };

        Self {
            name: name.to_string(),
            count: sorted.len(),
            mean: column.mean(),
            std: column.variance().sqrt(),
            min: sorted.first().copied().unwrap_or(0.0),
            median,
            max: sorted.last().copied().unwrap_or(0.0),
        }
    }
}

/// Positions of the raw columns within a CSV header.
struct ColumnIndex {
    building_id: usize,
    building_type: usize,
    square_footage: usize,
    year_built: usize,
    heating_type: usize,
    occupant_count: usize,
    month: usize,
    avg_temperature: usize,
    avg_humidity: usize,
    energy_consumption: Option<usize>,
}

impl ColumnIndex {
    fn resolve(headers: &StringRecord) -> Result<Self> {
        let find = |name: &str| -> Result<usize> {
            headers.iter().position(|h| h == name).ok_or_else(|| {
                EnergyError::malformed(
                    1,
                    name,
                    "",
                    format!(
                        "required column missing; available columns: {:?}",
                        headers.iter().collect::<Vec<_>>()
                    ),
                )
            })
        };

        Ok(Self {
            building_id: find("building_id")?,
            building_type: find("building_type")?,
            square_footage: find("square_footage")?,
            year_built: find("year_built")?,
            heating_type: find("heating_type")?,
            occupant_count: find("occupant_count")?,
            month: find("month")?,
            avg_temperature: find("avg_temperature")?,
            avg_humidity: find("avg_humidity")?,
            energy_consumption: headers.iter().position(|h| h == "energy_consumption"),
        })
    }

    fn parse(&self, row: &StringRecord, line: usize) -> Result<BuildingRecord> {
        let energy_consumption = match self.energy_consumption {
            Some(idx) => {
                let raw = row.get(idx).unwrap_or("");
                if raw.is_empty() {
                    None
                } else {
                    Some(parse_field(raw, line, "energy_consumption")?)
                }
            }
            None => None,
        };

        Ok(BuildingRecord {
            id: parse_field(field(row, self.building_id), line, "building_id")?,
            building_type: field(row, self.building_type).to_string(),
            square_footage: parse_field(field(row, self.square_footage), line, "square_footage")?,
            year_built: parse_field(field(row, self.year_built), line, "year_built")?,
            heating_type: field(row, self.heating_type).to_string(),
            occupant_count: parse_field(field(row, self.occupant_count), line, "occupant_count")?,
            month: parse_field(field(row, self.month), line, "month")?,
            avg_temperature: parse_field(field(row, self.avg_temperature), line, "avg_temperature")?,
            avg_humidity: parse_field(field(row, self.avg_humidity), line, "avg_humidity")?,
            energy_consumption,
        })
    }
}

/// Reports a row with the wrong number of fields as a malformed record.
fn row_error(err: csv::Error) -> EnergyError {
    let malformed = match err.kind() {
        csv::ErrorKind::UnequalLengths {
            pos,
            expected_len,
            len,
        } => Some(EnergyError::malformed(
            pos.as_ref().map_or(0, |p| p.line() as usize),
            "row",
            format!("{len} fields"),
            format!("expected {expected_len} fields"),
        )),
        _ => None,
    };
    malformed.unwrap_or(EnergyError::Csv(err))
}

fn field(row: &StringRecord, idx: usize) -> &str {
    row.get(idx).unwrap_or("")
}

fn parse_field<T: FromStr>(raw: &str, line: usize, name: &str) -> Result<T> {
    raw.parse::<T>().map_err(|_| {
        let expected = match std::any::type_name::<T>() {
            "f64" => "a number",
            "u8" | "u32" | "u64" => "a non-negative integer",
            _ => "an integer",
        };
        EnergyError::malformed(line, name, raw, format!("expected {expected}"))
    })
}

#[cfg(test)]
#[path = "data_tests.rs"]
mod tests;
