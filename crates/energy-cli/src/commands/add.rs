//! Add command implementation

use crate::error::CliError;
use crate::output;
use crate::BuildingArgs;
use building_energy::config::PipelineConfig;
use building_energy::data::{BuildingRecord, Dataset};
use building_energy::features::building_age;
use serde_json::json;
use std::path::Path;

/// Run the add command
pub(crate) fn run(
    input: &Path,
    building: &BuildingArgs,
    month: u8,
    energy: Option<f64>,
    config: &PipelineConfig,
    json: bool,
) -> Result<(), CliError> {
    let mut dataset = Dataset::load_or_default(input)?;
    let created = dataset.is_empty() && !input.exists();

    let record = BuildingRecord {
        id: 0,
        building_type: building.building_type.clone(),
        square_footage: building.square_footage,
        year_built: building.year_built,
        heating_type: building.heating_type.clone(),
        occupant_count: building.occupants,
        month,
        avg_temperature: building.temperature,
        avg_humidity: building.humidity,
        energy_consumption: energy,
    };
    // A row derive_features would reject must never reach the file.
    building_age(record.year_built, config.reference_year, dataset.len() + 2)?;
    let id = dataset.append(record)?;
    dataset.save(input)?;
    tracing::info!(building_id = id, path = %input.display(), "record appended");

    if json {
        return output::json(&json!({
            "building_id": id,
            "records": dataset.len(),
            "created": created,
        }));
    }

    if created {
        output::warning(&format!("{} did not exist; created it", input.display()));
    }
    output::success(&format!("Added building {id} to {}", input.display()));
    output::kv("Records", dataset.len());
    if energy.is_none() {
        output::kv("Note", "record has no energy_consumption and is skipped when training");
    }
    Ok(())
}
