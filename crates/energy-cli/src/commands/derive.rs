//! Derive command implementation

use super::load_and_derive;
use crate::error::CliError;
use crate::output;
use building_energy::config::PipelineConfig;
use serde::Serialize;
use std::path::Path;

#[derive(Serialize)]
struct DeriveOutcome<'a> {
    input: &'a Path,
    output: &'a Path,
    rows: usize,
    reference_year: i32,
    building_types: &'a [String],
    heating_types: &'a [String],
}

/// Run the derive command
pub(crate) fn run(
    input: &Path,
    destination: &Path,
    config: &PipelineConfig,
    json: bool,
) -> Result<(), CliError> {
    let (_, table) = load_and_derive(input, config)?;
    table.save_csv(destination)?;

    let encoding = table.encoding();
    let outcome = DeriveOutcome {
        input,
        output: destination,
        rows: table.len(),
        reference_year: encoding.reference_year(),
        building_types: encoding.building_type().classes(),
        heating_types: encoding.heating_type().classes(),
    };
    if json {
        return output::json(&outcome);
    }

    output::section("Derived Features");
    output::kv("Rows", outcome.rows);
    output::kv("Reference year", outcome.reference_year);
    output::kv("Building types", outcome.building_types.join(", "));
    output::kv("Heating types", outcome.heating_types.join(", "));
    output::success(&format!("Wrote {}", destination.display()));
    Ok(())
}
