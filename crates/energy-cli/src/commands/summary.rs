//! Summary command implementation

use crate::error::CliError;
use crate::output;
use building_energy::analysis::DatasetSummary;
use building_energy::data::Dataset;
use std::path::Path;

/// Run the summary command
pub(crate) fn run(input: &Path, json: bool) -> Result<(), CliError> {
    let summary = DatasetSummary::of(&Dataset::load(input)?);
    if json {
        return output::json(&summary);
    }

    output::section("Dataset");
    output::kv("File", input.display());
    output::kv("Records", summary.n_records);
    output::kv("Labeled", summary.n_labeled);
    if summary.n_records == 0 {
        output::warning("dataset is empty");
        return Ok(());
    }

    output::section("By Building Type");
    for group in &summary.by_type {
        let mean = group
            .mean_consumption
            .map_or_else(|| "n/a".to_string(), output::format_kwh);
        println!(
            "  {:<14} {:>5} records  {:>5} labeled  mean {}",
            group.building_type, group.count, group.labeled, mean
        );
    }

    output::section("Consumption vs Temperature");
    match summary.temperature_trend {
        Some(trend) => {
            output::kv("Slope", format!("{:+.1} kWh per °C", trend.slope));
            output::kv("At 0 °C", output::format_kwh(trend.intercept));
        }
        None => output::warning("need at least 3 labeled records at different temperatures"),
    }

    output::section("Columns");
    println!(
        "  {:<20} {:>6} {:>12} {:>12} {:>12} {:>12}",
        "column", "count", "mean", "std", "min", "max"
    );
    for column in &summary.columns {
        println!(
            "  {:<20} {:>6} {:>12.2} {:>12.2} {:>12.2} {:>12.2}",
            column.name, column.count, column.mean, column.std, column.min, column.max
        );
    }
    Ok(())
}
