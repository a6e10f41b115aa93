//! Train command implementation

use super::load_and_derive;
use crate::error::CliError;
use crate::output;
use building_energy::config::PipelineConfig;
use building_energy::model::{evaluate, EnergyModel};
use building_energy::report::TrainingReport;
use std::path::Path;

/// Run the train command
pub(crate) fn run(
    input: &Path,
    report_path: Option<&Path>,
    model_path: Option<&Path>,
    config: &PipelineConfig,
    json: bool,
) -> Result<(), CliError> {
    let (dataset, table) = load_and_derive(input, config)?;

    // Scores come from a separate fit on the train split; the saved model
    // sees every labeled row.
    let evaluation = evaluate(&table, config)?;
    let model = EnergyModel::fit(&table, &config.forest)?;
    let report = TrainingReport::new(dataset.len(), evaluation, &model, config.top_features);

    if let Some(path) = report_path {
        report.write(path)?;
    }
    if let Some(path) = model_path {
        model.save_json(path)?;
    }

    if json {
        return output::json(&report);
    }

    println!("{report}");
    if report.evaluation.in_sample {
        output::warning("dataset too small for a hold-out split; accuracy is in-sample");
    }
    if let Some(path) = report_path {
        output::success(&format!("Report written to {}", path.display()));
    }
    if let Some(path) = model_path {
        output::success(&format!("Model saved to {}", path.display()));
    }
    Ok(())
}
