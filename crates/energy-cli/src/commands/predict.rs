//! Predict command implementation

use super::load_and_derive;
use crate::error::CliError;
use crate::output;
use building_energy::analysis::{assess, EfficiencyRating};
use building_energy::config::PipelineConfig;
use building_energy::data::BuildingProfile;
use building_energy::model::EnergyModel;
use colored::Colorize;
use std::path::Path;

/// Where the model comes from.
#[derive(Debug, Clone, Copy)]
pub(crate) enum ModelSource<'a> {
    /// Fit a fresh model on this raw table
    Train(&'a Path),
    /// Load a model written by `train --save-model`
    Saved(&'a Path),
}

/// Run the predict command
pub(crate) fn run(
    source: ModelSource<'_>,
    profile: &BuildingProfile,
    config: &PipelineConfig,
    json: bool,
) -> Result<(), CliError> {
    let model = match source {
        ModelSource::Train(input) => {
            let (_, table) = load_and_derive(input, config)?;
            EnergyModel::fit(&table, &config.forest)?
        }
        ModelSource::Saved(path) => {
            let model = EnergyModel::load_json(path)?;
            if model.encoding().reference_year() != config.reference_year {
                tracing::warn!(
                    model_year = model.encoding().reference_year(),
                    "saved model's reference year is used for building age"
                );
            }
            model
        }
    };

    let assessment = assess(&model, profile)?;
    if json {
        return output::json(&assessment);
    }

    output::section("Building");
    output::kv("Type", &profile.building_type);
    output::kv("Floor area", format!("{:.0} sq ft", profile.square_footage));
    output::kv(
        "Built",
        format!("{} (age {})", profile.year_built, assessment.building_age),
    );
    output::kv("Heating", &profile.heating_type);
    output::kv("Occupants", profile.occupant_count);
    output::kv("Temperature", format!("{} °C", profile.avg_temperature));
    output::kv("Humidity", format!("{} %", profile.avg_humidity));

    output::section("Prediction");
    output::kv("Estimated consumption", output::format_kwh(assessment.estimate));
    output::kv(
        "Per square foot",
        format!("{:.2} kWh/sq ft", assessment.kwh_per_sqft),
    );
    let rating = match assessment.rating {
        EfficiencyRating::Excellent => assessment.rating.to_string().green().bold(),
        EfficiencyRating::Good => assessment.rating.to_string().cyan(),
        EfficiencyRating::Low => assessment.rating.to_string().yellow().bold(),
    };
    output::kv("Efficiency", rating);

    output::section("Feature Importance");
    for feature in &assessment.importances {
        println!(
            "  {:<22} {:>5.1}% {}",
            feature.name,
            feature.importance * 100.0,
            output::importance_bar(feature.importance)
        );
    }

    output::section("Recommendations");
    for recommendation in &assessment.recommendations {
        output::bullet(recommendation);
    }
    Ok(())
}
