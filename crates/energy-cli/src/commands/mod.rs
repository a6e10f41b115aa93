//! Subcommand implementations

pub(crate) mod add;
pub(crate) mod derive;
pub(crate) mod predict;
pub(crate) mod summary;
pub(crate) mod train;

use crate::error::CliError;
use building_energy::config::PipelineConfig;
use building_energy::data::Dataset;
use building_energy::features::{derive_features, DerivedTable};
use std::path::Path;

/// Loads `input` and derives features with the configured reference year.
pub(crate) fn load_and_derive(
    input: &Path,
    config: &PipelineConfig,
) -> Result<(Dataset, DerivedTable), CliError> {
    let dataset = Dataset::load(input)?;
    let table = derive_features(&dataset, config.reference_year)?;
    Ok((dataset, table))
}
