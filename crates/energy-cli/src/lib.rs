//! energy-cli library
//!
//! This library is the foundation for the `energy` CLI binary.
//! Exports CLI structures for testing and reuse.

use building_energy::config::PipelineConfig;
use building_energy::data::BuildingProfile;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

mod commands;
pub mod error;
mod output;

pub use error::CliError;

/// energy - building energy consumption forecasting
///
/// Derive features from a table of building observations, train a random
/// forest on them, and predict consumption for new buildings.
#[derive(Parser, Debug)]
#[command(name = "energy")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// JSON configuration file (reference year, split, forest settings)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbose output (debug logging)
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write the raw table with derived feature columns appended
    Derive {
        /// Raw building table (CSV)
        #[arg(value_name = "RAW")]
        input: PathBuf,

        /// Destination for the derived table
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,

        /// Year building age is measured from
        #[arg(long)]
        reference_year: Option<i32>,
    },

    /// Evaluate and fit a model, then print the training report
    Train {
        /// Raw building table (CSV)
        #[arg(value_name = "RAW")]
        input: PathBuf,

        /// Also write the report to this file
        #[arg(long, value_name = "FILE")]
        report: Option<PathBuf>,

        /// Save the fitted model as JSON
        #[arg(long, value_name = "FILE")]
        save_model: Option<PathBuf>,

        #[command(flatten)]
        tuning: TuningArgs,
    },

    /// Predict consumption for one building
    Predict {
        /// Raw building table to train on
        #[arg(
            value_name = "RAW",
            required_unless_present = "model",
            conflicts_with = "model"
        )]
        input: Option<PathBuf>,

        /// Previously saved model instead of training
        #[arg(long, value_name = "FILE")]
        model: Option<PathBuf>,

        #[command(flatten)]
        building: BuildingArgs,

        #[command(flatten)]
        tuning: TuningArgs,
    },

    /// Append an observation to the raw table
    Add {
        /// Raw building table (created if absent)
        #[arg(value_name = "RAW")]
        input: PathBuf,

        #[command(flatten)]
        building: BuildingArgs,

        /// Month of the observation (1-12)
        #[arg(long)]
        month: u8,

        /// Metered consumption in kWh (omit for an unlabeled record)
        #[arg(long)]
        energy: Option<f64>,

        /// Year building age is measured from
        #[arg(long)]
        reference_year: Option<i32>,
    },

    /// Show dataset statistics
    Summary {
        /// Raw building table (CSV)
        #[arg(value_name = "RAW")]
        input: PathBuf,
    },
}

/// Description of one building on the command line.
#[derive(Args, Debug, Clone)]
pub struct BuildingArgs {
    /// Usage category, e.g. Commercial or Residential
    #[arg(long)]
    pub building_type: String,

    /// Floor area in square feet
    #[arg(long)]
    pub square_footage: f64,

    /// Construction year
    #[arg(long)]
    pub year_built: i32,

    /// Heating system, e.g. Electric or Gas
    #[arg(long)]
    pub heating_type: String,

    /// Number of occupants
    #[arg(long)]
    pub occupants: u32,

    /// Mean outdoor temperature in °C
    #[arg(long, allow_hyphen_values = true)]
    pub temperature: f64,

    /// Mean relative humidity in percent
    #[arg(long)]
    pub humidity: f64,
}

impl BuildingArgs {
    /// Prediction inputs for the library.
    pub fn profile(&self) -> BuildingProfile {
        BuildingProfile {
            building_type: self.building_type.clone(),
            square_footage: self.square_footage,
            year_built: self.year_built,
            heating_type: self.heating_type.clone(),
            occupant_count: self.occupants,
            avg_temperature: self.temperature,
            avg_humidity: self.humidity,
        }
    }
}

/// Overrides for values normally taken from the config file.
#[derive(Args, Debug, Clone, Default)]
pub struct TuningArgs {
    /// Year building age is measured from
    #[arg(long)]
    pub reference_year: Option<i32>,

    /// Number of trees
    #[arg(long)]
    pub n_estimators: Option<usize>,

    /// Maximum tree depth
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// Share of labeled rows held out for evaluation
    #[arg(long)]
    pub test_size: Option<f64>,

    /// Random seed
    #[arg(long)]
    pub seed: Option<u64>,
}

impl TuningArgs {
    fn apply(&self, mut config: PipelineConfig) -> PipelineConfig {
        if let Some(year) = self.reference_year {
            config.reference_year = year;
        }
        if let Some(n) = self.n_estimators {
            config.forest.n_estimators = n;
        }
        if let Some(depth) = self.max_depth {
            config.forest.max_depth = Some(depth);
        }
        if let Some(test_size) = self.test_size {
            config.test_size = test_size;
        }
        if let Some(seed) = self.seed {
            config.forest.random_state = Some(seed);
        }
        config
    }
}

/// Loads `--config` (or defaults), applies overrides and validates.
///
/// # Errors
///
/// Returns an error if the file is missing or invalid, or an override is out
/// of range.
pub fn load_config(path: Option<&Path>, tuning: &TuningArgs) -> Result<PipelineConfig, CliError> {
    let base = match path {
        Some(path) => PipelineConfig::from_json_file(path)?,
        None => PipelineConfig::default(),
    };
    let config = tuning.apply(base);
    config.validate()?;
    Ok(config)
}

/// Installs the stderr log subscriber.
///
/// `RUST_LOG` takes precedence; otherwise `--verbose` selects debug,
/// `--quiet` errors only, and the default is warnings.
pub fn init_logging(verbose: bool, quiet: bool) {
    let default = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    // A second init (e.g. from tests) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Execute the CLI command and return the result.
pub fn execute_command(cli: &Cli) -> Result<(), CliError> {
    let config_path = cli.config.as_deref();

    match &cli.command {
        Commands::Derive {
            input,
            output,
            reference_year,
        } => {
            let tuning = TuningArgs {
                reference_year: *reference_year,
                ..TuningArgs::default()
            };
            let config = load_config(config_path, &tuning)?;
            commands::derive::run(input, output, &config, cli.json)
        }
        Commands::Train {
            input,
            report,
            save_model,
            tuning,
        } => {
            let config = load_config(config_path, tuning)?;
            commands::train::run(
                input,
                report.as_deref(),
                save_model.as_deref(),
                &config,
                cli.json,
            )
        }
        Commands::Predict {
            input,
            model,
            building,
            tuning,
        } => {
            let source = match (input, model) {
                (_, Some(model)) => commands::predict::ModelSource::Saved(model),
                (Some(input), None) => commands::predict::ModelSource::Train(input),
                (None, None) => {
                    return Err(CliError::InvalidArgument(
                        "either a raw table or --model is required".to_string(),
                    ))
                }
            };
            let config = load_config(config_path, tuning)?;
            commands::predict::run(source, &building.profile(), &config, cli.json)
        }
        Commands::Add {
            input,
            building,
            month,
            energy,
            reference_year,
        } => {
            let tuning = TuningArgs {
                reference_year: *reference_year,
                ..TuningArgs::default()
            };
            let config = load_config(config_path, &tuning)?;
            commands::add::run(input, building, *month, *energy, &config, cli.json)
        }
        Commands::Summary { input } => commands::summary::run(input, cli.json),
    }
}
