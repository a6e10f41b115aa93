//! Error types for energy-cli

use building_energy::EnergyError;
use std::path::PathBuf;
use std::process::ExitCode;
use thiserror::Error;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Input file not found
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// Bad row or field in an input table
    #[error("{0}")]
    InvalidData(String),

    /// Category unknown to the model
    #[error("{0}")]
    UnknownCategory(String),

    /// Nothing to train on
    #[error("{0}")]
    EmptyDataset(String),

    /// Bad option or configuration value
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Any other library failure
    #[error("{0}")]
    Energy(String),
}

impl CliError {
    /// Numeric status reported to the shell
    pub fn code(&self) -> u8 {
        match self {
            Self::Energy(_) => 1,
            Self::InvalidArgument(_) => 2,
            Self::FileNotFound(_) => 3,
            Self::InvalidData(_) => 4,
            Self::UnknownCategory(_) => 5,
            Self::EmptyDataset(_) => 6,
            Self::Io(_) => 7,
        }
    }

    /// Get exit code for this error
    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.code())
    }
}

impl From<EnergyError> for CliError {
    fn from(e: EnergyError) -> Self {
        match e {
            EnergyError::MissingFile { path } => Self::FileNotFound(path),
            EnergyError::MalformedRecord { .. } => Self::InvalidData(e.to_string()),
            EnergyError::UnseenCategory { .. } => Self::UnknownCategory(e.to_string()),
            EnergyError::EmptyDataset { .. } => Self::EmptyDataset(e.to_string()),
            EnergyError::InvalidHyperparameter { .. } => Self::InvalidArgument(e.to_string()),
            EnergyError::Io(io) => Self::Io(io),
            other => Self::Energy(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::Energy(format!("JSON output failed: {e}"))
    }
}
