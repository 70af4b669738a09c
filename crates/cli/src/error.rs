//! Error types for CLI operations.

use std::path::{Path, PathBuf};

use contracts::ContractError;
use dispatcher::DispatcherError;
use ingestion::IngestionError;
use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration could not be loaded or failed validation
    #[error("Failed to load configuration from {path:?}: {source}")]
    ConfigLoad {
        path: PathBuf,
        #[source]
        source: ContractError,
    },

    /// Configuration became invalid after CLI overrides
    #[error("Configuration validation failed: {0}")]
    ConfigValidation(#[source] ContractError),

    /// Observer coordinate rejected
    #[error("Invalid observer: {0}")]
    InvalidObserver(#[source] ContractError),

    /// `--at` could not be parsed
    #[error("Invalid reference time '{input}', expected \"YYYY-MM-DD HH:MM[:SS]\"")]
    InvalidReferenceTime { input: String },

    /// Timetable could not be fetched
    #[error("Failed to fetch timetable from {provider}: {source}")]
    TimetableFetch {
        provider: String,
        #[source]
        source: ContractError,
    },

    /// Timetable yielded no usable prayer
    #[error("No prayer data available")]
    NoPrayerData,

    /// Sensor set-up error
    #[error(transparent)]
    Ingestion(#[from] IngestionError),

    /// Sink set-up error
    #[error(transparent)]
    Dispatcher(#[from] DispatcherError),
}

impl CliError {
    pub fn config_load(path: &Path, source: ContractError) -> Self {
        Self::ConfigLoad {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn invalid_reference_time(input: impl Into<String>) -> Self {
        Self::InvalidReferenceTime {
            input: input.into(),
        }
    }

    pub fn timetable_fetch(provider: impl Into<String>, source: ContractError) -> Self {
        Self::TimetableFetch {
            provider: provider.into(),
            source,
        }
    }
}

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
