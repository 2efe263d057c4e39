//! CLI error type.

use bathyquery::config::ConfigError;
use bathyquery::import::ImportError;
use bathyquery::logging::LoggingError;
use bathyquery::scheduler::SchedulerError;
use thiserror::Error;

/// Errors surfaced by CLI commands.
///
/// `main` prints the error once, prefixed with `Error: `, and exits with
/// status 1.
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid arguments or configuration values.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Reading or writing the configuration file failed.
    #[error(transparent)]
    ConfigFile(#[from] ConfigError),

    /// The logging subscriber could not be installed.
    #[error("Failed to initialize logging: {0}")]
    Logging(#[from] LoggingError),

    /// The survey file could not be read.
    #[error("Failed to import survey: {0}")]
    Import(#[from] ImportError),

    /// The resolution run failed as a whole.
    #[error("batch query failed: {0}")]
    Query(String),

    /// Writing results to stdout failed.
    #[error("Failed to write output: {0}")]
    Output(String),
}

impl From<SchedulerError> for CliError {
    fn from(e: SchedulerError) -> Self {
        CliError::Query(e.to_string())
    }
}
