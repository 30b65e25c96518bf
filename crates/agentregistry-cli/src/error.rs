//! CLI error type and its exit codes.

use agentregistry_core::{PathError, SettingsError};
use agentregistry_runtime::ReconcileError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid arguments or input files.
    #[error("Invalid input: {0}")]
    Input(String),

    /// IO error (file not found, permission denied, etc.).
    #[error("IO error: {0}")]
    Io(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The container engine failed or could not be reached.
    #[error("Container engine error: {0}")]
    Engine(String),

    /// Ctrl-C or another cancellation stopped the command.
    #[error("{0}")]
    Cancelled(String),
}

impl CliError {
    /// Map error to appropriate exit code.
    ///
    /// Exit codes follow sysexits.h where one fits.
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Input(_) => 65,    // EX_DATAERR
            Self::Io(_) => 74,       // EX_IOERR
            Self::Config(_) => 78,   // EX_CONFIG
            Self::Engine(_) => 69,   // EX_UNAVAILABLE
            Self::Cancelled(_) => 130,
        }
    }
}

impl From<ReconcileError> for CliError {
    fn from(err: ReconcileError) -> Self {
        match err {
            ReconcileError::Conversion(_) | ReconcileError::Translation(_) => {
                Self::Input(err.to_string())
            }
            ReconcileError::Persist(_) => Self::Io(err.to_string()),
            ReconcileError::Engine(_) => Self::Engine(err.to_string()),
            ReconcileError::Cancelled { .. } => Self::Cancelled(err.to_string()),
        }
    }
}

impl From<SettingsError> for CliError {
    fn from(err: SettingsError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<PathError> for CliError {
    fn from(err: PathError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
