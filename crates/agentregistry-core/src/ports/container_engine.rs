//! Container engine port.
//!
//! The reconciler drives the engine through this trait so the real
//! docker-compose adapter can be swapped for a fake in tests.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;

/// Compose project on disk that the engine operates on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposeLocation {
    /// Directory the engine runs in.
    pub working_dir: PathBuf,
    /// Compose file inside `working_dir`.
    pub compose_file: PathBuf,
    pub project_name: String,
}

impl ComposeLocation {
    pub fn new(
        working_dir: impl Into<PathBuf>,
        compose_file: impl Into<PathBuf>,
        project_name: impl Into<String>,
    ) -> Self {
        Self {
            working_dir: working_dir.into(),
            compose_file: compose_file.into(),
            project_name: project_name.into(),
        }
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }
}

/// Errors from the container engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The engine could not be invoked at all (binary missing, daemon down).
    #[error("container engine unavailable: {0}")]
    Unavailable(String),

    /// The engine ran and rejected the operation.
    #[error("container engine {operation} failed (exit code {code:?}): {diagnostic}")]
    CommandFailed {
        operation: &'static str,
        code: Option<i32>,
        diagnostic: String,
    },

    #[error("unexpected container engine output: {0}")]
    InvalidOutput(String),
}

/// Control surface of a compose-compatible container engine.
#[async_trait]
pub trait ContainerEngine: Send + Sync {
    /// Converge running services to the compose file: start what is new or
    /// changed, remove what is gone, leave unchanged services alone.
    ///
    /// This may block for seconds. Dropping the future must stop waiting on
    /// the engine promptly.
    async fn up(&self, location: &ComposeLocation) -> Result<(), EngineError>;

    /// Stop and remove every service of the project.
    async fn down(&self, location: &ComposeLocation) -> Result<(), EngineError>;

    /// Names of services currently running, sorted.
    async fn running_services(&self, location: &ComposeLocation)
    -> Result<Vec<String>, EngineError>;
}
