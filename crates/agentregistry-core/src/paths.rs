//! Canonical locations of the runtime working directory and its artifacts.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Compose project file inside the runtime working directory.
pub const COMPOSE_FILE_NAME: &str = "docker-compose.yaml";

/// Gateway routing config inside the runtime working directory.
pub const GATEWAY_FILE_NAME: &str = "agent-gateway.yaml";

#[derive(Debug, Error)]
pub enum PathError {
    /// Could not determine the system data directory.
    #[error("Cannot determine system data directory")]
    NoDataDir,

    /// An empty path was provided.
    #[error("Path cannot be empty")]
    EmptyPath,
}

/// Root for agentregistry data, `<data dir>/agentregistry`.
pub fn data_root() -> Result<PathBuf, PathError> {
    dirs::data_dir()
        .map(|dir| dir.join("agentregistry"))
        .ok_or(PathError::NoDataDir)
}

/// Default runtime working directory, `<data root>/runtime`.
pub fn default_runtime_dir() -> Result<PathBuf, PathError> {
    data_root().map(|root| root.join("runtime"))
}

pub fn compose_file_path(runtime_dir: &Path) -> PathBuf {
    runtime_dir.join(COMPOSE_FILE_NAME)
}

pub fn gateway_file_path(runtime_dir: &Path) -> PathBuf {
    runtime_dir.join(GATEWAY_FILE_NAME)
}
