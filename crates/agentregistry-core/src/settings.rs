//! Runtime settings and validation.
//!
//! All fields are optional so partial configuration (flags, env, defaults)
//! can be layered; the `effective_*` accessors apply the defaults.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::paths::{PathError, default_runtime_dir};

/// Default host port the gateway listens on.
pub const DEFAULT_GATEWAY_PORT: u16 = 18080;

/// Default compose project name.
pub const DEFAULT_PROJECT_NAME: &str = "agentregistry_runtime";

/// Default gateway container image.
pub const DEFAULT_GATEWAY_IMAGE: &str = "ghcr.io/agentgateway/agentgateway:latest";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RuntimeSettings {
    /// Working directory holding the compose and gateway files.
    pub runtime_dir: Option<PathBuf>,

    /// Host port the gateway binds and publishes.
    pub gateway_port: Option<u16>,

    /// Compose project name.
    pub project_name: Option<String>,

    /// Gateway container image.
    pub gateway_image: Option<String>,
}

impl RuntimeSettings {
    pub fn with_defaults() -> Self {
        Self {
            runtime_dir: None,
            gateway_port: Some(DEFAULT_GATEWAY_PORT),
            project_name: Some(DEFAULT_PROJECT_NAME.to_string()),
            gateway_image: Some(DEFAULT_GATEWAY_IMAGE.to_string()),
        }
    }

    #[must_use]
    pub fn with_runtime_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.runtime_dir = Some(dir.into());
        self
    }

    #[must_use]
    pub const fn with_gateway_port(mut self, port: u16) -> Self {
        self.gateway_port = Some(port);
        self
    }

    #[must_use]
    pub fn with_project_name(mut self, name: impl Into<String>) -> Self {
        self.project_name = Some(name.into());
        self
    }

    /// Runtime directory, falling back to the platform data directory.
    pub fn effective_runtime_dir(&self) -> Result<PathBuf, PathError> {
        match &self.runtime_dir {
            Some(dir) if dir.as_os_str().is_empty() => Err(PathError::EmptyPath),
            Some(dir) => Ok(dir.clone()),
            None => default_runtime_dir(),
        }
    }

    pub const fn effective_gateway_port(&self) -> u16 {
        match self.gateway_port {
            Some(port) => port,
            None => DEFAULT_GATEWAY_PORT,
        }
    }

    pub fn effective_project_name(&self) -> &str {
        self.project_name.as_deref().unwrap_or(DEFAULT_PROJECT_NAME)
    }

    pub fn effective_gateway_image(&self) -> &str {
        self.gateway_image.as_deref().unwrap_or(DEFAULT_GATEWAY_IMAGE)
    }
}

/// Settings validation error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("Gateway port must be non-zero")]
    InvalidGatewayPort,

    #[error(
        "Invalid project name {0:?}: use lowercase letters, digits, '-' or '_', starting with a letter or digit"
    )]
    InvalidProjectName(String),

    #[error("Runtime directory cannot be empty")]
    EmptyRuntimeDir,

    #[error("Gateway image cannot be empty")]
    EmptyGatewayImage,
}

/// Whether `name` is accepted by compose as a project name.
pub fn is_valid_project_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
}

/// Validate settings values.
pub fn validate_settings(settings: &RuntimeSettings) -> Result<(), SettingsError> {
    if settings.gateway_port == Some(0) {
        return Err(SettingsError::InvalidGatewayPort);
    }

    if let Some(name) = &settings.project_name {
        if !is_valid_project_name(name) {
            return Err(SettingsError::InvalidProjectName(name.clone()));
        }
    }

    if settings
        .runtime_dir
        .as_ref()
        .is_some_and(|dir| dir.as_os_str().is_empty())
    {
        return Err(SettingsError::EmptyRuntimeDir);
    }

    if settings
        .gateway_image
        .as_ref()
        .is_some_and(|image| image.trim().is_empty())
    {
        return Err(SettingsError::EmptyGatewayImage);
    }

    Ok(())
}
