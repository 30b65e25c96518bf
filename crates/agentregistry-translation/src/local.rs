//! Translator for the local (single-host compose) runtime.

use std::path::{Path, PathBuf};

use agentregistry_core::{
    DEFAULT_GATEWAY_IMAGE, DEFAULT_PROJECT_NAME, DesiredState, LocalRuntimeConfig, PathError,
    RuntimeConfig, RuntimeSettings, RuntimeTarget, RuntimeTranslator, TranslationError,
};

use crate::compose::{ComposeOptions, compile_compose_project};
use crate::gateway::compile_gateway_config;
use crate::validate::validate_unique_names;

/// Compiles a desired state into a compose project and a gateway config.
#[derive(Debug, Clone)]
pub struct LocalTranslator {
    compose_working_dir: PathBuf,
    gateway_port: u16,
    project_name: String,
    gateway_image: String,
}

impl LocalTranslator {
    /// Create a translator with the default project name and gateway image.
    pub fn new(compose_working_dir: impl Into<PathBuf>, gateway_port: u16) -> Self {
        Self {
            compose_working_dir: compose_working_dir.into(),
            gateway_port,
            project_name: DEFAULT_PROJECT_NAME.to_string(),
            gateway_image: DEFAULT_GATEWAY_IMAGE.to_string(),
        }
    }

    /// Build from settings, resolving the runtime directory.
    pub fn from_settings(settings: &RuntimeSettings) -> Result<Self, PathError> {
        Ok(Self {
            compose_working_dir: settings.effective_runtime_dir()?,
            gateway_port: settings.effective_gateway_port(),
            project_name: settings.effective_project_name().to_string(),
            gateway_image: settings.effective_gateway_image().to_string(),
        })
    }

    #[must_use]
    pub fn with_project_name(mut self, project_name: impl Into<String>) -> Self {
        self.project_name = project_name.into();
        self
    }

    #[must_use]
    pub fn with_gateway_image(mut self, gateway_image: impl Into<String>) -> Self {
        self.gateway_image = gateway_image.into();
        self
    }

    pub fn compose_working_dir(&self) -> &Path {
        &self.compose_working_dir
    }

    pub const fn gateway_port(&self) -> u16 {
        self.gateway_port
    }

    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    fn compose_options(&self) -> ComposeOptions {
        ComposeOptions {
            working_dir: self.compose_working_dir.to_string_lossy().into_owned(),
            gateway_port: self.gateway_port,
            project_name: self.project_name.clone(),
            gateway_image: self.gateway_image.clone(),
        }
    }
}

impl RuntimeTranslator for LocalTranslator {
    fn target(&self) -> RuntimeTarget {
        RuntimeTarget::Local
    }

    fn translate_runtime_config(
        &self,
        desired: &DesiredState,
    ) -> Result<RuntimeConfig, TranslationError> {
        validate_unique_names(desired)?;

        let agent_gateway =
            compile_gateway_config(&desired.mcp_servers, &desired.agents, self.gateway_port)?;
        let docker_compose = compile_compose_project(
            &desired.mcp_servers,
            &desired.agents,
            &self.compose_options(),
        )?;

        Ok(RuntimeConfig::Local(LocalRuntimeConfig {
            docker_compose,
            agent_gateway,
        }))
    }
}
