//! Compiled runtime configuration, tagged by target environment.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{ComposeProject, GatewayConfig};

/// Environment a desired state is compiled for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeTarget {
    /// Compose project plus gateway config on a single host.
    #[default]
    Local,
}

impl fmt::Display for RuntimeTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => f.write_str("local"),
        }
    }
}

/// Artifacts for the local runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalRuntimeConfig {
    pub docker_compose: ComposeProject,
    pub agent_gateway: GatewayConfig,
}

/// Output of one translation. Produced fresh every call and replaced
/// wholesale, never patched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RuntimeConfig {
    Local(LocalRuntimeConfig),
}

impl RuntimeConfig {
    pub const fn target(&self) -> RuntimeTarget {
        match self {
            Self::Local(_) => RuntimeTarget::Local,
        }
    }

    pub const fn as_local(&self) -> Option<&LocalRuntimeConfig> {
        match self {
            Self::Local(local) => Some(local),
        }
    }
}
