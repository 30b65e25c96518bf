//! Agent resource types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Port an agent container listens on when its deployment leaves it unset.
pub const DEFAULT_AGENT_PORT: u16 = 8080;

/// Container deployment of an agent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentDeployment {
    #[serde(default)]
    pub image: String,
    /// Declared container port; `0` means [`DEFAULT_AGENT_PORT`].
    #[serde(default)]
    pub port: u16,
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

impl AgentDeployment {
    /// The port the agent actually listens on.
    pub const fn effective_port(&self) -> u16 {
        if self.port == 0 {
            DEFAULT_AGENT_PORT
        } else {
            self.port
        }
    }
}

/// An agent implementing the A2A protocol, always run as a local container
/// behind a gateway route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    pub name: String,
    pub deployment: AgentDeployment,
}

impl Agent {
    pub fn new(name: impl Into<String>, image: impl Into<String>, port: u16) -> Self {
        Self {
            name: name.into(),
            deployment: AgentDeployment {
                image: image.into(),
                port,
                env: BTreeMap::new(),
            },
        }
    }

    /// Add an environment variable.
    #[must_use]
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.deployment.env.insert(key.into(), value.into());
        self
    }

    /// Host the gateway dials for this agent, `<name>:<port>`.
    pub fn gateway_host(&self) -> String {
        format!("{}:{}", self.name, self.deployment.effective_port())
    }
}
