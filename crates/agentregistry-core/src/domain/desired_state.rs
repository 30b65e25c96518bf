//! The declarative target the runtime converges to.

use serde::{Deserialize, Serialize};

use super::{Agent, McpServer};

/// MCP servers and agents that should currently be running.
///
/// Names across both sequences must be pairwise distinct; that is checked at
/// translation time, not on construction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesiredState {
    #[serde(default)]
    pub mcp_servers: Vec<McpServer>,
    #[serde(default)]
    pub agents: Vec<Agent>,
}

impl DesiredState {
    pub const fn new(mcp_servers: Vec<McpServer>, agents: Vec<Agent>) -> Self {
        Self {
            mcp_servers,
            agents,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.mcp_servers.is_empty() && self.agents.is_empty()
    }
}
