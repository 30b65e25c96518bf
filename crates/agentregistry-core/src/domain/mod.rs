//! Resource model: MCP servers, agents and the desired state that groups them.
//!
//! These types are owned by the caller for the duration of one translation
//! and carry no infrastructure concerns.

mod agent;
mod desired_state;
mod mcp;

pub use agent::{Agent, AgentDeployment, DEFAULT_AGENT_PORT};
pub use desired_state::DesiredState;
pub use mcp::{
    HttpTransport, LocalMcpServer, McpServer, McpServerDeployment, McpServerKind,
    RemoteMcpServer, TransportType,
};
