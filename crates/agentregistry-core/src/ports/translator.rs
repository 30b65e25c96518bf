//! Translation port: compile a desired state into a runtime config.

use std::fmt;

use thiserror::Error;

use crate::artifacts::{RuntimeConfig, RuntimeTarget};
use crate::domain::DesiredState;

/// Which kind of resource an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    McpServer,
    Agent,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::McpServer => f.write_str("MCP server"),
            Self::Agent => f.write_str("agent"),
        }
    }
}

/// Validation failures raised while compiling a desired state.
///
/// All of these depend only on the caller's input; none is worth retrying.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranslationError {
    #[error("duplicate MCPServer name: {0}")]
    DuplicateMcpServer(String),

    /// Also raised when an agent reuses an MCP server's name.
    #[error("duplicate Agent name: {0}")]
    DuplicateAgent(String),

    /// The name is taken by the gateway's own compose service.
    #[error("{kind} {name}: name is reserved for the gateway service")]
    ReservedName { kind: ResourceKind, name: String },

    #[error("agent gateway port must be non-zero")]
    InvalidGatewayPort,

    #[error("MCP server {server}: HTTP transport requires a target port")]
    HttpPortRequired { server: String },

    #[error("MCP server {server}: unsupported transport type: {transport}")]
    UnsupportedTransport { server: String, transport: String },

    #[error("{kind} {name}: missing image")]
    MissingImage { kind: ResourceKind, name: String },
}

/// Compiles a [`DesiredState`] into the artifacts of one runtime target.
///
/// Implementations are pure: no I/O, no shared mutable state. A translator can
/// be called concurrently as long as each call has its own desired state.
pub trait RuntimeTranslator: Send + Sync {
    /// The target environment this translator compiles for.
    fn target(&self) -> RuntimeTarget;

    /// Compile `desired` into a fresh [`RuntimeConfig`]. On error nothing is
    /// returned; there is no partial result.
    fn translate_runtime_config(
        &self,
        desired: &DesiredState,
    ) -> Result<RuntimeConfig, TranslationError>;
}
