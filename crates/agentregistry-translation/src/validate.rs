//! Cross-cutting validation of a desired state.

use std::collections::HashSet;

use agentregistry_core::{DesiredState, ResourceKind, TranslationError};

use crate::compose::AGENT_GATEWAY_SERVICE;

/// Check that every MCP server and agent name is distinct across both sets
/// and that none takes the gateway's service name.
///
/// Servers are checked first, so an agent reusing a server name is reported
/// as a duplicate agent. The first collision found is returned.
pub fn validate_unique_names(desired: &DesiredState) -> Result<(), TranslationError> {
    let mut seen: HashSet<&str> = HashSet::new();

    for server in &desired.mcp_servers {
        check_reserved(ResourceKind::McpServer, &server.name)?;
        if !seen.insert(server.name.as_str()) {
            return Err(TranslationError::DuplicateMcpServer(server.name.clone()));
        }
    }

    for agent in &desired.agents {
        check_reserved(ResourceKind::Agent, &agent.name)?;
        if !seen.insert(agent.name.as_str()) {
            return Err(TranslationError::DuplicateAgent(agent.name.clone()));
        }
    }

    Ok(())
}

fn check_reserved(kind: ResourceKind, name: &str) -> Result<(), TranslationError> {
    if name == AGENT_GATEWAY_SERVICE {
        return Err(TranslationError::ReservedName {
            kind,
            name: name.to_string(),
        });
    }
    Ok(())
}
