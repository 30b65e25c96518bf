//! Compose project compiler.
//!
//! One fixed `agent_gateway` service, plus one service per local MCP server
//! and per agent. Remote MCP servers are dialed by the gateway directly and
//! produce no service.

use std::collections::BTreeMap;

use agentregistry_core::artifacts::{ServicePort, ServiceVolume};
use agentregistry_core::{
    Agent, ComposeProject, GATEWAY_FILE_NAME, McpServer, McpServerKind, ResourceKind,
    ServiceConfig, TranslationError,
};

/// Service name of the gateway.
pub const AGENT_GATEWAY_SERVICE: &str = "agent_gateway";

/// Where the runtime working directory is mounted in the gateway container.
pub const GATEWAY_CONFIG_MOUNT: &str = "/config";

/// Fixed inputs of the compose compiler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposeOptions {
    /// Host directory holding the gateway config; mounted read-only.
    pub working_dir: String,
    pub gateway_port: u16,
    pub project_name: String,
    pub gateway_image: String,
}

/// Compile the compose project for `servers` and `agents`.
pub fn compile_compose_project(
    servers: &[McpServer],
    agents: &[Agent],
    options: &ComposeOptions,
) -> Result<ComposeProject, TranslationError> {
    let mut project = ComposeProject::new(&options.project_name);

    project
        .services
        .insert(AGENT_GATEWAY_SERVICE.to_string(), gateway_service(options)?);

    for server in servers {
        if let Some(service) = mcp_server_service(server)? {
            project.services.insert(server.name.clone(), service);
        }
    }

    for agent in agents {
        project
            .services
            .insert(agent.name.clone(), agent_service(agent)?);
    }

    tracing::debug!(
        project = %project.name,
        service_count = project.services.len(),
        "Compiled compose project"
    );

    Ok(project)
}

fn gateway_service(options: &ComposeOptions) -> Result<ServiceConfig, TranslationError> {
    if options.gateway_port == 0 {
        return Err(TranslationError::InvalidGatewayPort);
    }

    Ok(ServiceConfig {
        image: options.gateway_image.clone(),
        command: vec![
            "-f".to_string(),
            format!("{GATEWAY_CONFIG_MOUNT}/{GATEWAY_FILE_NAME}"),
        ],
        environment: BTreeMap::new(),
        ports: vec![ServicePort::host(options.gateway_port)],
        volumes: vec![ServiceVolume::read_only_bind(
            &options.working_dir,
            GATEWAY_CONFIG_MOUNT,
        )],
    })
}

/// `None` for remote servers.
fn mcp_server_service(server: &McpServer) -> Result<Option<ServiceConfig>, TranslationError> {
    let McpServerKind::Local(local) = &server.kind else {
        return Ok(None);
    };
    let deployment = &local.deployment;

    if deployment.image.is_empty() {
        return Err(TranslationError::MissingImage {
            kind: ResourceKind::McpServer,
            name: server.name.clone(),
        });
    }

    Ok(Some(ServiceConfig {
        image: deployment.image.clone(),
        command: deployment.command_line(),
        environment: deployment.env.clone(),
        ports: Vec::new(),
        volumes: Vec::new(),
    }))
}

fn agent_service(agent: &Agent) -> Result<ServiceConfig, TranslationError> {
    let deployment = &agent.deployment;

    if deployment.image.is_empty() {
        return Err(TranslationError::MissingImage {
            kind: ResourceKind::Agent,
            name: agent.name.clone(),
        });
    }

    Ok(ServiceConfig {
        image: deployment.image.clone(),
        command: Vec::new(),
        environment: deployment.env.clone(),
        ports: vec![ServicePort::container(u32::from(
            deployment.effective_port(),
        ))],
        volumes: Vec::new(),
    })
}
