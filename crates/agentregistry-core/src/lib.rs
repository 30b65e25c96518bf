//! Core types for the agentregistry runtime.
//!
//! - [`domain`] - MCP servers, agents and the desired state
//! - [`artifacts`] - compose project, gateway config and the runtime config pairing them
//! - [`ports`] - translator, container engine and event emitter traits
//! - [`settings`] / [`paths`] - runtime configuration and file locations

#![deny(unused_crate_dependencies)]

pub mod artifacts;
pub mod domain;
pub mod events;
pub mod paths;
pub mod ports;
pub mod settings;

// Re-export commonly used types for convenience
pub use artifacts::{
    ComposeProject, GatewayConfig, LocalRuntimeConfig, RuntimeConfig, RuntimeTarget,
    ServiceConfig,
};
pub use domain::{
    Agent, AgentDeployment, DEFAULT_AGENT_PORT, DesiredState, HttpTransport, LocalMcpServer,
    McpServer, McpServerDeployment, McpServerKind, RemoteMcpServer, TransportType,
};
pub use events::{ReconcilePhase, RuntimeEvent};
pub use paths::{
    COMPOSE_FILE_NAME, GATEWAY_FILE_NAME, PathError, compose_file_path, default_runtime_dir,
    gateway_file_path,
};
pub use ports::{
    ComposeLocation, ContainerEngine, EngineError, NoopEmitter, ResourceKind, RuntimeEventEmitter,
    RuntimeTranslator, TranslationError,
};
pub use settings::{
    DEFAULT_GATEWAY_IMAGE, DEFAULT_GATEWAY_PORT, DEFAULT_PROJECT_NAME, RuntimeSettings,
    SettingsError, validate_settings,
};
