//! Artifacts produced by translation: the compose project, the gateway
//! routing config, and the [`RuntimeConfig`] that pairs them.

mod compose;
mod gateway;
mod runtime_config;

pub use compose::{ComposeProject, ServiceConfig, ServicePort, ServiceVolume, VolumeType};
pub use gateway::{
    A2aPolicy, Bind, GatewayConfig, Listener, MCP_ROUTE_NAME, McpBackend, McpTarget,
    McpTargetSpec, Route, RouteBackend, RoutePolicies, SseTarget, StdioTarget, agent_route_name,
};
pub use runtime_config::{LocalRuntimeConfig, RuntimeConfig, RuntimeTarget};
