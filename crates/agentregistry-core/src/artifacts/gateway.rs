//! Gateway routing configuration: binds, listeners, routes and backends.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Name of the single route carrying every MCP server.
pub const MCP_ROUTE_NAME: &str = "mcp_route";

/// Route name for an agent, `<agent-name>_route`.
pub fn agent_route_name(agent_name: &str) -> String {
    format!("{agent_name}_route")
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayConfig {
    pub binds: Vec<Bind>,
}

impl GatewayConfig {
    /// Routes of the first listener of the first bind, in emitted order.
    pub fn routes(&self) -> &[Route] {
        self.binds
            .first()
            .and_then(|bind| bind.listeners.first())
            .map(|listener| listener.routes.as_slice())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bind {
    pub port: u16,
    pub listeners: Vec<Listener>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listener {
    pub routes: Vec<Route>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    pub route_name: String,
    pub backends: Vec<RouteBackend>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policies: Option<RoutePolicies>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteBackend {
    /// `<host>:<port>` for plain HTTP backends.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mcp: Option<McpBackend>,
}

/// MCP multiplexing backend: one target per MCP server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct McpBackend {
    pub targets: Vec<McpTarget>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct McpTarget {
    /// Name of the MCP server behind this target.
    pub name: String,
    #[serde(flatten)]
    pub spec: McpTargetSpec,
}

impl McpTarget {
    pub const fn stdio(&self) -> Option<&StdioTarget> {
        match &self.spec {
            McpTargetSpec::Stdio(target) => Some(target),
            McpTargetSpec::Sse(_) => None,
        }
    }

    pub const fn sse(&self) -> Option<&SseTarget> {
        match &self.spec {
            McpTargetSpec::Sse(target) => Some(target),
            McpTargetSpec::Stdio(_) => None,
        }
    }
}

/// How the gateway reaches a target. Serialized as a `stdio:` or `sse:` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum McpTargetSpec {
    Stdio(StdioTarget),
    Sse(SseTarget),
}

/// The gateway spawns `cmd args...` itself and talks over its pipes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StdioTarget {
    pub cmd: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,
}

/// The gateway dials `host:port` + `path` over HTTP.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SseTarget {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub path: String,
}

impl SseTarget {
    /// `<host>:<port><path>`.
    pub fn address(&self) -> String {
        format!("{}:{}{}", self.host, self.port, self.path)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutePolicies {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub a2a: Option<A2aPolicy>,
}

/// Marks a route as carrying agent-to-agent traffic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct A2aPolicy {}
