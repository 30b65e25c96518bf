//! MCP server resource types.
//!
//! An MCP server is either run locally as a container (talking stdio or
//! HTTP) or reached remotely over HTTP. The variant is carried by
//! [`McpServerKind`] so a local server can never be missing its deployment
//! and a remote server can never carry one.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Transport a local MCP server speaks.
///
/// Anything other than `stdio` or `http` is kept as [`TransportType::Unsupported`]
/// so that compilation can reject it with the offending value instead of
/// failing somewhere inside deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TransportType {
    /// Tool calls over the process stdin/stdout pipe.
    Stdio,
    /// Tool calls over HTTP (streamable HTTP or SSE).
    Http,
    /// A transport this runtime does not know how to route.
    Unsupported(String),
}

impl TransportType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Stdio => "stdio",
            Self::Http => "http",
            Self::Unsupported(other) => other,
        }
    }
}

impl From<String> for TransportType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "stdio" => Self::Stdio,
            "http" => Self::Http,
            _ => Self::Unsupported(value),
        }
    }
}

impl From<&str> for TransportType {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<TransportType> for String {
    fn from(value: TransportType) -> Self {
        match value {
            TransportType::Unsupported(other) => other,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for TransportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Container deployment of a local MCP server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct McpServerDeployment {
    /// Container image. Required for a compose service to be produced.
    #[serde(default)]
    pub image: String,
    /// Executable to run (e.g. `npx`). May be empty when the image entrypoint
    /// is the server.
    #[serde(default)]
    pub cmd: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

impl McpServerDeployment {
    /// Full command line, `cmd` followed by `args`.
    ///
    /// An empty `cmd` is skipped so an image-entrypoint server only passes its
    /// arguments.
    pub fn command_line(&self) -> Vec<String> {
        let mut command = Vec::with_capacity(self.args.len() + 1);
        if !self.cmd.is_empty() {
            command.push(self.cmd.clone());
        }
        command.extend(self.args.iter().cloned());
        command
    }
}

/// Where the gateway reaches an HTTP-speaking local server inside its container.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpTransport {
    pub port: u16,
    #[serde(default)]
    pub path: String,
}

/// A locally deployed MCP server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalMcpServer {
    pub deployment: McpServerDeployment,
    pub transport_type: TransportType,
    /// Required when `transport_type` is [`TransportType::Http`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http: Option<HttpTransport>,
}

/// A remote MCP server. No container is created; the gateway dials it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteMcpServer {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub path: String,
}

/// Local or remote realisation of an MCP server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum McpServerKind {
    Local(LocalMcpServer),
    Remote(RemoteMcpServer),
}

/// An MCP server in the desired state, identified by its unique `name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct McpServer {
    pub name: String,
    #[serde(flatten)]
    pub kind: McpServerKind,
}

impl McpServer {
    /// Create a local stdio server.
    pub fn local_stdio(name: impl Into<String>, deployment: McpServerDeployment) -> Self {
        Self {
            name: name.into(),
            kind: McpServerKind::Local(LocalMcpServer {
                deployment,
                transport_type: TransportType::Stdio,
                http: None,
            }),
        }
    }

    /// Create a local server that serves MCP over HTTP on `port` at `path`.
    pub fn local_http(
        name: impl Into<String>,
        deployment: McpServerDeployment,
        port: u16,
        path: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind: McpServerKind::Local(LocalMcpServer {
                deployment,
                transport_type: TransportType::Http,
                http: Some(HttpTransport {
                    port,
                    path: path.into(),
                }),
            }),
        }
    }

    /// Create a remote server reached at `host:port` + `path`.
    pub fn remote(
        name: impl Into<String>,
        host: impl Into<String>,
        port: u16,
        path: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind: McpServerKind::Remote(RemoteMcpServer {
                host: host.into(),
                port,
                path: path.into(),
            }),
        }
    }

    pub const fn is_local(&self) -> bool {
        matches!(self.kind, McpServerKind::Local(_))
    }
}
