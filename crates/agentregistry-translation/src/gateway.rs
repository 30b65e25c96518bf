//! Gateway config compiler.
//!
//! Emits a single bind/listener pair. If there are MCP servers, the listener
//! carries one `mcp_route` first, multiplexing every server as a target;
//! agent routes follow, sorted by agent name. The ordering is part of the
//! output contract: identical input must reproduce identical files.

use agentregistry_core::artifacts::{
    A2aPolicy, Bind, GatewayConfig, Listener, MCP_ROUTE_NAME, McpBackend, McpTarget,
    McpTargetSpec, Route, RouteBackend, RoutePolicies, SseTarget, StdioTarget, agent_route_name,
};
use agentregistry_core::{Agent, McpServer, McpServerKind, TransportType, TranslationError};

/// Compile the gateway routing config for `servers` and `agents`.
pub fn compile_gateway_config(
    servers: &[McpServer],
    agents: &[Agent],
    gateway_port: u16,
) -> Result<GatewayConfig, TranslationError> {
    if gateway_port == 0 {
        return Err(TranslationError::InvalidGatewayPort);
    }

    let mut routes = Vec::with_capacity(agents.len() + 1);

    if !servers.is_empty() {
        routes.push(mcp_route(servers)?);
    }

    let mut sorted_agents: Vec<&Agent> = agents.iter().collect();
    sorted_agents.sort_by(|a, b| a.name.cmp(&b.name));
    routes.extend(sorted_agents.into_iter().map(agent_route));

    tracing::debug!(
        gateway_port,
        route_count = routes.len(),
        "Compiled gateway config"
    );

    Ok(GatewayConfig {
        binds: vec![Bind {
            port: gateway_port,
            listeners: vec![Listener { routes }],
        }],
    })
}

/// One route, one backend, one target per server (sorted by server name).
fn mcp_route(servers: &[McpServer]) -> Result<Route, TranslationError> {
    let mut targets = servers
        .iter()
        .map(mcp_target)
        .collect::<Result<Vec<_>, _>>()?;
    targets.sort_by(|a, b| a.name.cmp(&b.name));

    Ok(Route {
        route_name: MCP_ROUTE_NAME.to_string(),
        backends: vec![RouteBackend {
            host: None,
            mcp: Some(McpBackend { targets }),
        }],
        policies: None,
    })
}

fn mcp_target(server: &McpServer) -> Result<McpTarget, TranslationError> {
    let spec = match &server.kind {
        McpServerKind::Local(local) => match &local.transport_type {
            TransportType::Stdio => McpTargetSpec::Stdio(StdioTarget {
                cmd: local.deployment.cmd.clone(),
                args: local.deployment.args.clone(),
                env: local.deployment.env.clone(),
            }),
            TransportType::Http => {
                let http = local
                    .http
                    .as_ref()
                    .filter(|http| http.port != 0)
                    .ok_or_else(|| TranslationError::HttpPortRequired {
                        server: server.name.clone(),
                    })?;
                // Reached over the compose network by service name.
                McpTargetSpec::Sse(SseTarget {
                    host: server.name.clone(),
                    port: http.port,
                    path: http.path.clone(),
                })
            }
            TransportType::Unsupported(transport) => {
                return Err(TranslationError::UnsupportedTransport {
                    server: server.name.clone(),
                    transport: transport.clone(),
                });
            }
        },
        McpServerKind::Remote(remote) => McpTargetSpec::Sse(SseTarget {
            host: remote.host.clone(),
            port: remote.port,
            path: remote.path.clone(),
        }),
    };

    Ok(McpTarget {
        name: server.name.clone(),
        spec,
    })
}

fn agent_route(agent: &Agent) -> Route {
    Route {
        route_name: agent_route_name(&agent.name),
        backends: vec![RouteBackend {
            host: Some(agent.gateway_host()),
            mcp: None,
        }],
        policies: Some(RoutePolicies {
            a2a: Some(A2aPolicy {}),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentregistry_core::{LocalMcpServer, McpServerDeployment};
    use std::collections::BTreeMap;

    fn stdio_server(name: &str) -> McpServer {
        McpServer::local_stdio(
            name,
            McpServerDeployment {
                image: String::new(),
                cmd: "npx".to_string(),
                args: vec!["-y".to_string(), "@test/server".to_string()],
                env: BTreeMap::from([("VAR".to_string(), "value".to_string())]),
            },
        )
    }

    fn local_server(name: &str, transport_type: TransportType) -> McpServer {
        McpServer {
            name: name.to_string(),
            kind: McpServerKind::Local(LocalMcpServer {
                deployment: McpServerDeployment {
                    image: "test:latest".to_string(),
                    cmd: "server".to_string(),
                    ..Default::default()
                },
                transport_type,
                http: None,
            }),
        }
    }

    #[test]
    fn test_zero_gateway_port_rejected() {
        assert_eq!(
            compile_gateway_config(&[], &[], 0),
            Err(TranslationError::InvalidGatewayPort)
        );
    }

    #[test]
    fn test_empty_state_has_no_routes() {
        let config = compile_gateway_config(&[], &[], 8080).unwrap();
        assert_eq!(config.binds.len(), 1);
        assert_eq!(config.binds[0].port, 8080);
        assert_eq!(config.binds[0].listeners.len(), 1);
        assert!(config.routes().is_empty());
    }

    #[test]
    fn test_remote_server_only() {
        let servers = vec![McpServer::remote(
            "remote-server",
            "example.com",
            443,
            "/api/mcp",
        )];
        let config = compile_gateway_config(&servers, &[], 8080).unwrap();

        let routes = config.routes();
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].route_name, MCP_ROUTE_NAME);
        assert_eq!(routes[0].backends.len(), 1);

        let targets = &routes[0].backends[0].mcp.as_ref().unwrap().targets;
        assert_eq!(targets.len(), 1);
        let sse = targets[0].sse().expect("remote server is an SSE target");
        assert_eq!(sse.address(), "example.com:443/api/mcp");
    }

    #[test]
    fn test_stdio_server_only() {
        let config = compile_gateway_config(&[stdio_server("stdio-server")], &[], 8080).unwrap();
        let target = &config.routes()[0].backends[0].mcp.as_ref().unwrap().targets[0];
        let stdio = target.stdio().expect("expected stdio target");
        assert_eq!(stdio.cmd, "npx");
        assert_eq!(stdio.args, vec!["-y", "@test/server"]);
        assert_eq!(stdio.env["VAR"], "value");
    }

    #[test]
    fn test_http_server_targets_service_name() {
        let server = McpServer::local_http(
            "http-server",
            McpServerDeployment {
                image: "test:latest".to_string(),
                cmd: "server".to_string(),
                ..Default::default()
            },
            3000,
            "/mcp",
        );
        let config = compile_gateway_config(&[server], &[], 8080).unwrap();
        let target = &config.routes()[0].backends[0].mcp.as_ref().unwrap().targets[0];
        let sse = target.sse().expect("expected SSE target for HTTP transport");
        assert_eq!(sse.host, "http-server");
        assert_eq!(sse.port, 3000);
        assert_eq!(sse.address(), "http-server:3000/mcp");
    }

    #[test]
    fn test_http_transport_without_port() {
        let err = compile_gateway_config(
            &[local_server("http-server-no-port", TransportType::Http)],
            &[],
            8080,
        )
        .unwrap_err();
        assert!(
            err.to_string()
                .contains("HTTP transport requires a target port")
        );
    }

    #[test]
    fn test_unsupported_transport() {
        let err = compile_gateway_config(
            &[local_server("invalid-transport", TransportType::from("unknown"))],
            &[],
            8080,
        )
        .unwrap_err();
        assert!(err.to_string().contains("unsupported transport type"));
    }

    #[test]
    fn test_agent_only() {
        let agents = vec![Agent::new("my-agent", "agent:v1", 8080)];
        let config = compile_gateway_config(&[], &agents, 8080).unwrap();

        let routes = config.routes();
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].route_name, "my-agent_route");
        assert_eq!(routes[0].backends[0].host.as_deref(), Some("my-agent:8080"));
        assert!(
            routes[0]
                .policies
                .as_ref()
                .and_then(|p| p.a2a.as_ref())
                .is_some()
        );
    }

    #[test]
    fn test_mcp_route_first_then_sorted_agents() {
        let servers = vec![McpServer::remote("server-a", "example.com", 443, "/api")];
        let agents = vec![
            Agent::new("agent-b", "agent:v1", 8080),
            Agent::new("agent-a", "agent:v2", 8081),
        ];
        let config = compile_gateway_config(&servers, &agents, 8080).unwrap();

        let names: Vec<&str> = config
            .routes()
            .iter()
            .map(|r| r.route_name.as_str())
            .collect();
        assert_eq!(names, vec!["mcp_route", "agent-a_route", "agent-b_route"]);
    }

    #[test]
    fn test_targets_sorted_by_server_name() {
        let servers = vec![stdio_server("zeta"), stdio_server("alpha")];
        let config = compile_gateway_config(&servers, &[], 8080).unwrap();
        let targets = &config.routes()[0].backends[0].mcp.as_ref().unwrap().targets;
        let names: Vec<&str> = targets.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
    }
}
