//! Conversion of registry run-requests into [`McpServer`] resources.
//!
//! Package decoding is a table from registry type (`npm`, `pypi`, `oci`, ...)
//! to a decoder function, populated by [`RegistryTranslator::new`]. Callers may
//! register extra registry types with [`RegistryTranslator::with_decoder`].

use std::collections::BTreeMap;

use agentregistry_core::{McpServer, McpServerDeployment};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use super::manifest::{Package, Remote, ServerJson};

pub const NPM_IMAGE: &str = "node:24-alpine3.21";
pub const PYPI_IMAGE: &str = "ghcr.io/astral-sh/uv:debian";

/// A request to run one registry server locally.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct McpServerRunRequest {
    pub registry_server: ServerJson,
    /// Use `remotes[]` even when packages are available.
    #[serde(default)]
    pub prefer_remote: bool,
    /// Environment values supplied by the caller; these win over manifest
    /// defaults.
    #[serde(default)]
    pub env_values: BTreeMap<String, String>,
}

impl McpServerRunRequest {
    pub fn new(registry_server: ServerJson) -> Self {
        Self {
            registry_server,
            ..Default::default()
        }
    }

    /// Parse a bare `server.json` manifest into a request.
    pub fn from_manifest_json(json: &str) -> Result<Self, ConversionError> {
        let server = serde_json::from_str(json).map_err(ConversionError::InvalidManifest)?;
        Ok(Self::new(server))
    }

    #[must_use]
    pub const fn with_prefer_remote(mut self, prefer_remote: bool) -> Self {
        self.prefer_remote = prefer_remote;
        self
    }

    #[must_use]
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env_values.insert(key.into(), value.into());
        self
    }
}

#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("invalid server manifest: {0}")]
    InvalidManifest(#[source] serde_json::Error),

    #[error("server name {0:?} does not produce a usable service name")]
    InvalidName(String),

    #[error("server {server}: has neither packages nor remotes")]
    NoDeployment { server: String },

    #[error("server {server}: unsupported registry type: {registry_type}")]
    UnsupportedRegistryType {
        server: String,
        registry_type: String,
    },

    #[error("server {server}: unsupported transport type: {transport}")]
    UnsupportedTransport { server: String, transport: String },

    #[error("server {server}: package has no identifier")]
    MissingIdentifier { server: String },

    #[error("server {server}: package {identifier} has no version")]
    MissingVersion { server: String, identifier: String },

    #[error("server {server}: {transport} transport requires a url")]
    MissingTransportUrl { server: String, transport: String },

    #[error("server {server}: invalid url {url:?}: {reason}")]
    InvalidUrl {
        server: String,
        url: String,
        reason: String,
    },

    #[error("server {server}: container image packages cannot use the stdio transport")]
    StdioImagePackage { server: String },

    #[error("server {server}: required environment variable {name} has no value")]
    MissingRequiredEnv { server: String, name: String },
}

/// How a package is launched inside its container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageLaunch {
    pub image: String,
    pub cmd: String,
    pub args: Vec<String>,
    /// The image entrypoint is the server, so it cannot be attached over stdio.
    pub requires_http: bool,
}

/// Decodes one registry type. `version` is already resolved against the
/// server version.
pub type PackageDecoder = fn(server: &str, package: &Package, version: &str)
    -> Result<PackageLaunch, ConversionError>;

/// Converts registry run-requests into [`McpServer`] resources.
#[derive(Debug, Clone)]
pub struct RegistryTranslator {
    decoders: BTreeMap<String, PackageDecoder>,
}

impl Default for RegistryTranslator {
    fn default() -> Self {
        Self::new()
    }
}

impl RegistryTranslator {
    /// Translator with the `npm`, `pypi`, `oci` and `docker` decoders.
    pub fn new() -> Self {
        Self { decoders: BTreeMap::new() }
            .with_decoder("npm", decode_npm)
            .with_decoder("pypi", decode_pypi)
            .with_decoder("oci", decode_image)
            .with_decoder("docker", decode_image)
    }

    #[must_use]
    pub fn with_decoder(mut self, registry_type: impl Into<String>, decoder: PackageDecoder) -> Self {
        self.decoders.insert(registry_type.into(), decoder);
        self
    }

    pub fn registry_types(&self) -> impl Iterator<Item = &str> {
        self.decoders.keys().map(String::as_str)
    }

    /// Convert one run-request. Pure: no I/O and no network lookups.
    pub fn translate_mcp_server(
        &self,
        request: &McpServerRunRequest,
    ) -> Result<McpServer, ConversionError> {
        let manifest = &request.registry_server;
        let name = service_name(&manifest.name)?;

        let use_remote = !manifest.remotes.is_empty()
            && (request.prefer_remote || manifest.packages.is_empty());
        if use_remote {
            return translate_remote(&name, &manifest.remotes[0]);
        }

        let Some(package) = self.select_package(manifest) else {
            return Err(ConversionError::NoDeployment { server: name });
        };
        self.translate_package(&name, manifest, package, &request.env_values)
    }

    /// Convert a batch, failing on the first bad request.
    pub fn translate_all(
        &self,
        requests: &[McpServerRunRequest],
    ) -> Result<Vec<McpServer>, ConversionError> {
        requests
            .iter()
            .map(|request| self.translate_mcp_server(request))
            .collect()
    }

    /// First package with a known registry type, falling back to the first
    /// package so the error names what was offered.
    fn select_package<'a>(&self, manifest: &'a ServerJson) -> Option<&'a Package> {
        manifest
            .packages
            .iter()
            .find(|package| self.decoders.contains_key(&package.registry_type))
            .or_else(|| manifest.packages.first())
    }

    fn translate_package(
        &self,
        name: &str,
        manifest: &ServerJson,
        package: &Package,
        env_values: &BTreeMap<String, String>,
    ) -> Result<McpServer, ConversionError> {
        let decoder = self.decoders.get(&package.registry_type).ok_or_else(|| {
            ConversionError::UnsupportedRegistryType {
                server: name.to_string(),
                registry_type: package.registry_type.clone(),
            }
        })?;
        if package.identifier.trim().is_empty() {
            return Err(ConversionError::MissingIdentifier {
                server: name.to_string(),
            });
        }

        let version = if package.version.is_empty() {
            manifest.version.as_str()
        } else {
            package.version.as_str()
        };
        let mut launch = decoder(name, package, version)?;
        launch
            .args
            .extend(package.package_arguments.iter().flat_map(|arg| arg.tokens()));

        let deployment = McpServerDeployment {
            image: launch.image,
            cmd: launch.cmd,
            args: launch.args,
            env: resolve_env(name, package, env_values)?,
        };

        match package.transport.kind.as_str() {
            "stdio" => {
                if launch.requires_http {
                    return Err(ConversionError::StdioImagePackage {
                        server: name.to_string(),
                    });
                }
                Ok(McpServer::local_stdio(name, deployment))
            }
            "streamable-http" | "sse" => {
                let raw = package.transport.url.as_deref().ok_or_else(|| {
                    ConversionError::MissingTransportUrl {
                        server: name.to_string(),
                        transport: package.transport.kind.clone(),
                    }
                })?;
                let endpoint = parse_endpoint(name, raw)?;
                Ok(McpServer::local_http(
                    name,
                    deployment,
                    endpoint.port,
                    endpoint.path,
                ))
            }
            other => Err(ConversionError::UnsupportedTransport {
                server: name.to_string(),
                transport: other.to_string(),
            }),
        }
    }
}

/// Compose-safe service name for a registry name:
/// `io.github.owner/server` becomes `io-github-owner-server`.
pub fn service_name(registry_name: &str) -> Result<String, ConversionError> {
    let name: String = registry_name
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-' {
                c
            } else {
                '-'
            }
        })
        .collect();
    let name = name.trim_matches('-');
    if name.is_empty() {
        return Err(ConversionError::InvalidName(registry_name.to_string()));
    }
    Ok(name.to_string())
}

fn decode_npm(
    server: &str,
    package: &Package,
    version: &str,
) -> Result<PackageLaunch, ConversionError> {
    let version = require_version(server, package, version)?;
    Ok(PackageLaunch {
        image: NPM_IMAGE.to_string(),
        cmd: "npx".to_string(),
        args: vec![
            "-y".to_string(),
            format!("{}@{version}", package.identifier),
        ],
        requires_http: false,
    })
}

fn decode_pypi(
    server: &str,
    package: &Package,
    version: &str,
) -> Result<PackageLaunch, ConversionError> {
    let version = require_version(server, package, version)?;
    Ok(PackageLaunch {
        image: PYPI_IMAGE.to_string(),
        cmd: "uvx".to_string(),
        args: vec![format!("{}=={version}", package.identifier)],
        requires_http: false,
    })
}

fn decode_image(
    _server: &str,
    package: &Package,
    version: &str,
) -> Result<PackageLaunch, ConversionError> {
    // An identifier that already pins a tag or digest is used as-is.
    let last_segment = package.identifier.rsplit('/').next().unwrap_or_default();
    let pinned = last_segment.contains(':') || package.identifier.contains('@');
    let image = if version.is_empty() || pinned {
        package.identifier.clone()
    } else {
        format!("{}:{version}", package.identifier)
    };
    Ok(PackageLaunch {
        image,
        cmd: String::new(),
        args: Vec::new(),
        requires_http: true,
    })
}

fn require_version<'a>(
    server: &str,
    package: &Package,
    version: &'a str,
) -> Result<&'a str, ConversionError> {
    if version.trim().is_empty() {
        return Err(ConversionError::MissingVersion {
            server: server.to_string(),
            identifier: package.identifier.clone(),
        });
    }
    Ok(version)
}

/// Declared values and defaults, overridden by request values. Request values
/// for undeclared variables are passed through.
fn resolve_env(
    server: &str,
    package: &Package,
    env_values: &BTreeMap<String, String>,
) -> Result<BTreeMap<String, String>, ConversionError> {
    let mut env = BTreeMap::new();
    for var in &package.environment_variables {
        let value = env_values
            .get(&var.name)
            .or(var.value.as_ref())
            .or(var.default.as_ref());
        match value {
            Some(value) => {
                env.insert(var.name.clone(), value.clone());
            }
            None if var.is_required => {
                return Err(ConversionError::MissingRequiredEnv {
                    server: server.to_string(),
                    name: var.name.clone(),
                });
            }
            None => {}
        }
    }
    for (key, value) in env_values {
        env.entry(key.clone()).or_insert_with(|| value.clone());
    }
    Ok(env)
}

struct Endpoint {
    host: String,
    port: u16,
    path: String,
}

fn parse_endpoint(server: &str, raw: &str) -> Result<Endpoint, ConversionError> {
    let invalid = |reason: String| ConversionError::InvalidUrl {
        server: server.to_string(),
        url: raw.to_string(),
        reason,
    };
    let url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    let host = url
        .host_str()
        .ok_or_else(|| invalid("missing host".to_string()))?
        .to_string();
    let port = url
        .port_or_known_default()
        .ok_or_else(|| invalid(format!("no default port for scheme {}", url.scheme())))?;
    let path = match url.path() {
        "/" => String::new(),
        path => path.to_string(),
    };
    Ok(Endpoint { host, port, path })
}

fn translate_remote(name: &str, remote: &Remote) -> Result<McpServer, ConversionError> {
    match remote.kind.as_str() {
        "streamable-http" | "sse" => {
            let endpoint = parse_endpoint(name, &remote.url)?;
            Ok(McpServer::remote(
                name,
                endpoint.host,
                endpoint.port,
                endpoint.path,
            ))
        }
        other => Err(ConversionError::UnsupportedTransport {
            server: name.to_string(),
            transport: other.to_string(),
        }),
    }
}
