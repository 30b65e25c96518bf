//! Multi-service container project in the standard compose schema.
//!
//! Maps and sequences here are ordered (`BTreeMap`, explicitly built `Vec`s)
//! so the rendered YAML is byte-for-byte reproducible.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A compose project: `name` plus `services.<name>`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComposeProject {
    pub name: String,
    #[serde(default)]
    pub services: BTreeMap<String, ServiceConfig>,
}

impl ComposeProject {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            services: BTreeMap::new(),
        }
    }

    /// Service names in sorted order.
    pub fn service_names(&self) -> Vec<String> {
        self.services.keys().cloned().collect()
    }
}

/// A single compose service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub image: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub command: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub environment: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<ServicePort>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub volumes: Vec<ServiceVolume>,
}

/// Long-syntax port mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServicePort {
    /// Container port.
    pub target: u32,
    /// Host port, when the service is exposed on the host.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published: Option<String>,
}

impl ServicePort {
    pub const fn container(target: u32) -> Self {
        Self {
            target,
            published: None,
        }
    }

    /// Publish `port` on the host at the same number.
    pub fn host(port: u16) -> Self {
        Self {
            target: u32::from(port),
            published: Some(port.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VolumeType {
    #[default]
    Bind,
    Volume,
}

/// Long-syntax volume mount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceVolume {
    #[serde(rename = "type")]
    pub kind: VolumeType,
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub read_only: bool,
}

impl ServiceVolume {
    /// Read-only bind mount of a host directory.
    pub fn read_only_bind(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            kind: VolumeType::Bind,
            source: source.into(),
            target: target.into(),
            read_only: true,
        }
    }
}
