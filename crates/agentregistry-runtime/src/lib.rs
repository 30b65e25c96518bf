//! Runtime side of agentregistry.
//!
//! - [`registry`] - `server.json` manifests and their conversion to MCP servers
//! - [`engine`] - the `docker compose` container engine adapter
//! - [`reconciler`] - artifact persistence and the reconcile state machine

#![deny(unused_crate_dependencies)]

pub mod engine;
pub mod reconciler;
pub mod registry;

pub use engine::DockerComposeEngine;
pub use reconciler::{
    LOCK_FILE_NAME, PersistError, ReconcileError, ReconcileReport, Reconciler, RenderedArtifacts,
    WorkdirGuard, WorkdirLocks,
};
pub use registry::{ConversionError, McpServerRunRequest, RegistryTranslator, ServerJson};

#[cfg(test)]
use agentregistry_translation as _;
