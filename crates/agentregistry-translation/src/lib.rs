//! Runtime translation: compiles a [`DesiredState`](agentregistry_core::DesiredState)
//! into the artifacts of a runtime target.
//!
//! - [`gateway`] - gateway routing config compiler
//! - [`compose`] - compose project compiler
//! - [`validate`] - name uniqueness across servers and agents
//! - [`LocalTranslator`] - pairs the two compilers for the local runtime
//!
//! Everything here is pure and synchronous.

#![deny(unused_crate_dependencies)]

pub mod compose;
pub mod gateway;
mod local;
mod target;
pub mod validate;

pub use compose::{
    AGENT_GATEWAY_SERVICE, ComposeOptions, GATEWAY_CONFIG_MOUNT, compile_compose_project,
};
pub use gateway::compile_gateway_config;
pub use local::LocalTranslator;
pub use target::translator_for;
pub use validate::validate_unique_names;

// Only used by the integration tests
#[cfg(test)]
use serde_yaml as _;
