//! `arctl` command-line adapter.

#![deny(unused_crate_dependencies)]

// Used by the binary entry point only
use anyhow as _;
use dotenvy as _;
use tokio as _;
use tracing_subscriber as _;

pub mod bootstrap;
pub mod commands;
pub mod error;
pub mod handlers;
pub mod parser;

pub use bootstrap::{CliContext, LogEmitter, bootstrap, settings_from_cli};
pub use commands::{Commands, DesiredStateArgs, RuntimeCommand};
pub use error::CliError;
pub use parser::Cli;
