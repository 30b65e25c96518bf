//! Subcommand definitions.

use std::path::PathBuf;

use clap::{Args, Subcommand};

#[derive(Subcommand)]
pub enum Commands {
    /// Drive the local runtime
    Runtime {
        #[command(subcommand)]
        command: RuntimeCommand,
    },
    /// Show the runtime directory and artifact paths
    Paths,
}

#[derive(Subcommand)]
pub enum RuntimeCommand {
    /// Print the compose and gateway files without writing or applying them
    Render(DesiredStateArgs),
    /// Write the artifacts and bring the containers to the desired state
    Apply(DesiredStateArgs),
    /// Stop and remove every container of the runtime
    Down,
    /// List running services
    Status {
        /// Print the service list as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Where the desired state comes from.
#[derive(Args, Debug, Default)]
pub struct DesiredStateArgs {
    /// Registry server.json manifest (repeatable)
    #[arg(short = 'm', long = "manifest", value_name = "FILE")]
    pub manifests: Vec<PathBuf>,

    /// Desired state file (YAML or JSON) with mcp_servers and agents
    #[arg(
        short = 'f',
        long = "desired-state",
        value_name = "FILE",
        conflicts_with = "manifests"
    )]
    pub desired_state: Option<PathBuf>,

    /// Use a manifest's remote endpoint instead of running its package
    #[arg(long)]
    pub prefer_remote: bool,

    /// Environment value passed to every manifest server (KEY=VALUE, repeatable)
    #[arg(short = 'e', long = "env", value_name = "KEY=VALUE", value_parser = parse_env_pair)]
    pub env: Vec<(String, String)>,
}

fn parse_env_pair(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got {raw:?}")),
    }
}
