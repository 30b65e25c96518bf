//! Root CLI structure with global options.

use std::path::PathBuf;

use clap::Parser;

use crate::commands::Commands;

/// Run registry MCP servers and agents behind a local agent gateway.
#[derive(Parser)]
#[command(name = "arctl")]
#[command(about = "Run MCP servers and agents behind a local agent gateway")]
#[command(version)]
pub struct Cli {
    /// Working directory for docker-compose.yaml and agent-gateway.yaml
    #[arg(long = "runtime-dir", env = "ARCTL_RUNTIME_DIR", global = true)]
    pub runtime_dir: Option<PathBuf>,

    /// Host port the agent gateway listens on
    #[arg(long = "gateway-port", env = "ARCTL_GATEWAY_PORT", global = true)]
    pub gateway_port: Option<u16>,

    /// Compose project name
    #[arg(long = "project-name", env = "ARCTL_PROJECT_NAME", global = true)]
    pub project_name: Option<String>,

    /// Agent gateway container image
    #[arg(long = "gateway-image", env = "ARCTL_GATEWAY_IMAGE", global = true)]
    pub gateway_image: Option<String>,

    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}
