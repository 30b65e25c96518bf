//! `docker compose` CLI adapter for the [`ContainerEngine`] port.

use std::ffi::OsString;
use std::process::Stdio;

use agentregistry_core::{ComposeLocation, ContainerEngine, EngineError};
use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, warn};

pub const DEFAULT_DOCKER_PROGRAM: &str = "docker";

/// Drives a compose project through `docker compose`.
///
/// Every call spawns a fresh process with `kill_on_drop`, so dropping an
/// in-flight future (for example on cancellation) terminates the CLI.
#[derive(Debug, Clone)]
pub struct DockerComposeEngine {
    program: OsString,
}

impl Default for DockerComposeEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl DockerComposeEngine {
    pub fn new() -> Self {
        Self::with_program(DEFAULT_DOCKER_PROGRAM)
    }

    /// Use another docker-compatible binary, e.g. `podman`.
    pub fn with_program(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn command(&self, location: &ComposeLocation, args: &[&str]) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("compose")
            .arg("--project-name")
            .arg(&location.project_name)
            .arg("--file")
            .arg(&location.compose_file)
            .args(args)
            .current_dir(location.working_dir())
            .stdin(Stdio::null())
            .kill_on_drop(true);
        cmd
    }

    async fn run(
        &self,
        operation: &'static str,
        location: &ComposeLocation,
        args: &[&str],
    ) -> Result<String, EngineError> {
        debug!(
            operation,
            project = %location.project_name,
            working_dir = %location.working_dir().display(),
            "Running docker compose"
        );

        let output = self
            .command(location, args)
            .output()
            .await
            .map_err(|e| {
                EngineError::Unavailable(format!(
                    "failed to run {}: {e}",
                    self.program.to_string_lossy()
                ))
            })?;

        if !output.status.success() {
            let diagnostic = diagnostic(&output.stderr, &output.stdout);
            warn!(
                operation,
                code = ?output.status.code(),
                "docker compose failed: {diagnostic}"
            );
            return Err(EngineError::CommandFailed {
                operation,
                code: output.status.code(),
                diagnostic,
            });
        }

        String::from_utf8(output.stdout)
            .map_err(|e| EngineError::InvalidOutput(format!("{operation}: {e}")))
    }
}

/// Engine diagnostic: stderr when present, otherwise stdout.
fn diagnostic(stderr: &[u8], stdout: &[u8]) -> String {
    let stderr = String::from_utf8_lossy(stderr);
    let stderr = stderr.trim();
    if stderr.is_empty() {
        String::from_utf8_lossy(stdout).trim().to_string()
    } else {
        stderr.to_string()
    }
}

fn parse_service_list(stdout: &str) -> Vec<String> {
    let mut services: Vec<String> = stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();
    services.sort();
    services.dedup();
    services
}

#[async_trait]
impl ContainerEngine for DockerComposeEngine {
    async fn up(&self, location: &ComposeLocation) -> Result<(), EngineError> {
        self.run("up", location, &["up", "--detach", "--remove-orphans"])
            .await
            .map(|_| ())
    }

    async fn down(&self, location: &ComposeLocation) -> Result<(), EngineError> {
        self.run("down", location, &["down", "--remove-orphans"])
            .await
            .map(|_| ())
    }

    async fn running_services(
        &self,
        location: &ComposeLocation,
    ) -> Result<Vec<String>, EngineError> {
        let stdout = self
            .run(
                "ps",
                location,
                &["ps", "--services", "--status", "running"],
            )
            .await?;
        Ok(parse_service_list(&stdout))
    }
}
