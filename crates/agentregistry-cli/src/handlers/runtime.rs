//! `arctl runtime` handlers.

use std::path::Path;

use agentregistry_core::{COMPOSE_FILE_NAME, DesiredState, GATEWAY_FILE_NAME};
use agentregistry_runtime::{McpServerRunRequest, RenderedArtifacts};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::bootstrap::CliContext;
use crate::commands::DesiredStateArgs;
use crate::error::CliError;

/// Desired state loaded from the command line.
#[derive(Debug)]
pub enum DesiredInput {
    Requests(Vec<McpServerRunRequest>),
    State(DesiredState),
}

/// Read manifests or a desired-state file.
pub fn load_desired_input(args: &DesiredStateArgs) -> Result<DesiredInput, CliError> {
    if let Some(path) = &args.desired_state {
        return load_desired_state(path).map(DesiredInput::State);
    }

    let mut requests = Vec::with_capacity(args.manifests.len());
    for path in &args.manifests {
        let json = read_file(path)?;
        let mut request = McpServerRunRequest::from_manifest_json(&json)
            .map_err(|e| CliError::Input(format!("{}: {e}", path.display())))?
            .with_prefer_remote(args.prefer_remote);
        for (key, value) in &args.env {
            request = request.with_env(key.as_str(), value.as_str());
        }
        requests.push(request);
    }
    Ok(DesiredInput::Requests(requests))
}

fn load_desired_state(path: &Path) -> Result<DesiredState, CliError> {
    let raw = read_file(path)?;
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let parsed = if is_json {
        serde_json::from_str(&raw).map_err(|e| e.to_string())
    } else {
        serde_yaml::from_str(&raw).map_err(|e| e.to_string())
    };
    parsed.map_err(|e| CliError::Input(format!("{}: {e}", path.display())))
}

fn read_file(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path)
        .map_err(|e| CliError::Io(format!("{}: {e}", path.display())))
}

/// Compose and gateway YAML as one multi-document stream.
pub fn format_rendered(rendered: &RenderedArtifacts) -> String {
    format!(
        "# {COMPOSE_FILE_NAME}\n{}---\n# {GATEWAY_FILE_NAME}\n{}",
        rendered.compose_yaml, rendered.gateway_yaml
    )
}

pub fn render(ctx: &CliContext, args: &DesiredStateArgs) -> Result<(), CliError> {
    let rendered = match load_desired_input(args)? {
        DesiredInput::Requests(requests) => ctx.reconciler.render_mcp_servers(&requests)?,
        DesiredInput::State(state) => ctx.reconciler.render(&state)?,
    };
    print!("{}", format_rendered(&rendered));
    Ok(())
}

pub async fn apply(
    ctx: &CliContext,
    args: &DesiredStateArgs,
    cancel: &CancellationToken,
) -> Result<(), CliError> {
    let report = match load_desired_input(args)? {
        DesiredInput::Requests(requests) => {
            ctx.reconciler
                .reconcile_mcp_servers(&requests, cancel)
                .await?
        }
        DesiredInput::State(state) => ctx.reconciler.reconcile_desired_state(&state, cancel).await?,
    };

    info!(
        artifacts_changed = report.artifacts_changed,
        "Runtime converged"
    );
    println!("Runtime converged in {}", ctx.runtime_dir.display());
    for service in &report.services {
        println!("  {service}");
    }
    if !report.artifacts_changed {
        println!("(artifacts unchanged)");
    }
    Ok(())
}

pub async fn down(ctx: &CliContext, cancel: &CancellationToken) -> Result<(), CliError> {
    ctx.reconciler.teardown(cancel).await?;
    println!("Runtime stopped");
    Ok(())
}

pub async fn status(ctx: &CliContext, json: bool) -> Result<(), CliError> {
    let services = ctx.reconciler.status().await?;
    if json {
        let out = serde_json::to_string_pretty(&services)
            .map_err(|e| CliError::Io(e.to_string()))?;
        println!("{out}");
    } else if services.is_empty() {
        println!("No services running");
    } else {
        for service in &services {
            println!("{service}");
        }
    }
    Ok(())
}
