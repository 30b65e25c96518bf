//! CLI bootstrap - the composition root.
//!
//! Settings, the local translator, the docker compose engine and the
//! reconciler are wired together here and nowhere else.

use std::path::PathBuf;
use std::sync::Arc;

use agentregistry_core::{
    ReconcilePhase, RuntimeEvent, RuntimeEventEmitter, RuntimeSettings, RuntimeTarget,
    validate_settings,
};
use agentregistry_runtime::{DockerComposeEngine, Reconciler};
use agentregistry_translation::translator_for;
use tracing::{debug, info};

use crate::error::CliError;
use crate::parser::Cli;

/// Layer command-line and environment overrides over the defaults.
pub fn settings_from_cli(cli: &Cli) -> RuntimeSettings {
    let defaults = RuntimeSettings::with_defaults();
    RuntimeSettings {
        runtime_dir: cli.runtime_dir.clone().or(defaults.runtime_dir),
        gateway_port: cli.gateway_port.or(defaults.gateway_port),
        project_name: cli.project_name.clone().or(defaults.project_name),
        gateway_image: cli.gateway_image.clone().or(defaults.gateway_image),
    }
}

/// Logs reconcile progress for the terminal.
#[derive(Debug, Default)]
pub struct LogEmitter;

impl RuntimeEventEmitter for LogEmitter {
    fn emit(&self, event: RuntimeEvent) {
        match event {
            RuntimeEvent::PhaseChanged { phase, .. } if phase.has_side_effects() => {
                info!("{}...", capitalized(phase));
            }
            RuntimeEvent::PhaseChanged { phase, .. } => debug!(?phase, "Reconcile phase"),
            RuntimeEvent::Converged { .. } | RuntimeEvent::Failed { .. } => {}
        }
    }
}

fn capitalized(phase: ReconcilePhase) -> String {
    let name = phase.to_string();
    let mut chars = name.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

/// Fully composed context for runtime commands.
pub struct CliContext {
    pub settings: RuntimeSettings,
    pub runtime_dir: PathBuf,
    pub reconciler: Reconciler,
}

/// Validate settings and wire the reconciler.
pub fn bootstrap(mut settings: RuntimeSettings) -> Result<CliContext, CliError> {
    validate_settings(&settings)?;

    // Compose resolves bind mounts against its own directory, so pin the
    // runtime directory to an absolute path before it lands in the artifacts.
    let runtime_dir = std::path::absolute(settings.effective_runtime_dir()?)?;
    settings.runtime_dir = Some(runtime_dir.clone());

    let translator = translator_for(RuntimeTarget::Local, &settings)?;
    let reconciler = Reconciler::new(
        translator,
        Arc::new(DockerComposeEngine::new()),
        runtime_dir.clone(),
        settings.effective_project_name(),
    )
    .with_emitter(Arc::new(LogEmitter));

    debug!(runtime_dir = %runtime_dir.display(), "CLI bootstrapped");
    Ok(CliContext {
        settings,
        runtime_dir,
        reconciler,
    })
}
