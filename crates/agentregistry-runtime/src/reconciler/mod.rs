//! The reconciler: drive a compose project to a desired state.
//!
//! One reconciliation runs `Validating → Compiling → Persisting → Applying →
//! Converged`. `Persisting` and `Applying` run under the working-directory
//! lock, which also excludes other processes through `.arctl.lock`. A failure
//! before `Persisting` leaves the artifacts and containers untouched.

mod locks;
mod persist;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use agentregistry_core::{
    ComposeLocation, ContainerEngine, DesiredState, EngineError, NoopEmitter, ReconcilePhase,
    RuntimeConfig, RuntimeEvent, RuntimeEventEmitter, RuntimeTranslator, TranslationError,
    compose_file_path, gateway_file_path,
};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::registry::{ConversionError, McpServerRunRequest, RegistryTranslator};

pub use locks::{LOCK_FILE_NAME, WorkdirGuard, WorkdirLocks};
pub use persist::{PersistError, RenderedArtifacts, render_artifacts, write_artifacts};

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error(transparent)]
    Conversion(#[from] ConversionError),

    #[error(transparent)]
    Translation(#[from] TranslationError),

    #[error(transparent)]
    Persist(#[from] PersistError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("reconciliation cancelled while {phase}")]
    Cancelled { phase: ReconcilePhase },
}

impl ReconcileError {
    /// Phase the reconciliation was in when it stopped.
    pub const fn phase(&self) -> ReconcilePhase {
        match self {
            Self::Conversion(_) => ReconcilePhase::Validating,
            Self::Translation(_) => ReconcilePhase::Compiling,
            Self::Persist(_) => ReconcilePhase::Persisting,
            Self::Engine(_) => ReconcilePhase::Applying,
            Self::Cancelled { phase } => *phase,
        }
    }
}

/// Outcome of a successful reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileReport {
    pub compose_file: PathBuf,
    pub gateway_file: PathBuf,
    /// Whether either artifact was rewritten.
    pub artifacts_changed: bool,
    /// Compose services in the applied project, sorted.
    pub services: Vec<String>,
}

/// Owns one runtime directory and the compose project inside it.
pub struct Reconciler {
    registry: RegistryTranslator,
    translator: Arc<dyn RuntimeTranslator>,
    engine: Arc<dyn ContainerEngine>,
    emitter: Arc<dyn RuntimeEventEmitter>,
    locks: Arc<WorkdirLocks>,
    location: ComposeLocation,
}

impl Reconciler {
    pub fn new(
        translator: Arc<dyn RuntimeTranslator>,
        engine: Arc<dyn ContainerEngine>,
        runtime_dir: impl Into<PathBuf>,
        project_name: impl Into<String>,
    ) -> Self {
        let runtime_dir = runtime_dir.into();
        let compose_file = compose_file_path(&runtime_dir);
        Self {
            registry: RegistryTranslator::new(),
            translator,
            engine,
            emitter: Arc::new(NoopEmitter::new()),
            locks: Arc::new(WorkdirLocks::new()),
            location: ComposeLocation::new(runtime_dir, compose_file, project_name),
        }
    }

    #[must_use]
    pub fn with_registry(mut self, registry: RegistryTranslator) -> Self {
        self.registry = registry;
        self
    }

    #[must_use]
    pub fn with_emitter(mut self, emitter: Arc<dyn RuntimeEventEmitter>) -> Self {
        self.emitter = emitter;
        self
    }

    /// Share a lock registry with other reconcilers in this process.
    ///
    /// Not needed for exclusion, which the lock file provides, but waiters
    /// then queue on the mutex instead of polling the file.
    #[must_use]
    pub fn with_locks(mut self, locks: Arc<WorkdirLocks>) -> Self {
        self.locks = locks;
        self
    }

    pub fn runtime_dir(&self) -> &Path {
        self.location.working_dir()
    }

    pub const fn location(&self) -> &ComposeLocation {
        &self.location
    }

    /// Convert run-requests and reconcile the resulting MCP servers.
    ///
    /// The request list is the complete desired set: servers absent from it
    /// are removed.
    pub async fn reconcile_mcp_servers(
        &self,
        requests: &[McpServerRunRequest],
        cancel: &CancellationToken,
    ) -> Result<ReconcileReport, ReconcileError> {
        self.enter(ReconcilePhase::Validating);
        let servers = match self.registry.translate_all(requests) {
            Ok(servers) => servers,
            Err(e) => return self.finish(Err(e.into())),
        };
        debug!(count = servers.len(), "Converted run requests");
        self.converge(&DesiredState::new(servers, Vec::new()), cancel)
            .await
    }

    /// Reconcile a complete desired state, agents included.
    pub async fn reconcile_desired_state(
        &self,
        desired: &DesiredState,
        cancel: &CancellationToken,
    ) -> Result<ReconcileReport, ReconcileError> {
        self.enter(ReconcilePhase::Validating);
        self.converge(desired, cancel).await
    }

    /// Compile and serialize without touching disk or the engine.
    pub fn render(&self, desired: &DesiredState) -> Result<RenderedArtifacts, ReconcileError> {
        let RuntimeConfig::Local(local) = self.translator.translate_runtime_config(desired)?;
        Ok(render_artifacts(&local)?)
    }

    /// [`Self::render`] for run-requests.
    pub fn render_mcp_servers(
        &self,
        requests: &[McpServerRunRequest],
    ) -> Result<RenderedArtifacts, ReconcileError> {
        let servers = self.registry.translate_all(requests)?;
        self.render(&DesiredState::new(servers, Vec::new()))
    }

    /// Stop and remove every service of the project. Artifacts stay on disk.
    pub async fn teardown(&self, cancel: &CancellationToken) -> Result<(), ReconcileError> {
        let _guard = self.lock(cancel, ReconcilePhase::Validating).await?;
        info!(working_dir = %self.runtime_dir().display(), "Tearing down runtime");
        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(ReconcileError::Cancelled {
                phase: ReconcilePhase::Applying,
            }),
            result = self.engine.down(&self.location) => Ok(result?),
        }
    }

    /// Services the engine reports as running.
    pub async fn status(&self) -> Result<Vec<String>, ReconcileError> {
        Ok(self.engine.running_services(&self.location).await?)
    }

    async fn converge(
        &self,
        desired: &DesiredState,
        cancel: &CancellationToken,
    ) -> Result<ReconcileReport, ReconcileError> {
        let result = self.converge_locked(desired, cancel).await;
        self.finish(result)
    }

    async fn converge_locked(
        &self,
        desired: &DesiredState,
        cancel: &CancellationToken,
    ) -> Result<ReconcileReport, ReconcileError> {
        self.enter(ReconcilePhase::Compiling);
        let RuntimeConfig::Local(local) = self.translator.translate_runtime_config(desired)?;
        let rendered = render_artifacts(&local)?;

        if cancel.is_cancelled() {
            return Err(ReconcileError::Cancelled {
                phase: ReconcilePhase::Compiling,
            });
        }
        let _guard = self.lock(cancel, ReconcilePhase::Compiling).await?;

        self.enter(ReconcilePhase::Persisting);
        let artifacts_changed = write_artifacts(self.runtime_dir(), &rendered).await?;

        self.enter(ReconcilePhase::Applying);
        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                return Err(ReconcileError::Cancelled {
                    phase: ReconcilePhase::Applying,
                });
            }
            result = self.engine.up(&self.location) => result?,
        }

        let report = ReconcileReport {
            compose_file: compose_file_path(self.runtime_dir()),
            gateway_file: gateway_file_path(self.runtime_dir()),
            artifacts_changed,
            services: local.docker_compose.service_names(),
        };
        info!(
            working_dir = %self.runtime_dir().display(),
            services = ?report.services,
            artifacts_changed,
            "Runtime converged"
        );
        self.enter(ReconcilePhase::Converged);
        self.emitter.emit(RuntimeEvent::Converged {
            working_dir: self.runtime_dir().to_path_buf(),
            services: report.services.clone(),
            artifacts_changed,
        });
        Ok(report)
    }

    /// Wait for the working directory; cancelling reports `waiting_in`.
    async fn lock(
        &self,
        cancel: &CancellationToken,
        waiting_in: ReconcilePhase,
    ) -> Result<WorkdirGuard, ReconcileError> {
        let dir = self.runtime_dir();
        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(ReconcileError::Cancelled { phase: waiting_in }),
            guard = self.locks.acquire(dir) => guard.map_err(|e| {
                ReconcileError::from(PersistError::io("lock", &dir.join(LOCK_FILE_NAME), e))
            }),
        }
    }

    fn enter(&self, phase: ReconcilePhase) {
        debug!(phase = ?phase, working_dir = %self.runtime_dir().display(), "Reconcile phase");
        self.emitter.emit(RuntimeEvent::PhaseChanged {
            working_dir: self.runtime_dir().to_path_buf(),
            phase,
        });
    }

    fn finish<T>(&self, result: Result<T, ReconcileError>) -> Result<T, ReconcileError> {
        if let Err(e) = &result {
            let phase = e.phase();
            warn!(phase = ?phase, working_dir = %self.runtime_dir().display(), "Reconcile failed: {e}");
            self.emitter.emit(RuntimeEvent::Failed {
                working_dir: self.runtime_dir().to_path_buf(),
                phase,
                message: e.to_string(),
            });
        }
        result
    }
}
