//! Reconciler tests against a recording fake container engine.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use agentregistry_core::{
    Agent, ComposeLocation, ComposeProject, ContainerEngine, DesiredState, EngineError, McpServer,
    McpServerDeployment, ReconcilePhase, RuntimeEvent, RuntimeEventEmitter, compose_file_path,
    gateway_file_path,
};
use agentregistry_runtime::{
    LOCK_FILE_NAME, McpServerRunRequest, ReconcileError, Reconciler, WorkdirLocks,
};
use agentregistry_translation::{AGENT_GATEWAY_SERVICE, LocalTranslator};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

const DEMO_TIME: &str = r#"{
    "$schema": "https://static.modelcontextprotocol.io/schemas/2025-09-29/server.schema.json",
    "name": "io.github.estruyf/vscode-demo-time",
    "description": "Enables AI assistants to interact with Demo Time and helps build presentations and demos.",
    "repository": { "url": "https://github.com/estruyf/vscode-demo-time", "source": "github" },
    "version": "0.0.55",
    "packages": [{
        "registryType": "npm",
        "registryBaseUrl": "https://registry.npmjs.org",
        "identifier": "@demotime/mcp",
        "version": "0.0.55",
        "transport": { "type": "stdio" }
    }]
}"#;

const DEMO_TIME_SERVICE: &str = "io-github-estruyf-vscode-demo-time";

#[derive(Default)]
struct FakeEngine {
    ups: AtomicUsize,
    downs: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    delay: Duration,
    fail_up: bool,
    running: Mutex<Vec<String>>,
}

impl FakeEngine {
    fn slow(delay: Duration) -> Self {
        Self {
            delay,
            ..Default::default()
        }
    }

    fn failing() -> Self {
        Self {
            fail_up: true,
            ..Default::default()
        }
    }

    fn ups(&self) -> usize {
        self.ups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContainerEngine for FakeEngine {
    async fn up(&self, location: &ComposeLocation) -> Result<(), EngineError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.ups.fetch_add(1, Ordering::SeqCst);

        if self.fail_up {
            return Err(EngineError::CommandFailed {
                operation: "up",
                code: Some(1),
                diagnostic: "image pull failed".to_string(),
            });
        }

        let yaml = std::fs::read_to_string(&location.compose_file)
            .map_err(|e| EngineError::InvalidOutput(e.to_string()))?;
        let project: ComposeProject =
            serde_yaml::from_str(&yaml).map_err(|e| EngineError::InvalidOutput(e.to_string()))?;
        *self.running.lock().unwrap() = project.service_names();
        Ok(())
    }

    async fn down(&self, _location: &ComposeLocation) -> Result<(), EngineError> {
        self.downs.fetch_add(1, Ordering::SeqCst);
        self.running.lock().unwrap().clear();
        Ok(())
    }

    async fn running_services(
        &self,
        _location: &ComposeLocation,
    ) -> Result<Vec<String>, EngineError> {
        Ok(self.running.lock().unwrap().clone())
    }
}

#[derive(Default)]
struct RecordingEmitter {
    events: Mutex<Vec<RuntimeEvent>>,
}

impl RecordingEmitter {
    fn phases(&self) -> Vec<ReconcilePhase> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter_map(|event| match event {
                RuntimeEvent::PhaseChanged { phase, .. } => Some(*phase),
                _ => None,
            })
            .collect()
    }
}

impl RuntimeEventEmitter for RecordingEmitter {
    fn emit(&self, event: RuntimeEvent) {
        self.events.lock().unwrap().push(event);
    }
}

fn reconciler(dir: &Path, engine: Arc<FakeEngine>) -> Reconciler {
    let translator = LocalTranslator::new(dir, 18080).with_project_name("test-project");
    Reconciler::new(Arc::new(translator), engine, dir, "test-project")
}

fn demo_request() -> McpServerRunRequest {
    McpServerRunRequest::from_manifest_json(DEMO_TIME).unwrap()
}

fn stdio_server(name: &str) -> McpServer {
    McpServer::local_stdio(
        name,
        McpServerDeployment {
            image: "node:24-alpine3.21".to_string(),
            cmd: "npx".to_string(),
            args: vec!["-y".to_string(), format!("@x/{name}")],
            ..Default::default()
        },
    )
}

fn read(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap()
}

#[tokio::test]
async fn reconcile_writes_artifacts_and_applies() {
    let dir = tempfile::tempdir().unwrap();
    let engine = Arc::new(FakeEngine::default());
    let reconciler = reconciler(dir.path(), Arc::clone(&engine));

    let report = reconciler
        .reconcile_mcp_servers(&[demo_request()], &CancellationToken::new())
        .await
        .unwrap();

    assert!(report.artifacts_changed);
    assert_eq!(report.compose_file, compose_file_path(dir.path()));
    assert_eq!(report.services, vec![AGENT_GATEWAY_SERVICE, DEMO_TIME_SERVICE]);

    let compose = read(&compose_file_path(dir.path()));
    assert!(compose.contains(AGENT_GATEWAY_SERVICE));
    assert!(compose.contains("@demotime/mcp@0.0.55"));
    let gateway = read(&gateway_file_path(dir.path()));
    assert!(gateway.contains("mcp_route"));
    assert!(gateway.contains(DEMO_TIME_SERVICE));

    assert_eq!(engine.ups(), 1);
    assert_eq!(
        reconciler.status().await.unwrap(),
        vec![AGENT_GATEWAY_SERVICE, DEMO_TIME_SERVICE]
    );
}

#[tokio::test]
async fn repeated_reconcile_is_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    let engine = Arc::new(FakeEngine::default());
    let reconciler = reconciler(dir.path(), Arc::clone(&engine));
    let cancel = CancellationToken::new();

    reconciler
        .reconcile_mcp_servers(&[demo_request()], &cancel)
        .await
        .unwrap();
    let compose_before = read(&compose_file_path(dir.path()));
    let gateway_before = read(&gateway_file_path(dir.path()));

    let report = reconciler
        .reconcile_mcp_servers(&[demo_request()], &cancel)
        .await
        .unwrap();
    assert!(!report.artifacts_changed);
    assert_eq!(read(&compose_file_path(dir.path())), compose_before);
    assert_eq!(read(&gateway_file_path(dir.path())), gateway_before);
    // The engine is still asked to converge; `up` is idempotent.
    assert_eq!(engine.ups(), 2);
}

#[tokio::test]
async fn removed_servers_leave_the_project() {
    let dir = tempfile::tempdir().unwrap();
    let engine = Arc::new(FakeEngine::default());
    let reconciler = reconciler(dir.path(), Arc::clone(&engine));
    let cancel = CancellationToken::new();

    let both = DesiredState::new(vec![stdio_server("fs"), stdio_server("git")], vec![]);
    reconciler
        .reconcile_desired_state(&both, &cancel)
        .await
        .unwrap();
    assert!(read(&compose_file_path(dir.path())).contains("git"));

    let one = DesiredState::new(vec![stdio_server("fs")], vec![]);
    let report = reconciler
        .reconcile_desired_state(&one, &cancel)
        .await
        .unwrap();
    assert_eq!(report.services, vec![AGENT_GATEWAY_SERVICE, "fs"]);
    assert!(!read(&compose_file_path(dir.path())).contains("@x/git"));
    assert_eq!(
        reconciler.status().await.unwrap(),
        vec![AGENT_GATEWAY_SERVICE, "fs"]
    );
}

#[tokio::test]
async fn invalid_desired_state_leaves_previous_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let engine = Arc::new(FakeEngine::default());
    let reconciler = reconciler(dir.path(), Arc::clone(&engine));
    let cancel = CancellationToken::new();

    reconciler
        .reconcile_desired_state(&DesiredState::new(vec![stdio_server("fs")], vec![]), &cancel)
        .await
        .unwrap();
    let compose_before = read(&compose_file_path(dir.path()));
    let gateway_before = read(&gateway_file_path(dir.path()));

    let duplicate = DesiredState::new(vec![stdio_server("dup"), stdio_server("dup")], vec![]);
    let err = reconciler
        .reconcile_desired_state(&duplicate, &cancel)
        .await
        .unwrap_err();

    assert_eq!(err.phase(), ReconcilePhase::Compiling);
    assert!(err.to_string().contains("duplicate MCPServer name: dup"));
    assert_eq!(read(&compose_file_path(dir.path())), compose_before);
    assert_eq!(read(&gateway_file_path(dir.path())), gateway_before);
    assert_eq!(engine.ups(), 1);
}

#[tokio::test]
async fn conversion_error_has_no_side_effects() {
    let dir = tempfile::tempdir().unwrap();
    let engine = Arc::new(FakeEngine::default());
    let reconciler = reconciler(dir.path(), Arc::clone(&engine));

    let bad = McpServerRunRequest::from_manifest_json(
        r#"{ "name": "io.example/bad", "version": "1.0.0",
             "packages": [{ "registryType": "cargo", "identifier": "bad",
                            "transport": { "type": "stdio" } }] }"#,
    )
    .unwrap();
    let err = reconciler
        .reconcile_mcp_servers(&[demo_request(), bad], &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, ReconcileError::Conversion(_)));
    assert_eq!(err.phase(), ReconcilePhase::Validating);
    assert!(!compose_file_path(dir.path()).exists());
    assert!(!gateway_file_path(dir.path()).exists());
    assert_eq!(engine.ups(), 0);
}

#[tokio::test]
async fn engine_failure_is_reported_after_persisting() {
    let dir = tempfile::tempdir().unwrap();
    let engine = Arc::new(FakeEngine::failing());
    let emitter = Arc::new(RecordingEmitter::default());
    let reconciler = reconciler(dir.path(), Arc::clone(&engine))
        .with_emitter(Arc::clone(&emitter) as Arc<dyn RuntimeEventEmitter>);

    let err = reconciler
        .reconcile_mcp_servers(&[demo_request()], &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, ReconcileError::Engine(_)));
    assert_eq!(err.phase(), ReconcilePhase::Applying);
    assert!(err.to_string().contains("image pull failed"));
    assert!(compose_file_path(dir.path()).exists());

    let events = emitter.events.lock().unwrap();
    assert!(matches!(
        events.last(),
        Some(RuntimeEvent::Failed {
            phase: ReconcilePhase::Applying,
            ..
        })
    ));
}

#[tokio::test]
async fn phases_are_emitted_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let emitter = Arc::new(RecordingEmitter::default());
    let reconciler = reconciler(dir.path(), Arc::new(FakeEngine::default()))
        .with_emitter(Arc::clone(&emitter) as Arc<dyn RuntimeEventEmitter>);

    reconciler
        .reconcile_desired_state(
            &DesiredState::new(vec![], vec![Agent::new("planner", "agent:v1", 0)]),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(
        emitter.phases(),
        vec![
            ReconcilePhase::Validating,
            ReconcilePhase::Compiling,
            ReconcilePhase::Persisting,
            ReconcilePhase::Applying,
            ReconcilePhase::Converged,
        ]
    );
    let events = emitter.events.lock().unwrap();
    match events.last() {
        Some(RuntimeEvent::Converged {
            services,
            artifacts_changed,
            ..
        }) => {
            assert!(*artifacts_changed);
            assert_eq!(services, &vec![AGENT_GATEWAY_SERVICE, "planner"]);
        }
        other => panic!("expected a converged event, got {other:?}"),
    }
}

#[tokio::test]
async fn cancellation_stops_waiting_on_the_engine() {
    let dir = tempfile::tempdir().unwrap();
    let engine = Arc::new(FakeEngine::slow(Duration::from_secs(60)));
    let reconciler = reconciler(dir.path(), Arc::clone(&engine));
    let cancel = CancellationToken::new();

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let result = tokio::time::timeout(
        Duration::from_secs(5),
        reconciler.reconcile_mcp_servers(&[demo_request()], &cancel),
    )
    .await
    .expect("cancellation should end the reconcile promptly");

    let err = result.unwrap_err();
    assert!(matches!(
        err,
        ReconcileError::Cancelled {
            phase: ReconcilePhase::Applying
        }
    ));
    assert_eq!(engine.ups(), 0);
}

#[tokio::test]
async fn cancelled_token_skips_all_side_effects() {
    let dir = tempfile::tempdir().unwrap();
    let engine = Arc::new(FakeEngine::default());
    let reconciler = reconciler(dir.path(), Arc::clone(&engine));
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = reconciler
        .reconcile_mcp_servers(&[demo_request()], &cancel)
        .await
        .unwrap_err();

    assert!(matches!(err, ReconcileError::Cancelled { .. }));
    assert!(!err.phase().has_side_effects());
    assert!(!compose_file_path(dir.path()).exists());
    assert_eq!(engine.ups(), 0);
}

#[tokio::test]
async fn reconciles_of_one_directory_are_serialized() {
    let dir = tempfile::tempdir().unwrap();
    let engine = Arc::new(FakeEngine::slow(Duration::from_millis(100)));
    let locks = Arc::new(WorkdirLocks::new());
    let first = reconciler(dir.path(), Arc::clone(&engine)).with_locks(Arc::clone(&locks));
    let second = reconciler(dir.path(), Arc::clone(&engine)).with_locks(Arc::clone(&locks));
    let cancel = CancellationToken::new();

    let fs_only = DesiredState::new(vec![stdio_server("fs")], vec![]);
    let git_only = DesiredState::new(vec![stdio_server("git")], vec![]);
    let (a, b) = tokio::join!(
        first.reconcile_desired_state(&fs_only, &cancel),
        second.reconcile_desired_state(&git_only, &cancel),
    );

    a.unwrap();
    b.unwrap();
    assert_eq!(engine.ups(), 2);
    assert_eq!(engine.max_in_flight.load(Ordering::SeqCst), 1);
}

#[cfg(unix)]
#[tokio::test]
async fn independent_reconcilers_of_one_directory_are_serialized() {
    let dir = tempfile::tempdir().unwrap();
    let engine = Arc::new(FakeEngine::slow(Duration::from_millis(200)));
    // No shared lock registry: exclusion comes from the lock file alone.
    let first = reconciler(dir.path(), Arc::clone(&engine));
    let second = reconciler(dir.path(), Arc::clone(&engine));
    let cancel = CancellationToken::new();

    let fs_only = DesiredState::new(vec![stdio_server("fs")], vec![]);
    let git_only = DesiredState::new(vec![stdio_server("git")], vec![]);
    let (a, b) = tokio::join!(
        first.reconcile_desired_state(&fs_only, &cancel),
        second.reconcile_desired_state(&git_only, &cancel),
    );

    a.unwrap();
    b.unwrap();
    assert_eq!(engine.ups(), 2);
    assert_eq!(engine.max_in_flight.load(Ordering::SeqCst), 1);
    assert!(dir.path().join(LOCK_FILE_NAME).exists());
}

#[cfg(unix)]
#[tokio::test]
async fn cancelling_while_waiting_for_the_directory_has_no_side_effects() {
    let dir = tempfile::tempdir().unwrap();
    let engine = Arc::new(FakeEngine::default());
    let holder = WorkdirLocks::new();
    let guard = holder.acquire(dir.path()).await.unwrap();

    let reconciler = reconciler(dir.path(), Arc::clone(&engine));
    let cancel = CancellationToken::new();
    let canceller = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        canceller.cancel();
    });

    let err = reconciler
        .reconcile_mcp_servers(&[demo_request()], &cancel)
        .await
        .unwrap_err();
    drop(guard);

    assert!(matches!(
        err,
        ReconcileError::Cancelled {
            phase: ReconcilePhase::Compiling
        }
    ));
    assert!(!compose_file_path(dir.path()).exists());
    assert_eq!(engine.ups(), 0);
}

#[tokio::test]
async fn teardown_stops_the_project() {
    let dir = tempfile::tempdir().unwrap();
    let engine = Arc::new(FakeEngine::default());
    let reconciler = reconciler(dir.path(), Arc::clone(&engine));
    let cancel = CancellationToken::new();

    reconciler
        .reconcile_mcp_servers(&[demo_request()], &cancel)
        .await
        .unwrap();
    reconciler.teardown(&cancel).await.unwrap();

    assert_eq!(engine.downs.load(Ordering::SeqCst), 1);
    assert!(reconciler.status().await.unwrap().is_empty());
    // Artifacts stay for inspection.
    assert!(compose_file_path(dir.path()).exists());
}

#[test]
fn render_touches_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let runtime_dir = dir.path().join("runtime");
    let engine = Arc::new(FakeEngine::default());
    let reconciler = reconciler(&runtime_dir, Arc::clone(&engine));

    let rendered = reconciler.render_mcp_servers(&[demo_request()]).unwrap();
    assert!(rendered.compose_yaml.contains(DEMO_TIME_SERVICE));
    assert!(rendered.gateway_yaml.contains("stdio"));
    assert!(!runtime_dir.exists());
    assert_eq!(engine.ups(), 0);
}
