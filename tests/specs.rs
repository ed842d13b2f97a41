//! End-to-end scenarios driving the daemon's [`Application`] and the bare
//! crates it wires together against real tempfile workspaces and a real
//! `git`/`sh` on `$PATH`. Each test stands up its own `Application` so they
//! can run concurrently without sharing state directories.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use agentgate_core::gate_plan::{CommandCheck, GateCheck, GateSpec, OnFailure, OnFailureAction};
use agentgate_core::policy::SecurityPolicy;
use agentgate_core::work_order::WorkspaceSource;
use agentgate_core::{FakeClock, WorkOrder, WorkOrderStatus};
use agentgate_daemon::Application;
use agentgate_driver::{DriverRegistry, FakeAgentDriver};
use agentgate_events::Broadcaster;
use agentgate_queue::Queue;
use agentgate_sandbox::{Sandbox, SandboxError, SandboxProvider, SubprocessSandboxProvider};
use tokio_util::sync::CancellationToken;

fn plan_json(gates: &[GateSpec], max_iterations: u32) -> String {
    serde_json::json!({
        "version": 1,
        "strategy": "fixed",
        "config": {},
        "gates": gates,
        "limits": { "max_iterations": max_iterations, "max_wall_clock": "10m" },
    })
    .to_string()
}

fn driver_registry_saying_done() -> DriverRegistry {
    let driver = Arc::new(FakeAgentDriver::new("fake-driver"));
    driver.push_structured(serde_json::json!({ "done": true }));
    let mut registry = DriverRegistry::new();
    registry.register("fake-driver", driver);
    registry
}

fn work_order(workspace_path: PathBuf, gate_plan_source: String) -> WorkOrder {
    WorkOrder::new(
        "Add a health check endpoint to the service",
        WorkspaceSource::Local { path: workspace_path },
        "fake-driver",
        5,
        3600,
        gate_plan_source,
        SecurityPolicy::default(),
        chrono::Utc::now(),
    )
    .expect("fixture work order satisfies validation bounds")
}

async fn wait_for_terminal(app: &Application<FakeClock>, id: agentgate_core::WorkOrderId) -> WorkOrder {
    for _ in 0..200 {
        let wo = app.get_work_order(id).unwrap();
        if wo.status.is_terminal() {
            return wo;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("work order {id} did not reach a terminal status in time");
}

/// Happy path: a zero-gate work order converges on the first iteration.
#[tokio::test]
async fn happy_path_zero_gates_succeeds() {
    let state_dir = tempfile::tempdir().unwrap();
    let workspace_dir = tempfile::tempdir().unwrap();

    let app = Arc::new(
        Application::new(state_dir.path().to_path_buf(), driver_registry_saying_done(), 10, 2, FakeClock::new())
            .unwrap(),
    );

    let wo = work_order(workspace_dir.path().to_path_buf(), format!("inline:{}", plan_json(&[], 3)));
    let id = wo.id;
    app.submit(wo).unwrap();

    let shutdown = CancellationToken::new();
    let app_clone = Arc::clone(&app);
    let shutdown_clone = shutdown.clone();
    let handle = tokio::spawn(async move { app_clone.run(shutdown_clone).await });

    let finished = wait_for_terminal(&app, id).await;
    shutdown.cancel();
    let _ = handle.await;

    assert_eq!(finished.status, WorkOrderStatus::Succeeded);

    // The workspace's history should have been initialized exactly once.
    let log = std::process::Command::new("git")
        .arg("-C")
        .arg(workspace_dir.path())
        .args(["log", "--oneline"])
        .output()
        .unwrap();
    let commit_count = String::from_utf8_lossy(&log.stdout).lines().count();
    assert_eq!(commit_count, 1, "expected exactly one initial history commit, found {commit_count}");
}

/// A command gate that fails on its first evaluation and passes on its
/// second: the run should retry once, then converge.
#[tokio::test]
async fn command_gate_fails_then_passes_converges_on_retry() {
    let state_dir = tempfile::tempdir().unwrap();
    let workspace_dir = tempfile::tempdir().unwrap();

    let counter_gate = GateSpec {
        name: "counter-reaches-two".to_string(),
        check: GateCheck::Command(CommandCheck {
            label: "counter".to_string(),
            command: "c=$(cat counter 2>/dev/null || echo 0); c=$((c+1)); echo $c > counter; [ \"$c\" -ge 2 ]"
                .to_string(),
        }),
        on_failure: OnFailure { action: OnFailureAction::Retry, max_retries: Some(3) },
    };

    let app = Arc::new(
        Application::new(state_dir.path().to_path_buf(), driver_registry_saying_done(), 10, 2, FakeClock::new())
            .unwrap(),
    );

    let wo = work_order(workspace_dir.path().to_path_buf(), format!("inline:{}", plan_json(&[counter_gate], 5)));
    let id = wo.id;
    app.submit(wo).unwrap();

    let shutdown = CancellationToken::new();
    let app_clone = Arc::clone(&app);
    let shutdown_clone = shutdown.clone();
    let handle = tokio::spawn(async move { app_clone.run(shutdown_clone).await });

    let finished = wait_for_terminal(&app, id).await;
    shutdown.cancel();
    let _ = handle.await;

    assert_eq!(finished.status, WorkOrderStatus::Succeeded);
    let counter = std::fs::read_to_string(workspace_dir.path().join("counter")).unwrap();
    assert_eq!(counter.trim(), "2", "gate should have been evaluated exactly twice before passing");
}

/// A gate that can never pass exhausts `max_iterations` and the work order
/// lands in `Failed`.
#[tokio::test]
async fn always_failing_gate_exhausts_iterations_and_fails() {
    let state_dir = tempfile::tempdir().unwrap();
    let workspace_dir = tempfile::tempdir().unwrap();

    let never_passes = GateSpec {
        name: "always-fails".to_string(),
        check: GateCheck::Command(CommandCheck { label: "nope".to_string(), command: "exit 1".to_string() }),
        on_failure: OnFailure { action: OnFailureAction::Retry, max_retries: Some(2) },
    };

    let app = Arc::new(
        Application::new(state_dir.path().to_path_buf(), driver_registry_saying_done(), 10, 2, FakeClock::new())
            .unwrap(),
    );

    let wo = work_order(workspace_dir.path().to_path_buf(), format!("inline:{}", plan_json(&[never_passes], 2)));
    let id = wo.id;
    app.submit(wo).unwrap();

    let shutdown = CancellationToken::new();
    let app_clone = Arc::clone(&app);
    let shutdown_clone = shutdown.clone();
    let handle = tokio::spawn(async move { app_clone.run(shutdown_clone).await });

    let finished = wait_for_terminal(&app, id).await;
    shutdown.cancel();
    let _ = handle.await;

    assert_eq!(finished.status, WorkOrderStatus::Failed);
    assert!(finished.error.is_some());
}

/// A work order that is still queued (never leased) is force-canceled
/// cleanly, without ever entering the iteration loop.
#[tokio::test]
async fn force_cancel_before_lease_lands_in_canceled() {
    let state_dir = tempfile::tempdir().unwrap();
    let workspace_dir = tempfile::tempdir().unwrap();

    // max_concurrent = 0 so the work order is admitted into the queue but
    // never dequeued, letting the test observe a clean pre-lease cancel.
    let app = Arc::new(
        Application::new(state_dir.path().to_path_buf(), driver_registry_saying_done(), 10, 0, FakeClock::new())
            .unwrap(),
    );

    let wo = work_order(workspace_dir.path().to_path_buf(), format!("inline:{}", plan_json(&[], 3)));
    let id = wo.id;
    app.submit(wo).unwrap();

    app.force_cancel(id).unwrap();

    let finished = app.get_work_order(id).unwrap();
    assert_eq!(finished.status, WorkOrderStatus::Canceled);
}

/// Any workspace source other than `Local` is rejected up front rather than
/// silently attempted, since materializing it is out of the daemon's scope.
#[tokio::test]
async fn non_local_workspace_source_fails_fast() {
    let state_dir = tempfile::tempdir().unwrap();

    let app = Arc::new(
        Application::new(state_dir.path().to_path_buf(), driver_registry_saying_done(), 10, 2, FakeClock::new())
            .unwrap(),
    );

    let wo = WorkOrder::new(
        "Clone and fix the failing integration test",
        WorkspaceSource::Git { url: "https://example.com/repo.git".to_string(), branch: Some("main".to_string()) },
        "fake-driver",
        3,
        3600,
        format!("inline:{}", plan_json(&[], 3)),
        SecurityPolicy::default(),
        chrono::Utc::now(),
    )
    .unwrap();
    let id = wo.id;
    app.submit(wo).unwrap();

    let shutdown = CancellationToken::new();
    let app_clone = Arc::clone(&app);
    let shutdown_clone = shutdown.clone();
    let handle = tokio::spawn(async move { app_clone.run(shutdown_clone).await });

    let finished = wait_for_terminal(&app, id).await;
    shutdown.cancel();
    let _ = handle.await;

    assert_eq!(finished.status, WorkOrderStatus::Failed);
    assert!(finished.error.unwrap().contains("materialize"));
}

/// A path escaping the sandbox root (declared in a work order's
/// `SecurityPolicy.forbidden_paths` spirit — enforced at the sandbox layer
/// regardless of policy, since every path a gate or driver touches is
/// resolved against the workspace root) is rejected rather than followed.
#[tokio::test]
async fn sandbox_rejects_path_traversal_outside_workspace_root() {
    let workspace_dir = tempfile::tempdir().unwrap();
    let provider = SubprocessSandboxProvider;
    let sandbox = provider.acquire(workspace_dir.path().to_path_buf()).await.unwrap();

    let err = sandbox.write_file(std::path::Path::new("../../etc/passwd"), b"pwned").await.unwrap_err();
    assert!(matches!(err, SandboxError::PathEscape(_)), "expected a path escape rejection, got {err:?}");

    // A legitimate write inside the root still works.
    sandbox.write_file(std::path::Path::new("notes.txt"), b"hello").await.unwrap();
    let content = sandbox.read_file(std::path::Path::new("notes.txt")).await.unwrap();
    assert_eq!(content, b"hello");
}

/// Queue admission enforces `max_queue_size` independently of the daemon:
/// a work order submitted beyond capacity is rejected rather than silently
/// dropped or blocking the caller.
#[test]
fn queue_rejects_submissions_past_capacity() {
    let (queue, _ready_rx) = Queue::new(1, 1);
    let first = agentgate_core::WorkOrderId::new();
    let second = agentgate_core::WorkOrderId::new();
    queue.enqueue(first).unwrap();
    assert!(queue.enqueue(second).is_err());
}

/// The broadcaster only fans an event out to connections actually
/// subscribed to that work order.
#[test]
fn broadcaster_only_delivers_to_subscribed_connections() {
    let broadcaster = Broadcaster::new();
    let (subscribed, mut subscribed_rx) = broadcaster.register();
    let (unsubscribed, mut unsubscribed_rx) = broadcaster.register();

    let work_order_id = agentgate_core::WorkOrderId::new();
    broadcaster.subscribe(subscribed, work_order_id, None);

    let event = agentgate_core::Event::new(
        work_order_id,
        None,
        chrono::Utc::now(),
        agentgate_core::EventPayload::StateTransition {
            from: agentgate_core::run::RunState::Queued,
            to: agentgate_core::run::RunState::Leased,
        },
    );
    broadcaster.emit(event);

    assert!(subscribed_rx.try_recv().is_ok());
    assert!(unsubscribed_rx.try_recv().is_err());
}
