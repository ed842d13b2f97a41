use super::*;
use agentgate_core::{RunId, WorkOrderId};
use std::process::Stdio;

fn now() -> DateTime<Utc> {
    Utc::now()
}

#[test]
fn register_rejects_a_missing_pid() {
    let (registry, _events) = ProcessRegistry::new();
    let err = registry.register(WorkOrderId::new(), RunId::new(), None, now()).unwrap_err();
    assert!(matches!(err, ProcessError::MissingPid));
}

#[test]
fn register_replaces_a_prior_entry_for_the_same_work_order() {
    let (registry, _events) = ProcessRegistry::new();
    let id = WorkOrderId::new();
    registry.register(id, RunId::new(), Some(111), now()).unwrap();
    registry.register(id, RunId::new(), Some(222), now()).unwrap();
    assert_eq!(registry.get(id).unwrap().pid, 222);
}

#[test]
fn mark_exited_is_idempotent() {
    let (registry, _events) = ProcessRegistry::new();
    let id = WorkOrderId::new();
    registry.register(id, RunId::new(), Some(999), now()).unwrap();
    assert!(registry.mark_exited(id, Some(0), None));
    assert!(!registry.mark_exited(id, Some(1), None));
    assert_eq!(registry.get(id).unwrap().exit_code, Some(0));
}

#[test]
fn stale_flags_processes_past_their_max_lifetime() {
    let (registry, _events) = ProcessRegistry::new();
    let old = WorkOrderId::new();
    let fresh = WorkOrderId::new();
    let reference = now();
    registry.register(old, RunId::new(), Some(1), reference - chrono::Duration::seconds(120)).unwrap();
    registry.register(fresh, RunId::new(), Some(2), reference).unwrap();

    let stale = registry.stale(reference, Duration::from_secs(60));
    assert_eq!(stale, vec![old]);
}

#[test]
fn stale_ignores_already_exited_processes() {
    let (registry, _events) = ProcessRegistry::new();
    let id = WorkOrderId::new();
    let reference = now();
    registry.register(id, RunId::new(), Some(1), reference - chrono::Duration::seconds(120)).unwrap();
    registry.mark_exited(id, Some(0), None);

    assert!(registry.stale(reference, Duration::from_secs(60)).is_empty());
}

#[tokio::test]
async fn kill_terminates_a_live_process() {
    let (registry, _events) = ProcessRegistry::new();
    let mut child = std::process::Command::new("sleep")
        .arg("5")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();
    let pid = child.id();
    let id = WorkOrderId::new();
    registry.register(id, RunId::new(), Some(pid), now()).unwrap();

    let outcome = registry.kill(id, Duration::from_millis(50)).await;
    assert!(outcome.success);

    let status = child.wait().unwrap();
    assert!(!status.success());
}

#[tokio::test]
async fn force_kill_skips_the_grace_period() {
    let (registry, _events) = ProcessRegistry::new();
    let mut child = std::process::Command::new("sleep")
        .arg("5")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();
    let pid = child.id();
    let id = WorkOrderId::new();
    registry.register(id, RunId::new(), Some(pid), now()).unwrap();

    let outcome = registry.force_kill(id).await;
    assert!(outcome.success);
    assert!(outcome.forced_kill);

    let status = child.wait().unwrap();
    assert!(!status.success());
}
