use super::*;
use agentgate_sandbox::{Sandbox, SandboxProvider, SubprocessSandboxProvider};

async fn sandbox_over(dir: &std::path::Path) -> Box<dyn Sandbox> {
    SubprocessSandboxProvider::default().acquire(dir.to_path_buf()).await.unwrap()
}

fn ctx<'a>(id: WorkOrderId, root: &std::path::Path, sandbox: &'a dyn Sandbox, content: &str) -> GateContext<'a> {
    GateContext {
        work_order_id: id,
        iteration: 1,
        workspace_root: root.to_path_buf(),
        sandbox,
        content_fingerprint_input: content.to_string(),
    }
}

#[tokio::test]
async fn first_iteration_always_fails_with_reason() {
    let dir = tempfile::tempdir().unwrap();
    let sandbox = sandbox_over(dir.path()).await;
    let runner = ConvergenceRunner::new(ConvergenceCheck { strategy: ConvergenceStrategyKind::Fingerprint, threshold: 1.0 });
    let id = WorkOrderId::new();
    let result = runner.run(&ctx(id, dir.path(), sandbox.as_ref(), "hello world"), "convergence").await;
    assert!(!result.passed);
    assert_eq!(result.failures[0].message, "first iteration — no previous state");
}

#[tokio::test]
async fn fingerprint_strategy_passes_on_identical_content() {
    let dir = tempfile::tempdir().unwrap();
    let sandbox = sandbox_over(dir.path()).await;
    let runner = ConvergenceRunner::new(ConvergenceCheck { strategy: ConvergenceStrategyKind::Fingerprint, threshold: 1.0 });
    let id = WorkOrderId::new();
    runner.run(&ctx(id, dir.path(), sandbox.as_ref(), "same"), "convergence").await;
    let second = runner.run(&ctx(id, dir.path(), sandbox.as_ref(), "same"), "convergence").await;
    assert!(second.passed);
}

#[tokio::test]
async fn fingerprint_strategy_fails_on_changed_content() {
    let dir = tempfile::tempdir().unwrap();
    let sandbox = sandbox_over(dir.path()).await;
    let runner = ConvergenceRunner::new(ConvergenceCheck { strategy: ConvergenceStrategyKind::Fingerprint, threshold: 1.0 });
    let id = WorkOrderId::new();
    runner.run(&ctx(id, dir.path(), sandbox.as_ref(), "one"), "convergence").await;
    let second = runner.run(&ctx(id, dir.path(), sandbox.as_ref(), "two"), "convergence").await;
    assert!(!second.passed);
}

#[tokio::test]
async fn similarity_strategy_passes_above_threshold() {
    let dir = tempfile::tempdir().unwrap();
    let sandbox = sandbox_over(dir.path()).await;
    let runner = ConvergenceRunner::new(ConvergenceCheck { strategy: ConvergenceStrategyKind::Similarity, threshold: 0.5 });
    let id = WorkOrderId::new();
    runner.run(&ctx(id, dir.path(), sandbox.as_ref(), "a b c d"), "convergence").await;
    let second = runner.run(&ctx(id, dir.path(), sandbox.as_ref(), "a b c e"), "convergence").await;
    assert!(second.passed, "3/5 jaccard should clear a 0.5 threshold");
}

#[tokio::test]
async fn reset_clears_stored_state() {
    let dir = tempfile::tempdir().unwrap();
    let sandbox = sandbox_over(dir.path()).await;
    let runner = ConvergenceRunner::new(ConvergenceCheck { strategy: ConvergenceStrategyKind::Fingerprint, threshold: 1.0 });
    let id = WorkOrderId::new();
    runner.run(&ctx(id, dir.path(), sandbox.as_ref(), "x"), "convergence").await;
    runner.reset(id);
    let after_reset = runner.run(&ctx(id, dir.path(), sandbox.as_ref(), "x"), "convergence").await;
    assert!(!after_reset.passed, "reset should make this look like a first iteration again");
}
