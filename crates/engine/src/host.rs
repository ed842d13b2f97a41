// SPDX-License-Identifier: MIT

//! The production [`LoopHost`]: wires an [`AgentDriver`], a git-backed
//! workspace snapshot, and the work order's [`GateRunnerRegistry`] together,
//! the way spec §4.6's data-flow describes C6 calling C2/C3/C4.

use crate::error::EngineError;
use crate::iteration_loop::{BuildOutcome, IterationSnapshot, LoopHost};
use agentgate_core::gate_plan::{GateSpec, OnFailureAction};
use agentgate_core::{GateFailure, GateResult, WorkOrderId};
use agentgate_driver::{AgentDriver, AgentRequest, ExecuteOptions};
use agentgate_gates::{GateContext, GateRunner, GateRunnerRegistry};
use agentgate_sandbox::Sandbox;
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Drives one work order's iteration loop against a real agent driver,
/// workspace, and gate plan.
pub struct DefaultLoopHost {
    pub driver: Arc<dyn AgentDriver>,
    pub sandbox: Arc<dyn Sandbox>,
    pub gate_registry: Arc<GateRunnerRegistry>,
    pub gates: Vec<GateSpec>,
    pub work_order_id: WorkOrderId,
    pub workspace_root: PathBuf,
    pub task_prompt: String,
    pub agent_timeout: Duration,
}

#[async_trait]
impl LoopHost for DefaultLoopHost {
    async fn on_build(&self, _iteration: u32, feedback: Option<&str>) -> Result<BuildOutcome, EngineError> {
        let mut request = AgentRequest::new(self.workspace_root.clone(), self.task_prompt.clone(), self.agent_timeout);
        request.prior_feedback = feedback.map(str::to_string);

        let result = self.driver.execute(request, ExecuteOptions::default()).await?;
        let agent_signaled_done = result
            .structured_output
            .as_ref()
            .and_then(|value| value.get("done"))
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(false);

        Ok(BuildOutcome { tool_calls: 0, agent_signaled_done })
    }

    async fn on_snapshot(&self, _iteration: u32) -> Result<IterationSnapshot, EngineError> {
        let now = chrono::Utc::now();
        let opts = agentgate_snapshot::CaptureOptions { include_diff_text: true };
        let snapshot = agentgate_snapshot::capture_with(&self.workspace_root, now, opts).await?;
        let file_hashes = agentgate_snapshot::file_hashes(&self.workspace_root).await?;

        Ok(IterationSnapshot {
            sha: snapshot.after_sha,
            file_hashes,
            files_changed: snapshot.files_changed,
            insertions: snapshot.insertions,
            deletions: snapshot.deletions,
            content_fingerprint_input: snapshot.diff.unwrap_or_default(),
        })
    }

    async fn on_gate_check(&self, iteration: u32, snapshot: &IterationSnapshot) -> Result<Vec<GateResult>, EngineError> {
        let mut results = Vec::with_capacity(self.gates.len());

        for spec in &self.gates {
            let ctx = GateContext {
                work_order_id: self.work_order_id,
                iteration,
                workspace_root: self.workspace_root.clone(),
                sandbox: self.sandbox.as_ref(),
                content_fingerprint_input: snapshot.content_fingerprint_input.clone(),
            };

            let result = match self.gate_registry.get(spec.check.type_name()) {
                Some(runner) => run_with_retries(runner.as_ref(), &ctx, spec).await,
                None => GateResult::fail(
                    spec.name.as_str(),
                    spec.check.type_name(),
                    Duration::ZERO,
                    vec![GateFailure::message(format!("no gate runner registered for `{}`", spec.check.type_name()))],
                ),
            };

            let should_stop = !result.passed && spec.on_failure.action == OnFailureAction::Stop;
            results.push(result);
            if should_stop {
                break;
            }
        }

        Ok(results)
    }

    async fn on_feedback(&self, _iteration: u32, gate_results: &[GateResult]) -> Result<String, EngineError> {
        let mut lines = vec!["The previous iteration did not fully pass verification:".to_string()];
        for result in gate_results.iter().filter(|r| !r.passed) {
            for failure in &result.failures {
                let location = match (&failure.file, failure.line) {
                    (Some(file), Some(line)) => format!(" ({file}:{line})"),
                    (Some(file), None) => format!(" ({file})"),
                    _ => String::new(),
                };
                lines.push(format!("- [{}] {}{location}", result.gate_name, failure.message));
            }
        }
        Ok(lines.join("\n"))
    }
}

/// Runs one gate, retrying it up to `onFailure.maxRetries` times when its
/// action is `retry` (spec §4.4) and it keeps failing.
async fn run_with_retries(runner: &dyn GateRunner, ctx: &GateContext<'_>, spec: &GateSpec) -> GateResult {
    let max_attempts = match spec.on_failure.action {
        OnFailureAction::Retry => spec.on_failure.max_retries.unwrap_or(0) + 1,
        _ => 1,
    };

    let mut result = runner.run(ctx, &spec.name).await;
    for _ in 1..max_attempts {
        if result.passed {
            break;
        }
        result = runner.run(ctx, &spec.name).await;
    }
    result
}

#[cfg(test)]
#[path = "host_tests.rs"]
mod tests;
