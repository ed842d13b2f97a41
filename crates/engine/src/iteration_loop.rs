// SPDX-License-Identifier: MIT

//! C6 iteration loop orchestration (spec §4.6 step 2): wires the
//! host-supplied build/snapshot/gate-check/feedback callbacks together with
//! a [`ConvergenceStrategy`] and the [`LoopDetector`], enforcing the
//! declared caps each pass.

use crate::error::EngineError;
use crate::loop_detector::{Fingerprint, LoopDetector};
use crate::strategy::{ConvergenceStrategy, Decision, LoopContext};
use agentgate_core::clock::Clock;
use agentgate_core::gate_plan::Limits;
use agentgate_core::iteration::IterationDecision;
use agentgate_core::{parse_duration_spec, GateResult, IterationHistoryEntry};
use async_trait::async_trait;
use std::collections::BTreeMap;

/// What [`LoopHost::on_snapshot`] reports about the workspace at the end of
/// one iteration.
#[derive(Debug, Clone)]
pub struct IterationSnapshot {
    pub sha: String,
    pub file_hashes: BTreeMap<String, String>,
    pub files_changed: u32,
    pub insertions: u32,
    pub deletions: u32,
    /// Text handed to gate runners (e.g. the convergence gate's similarity
    /// comparison) as `GateContext::content_fingerprint_input`.
    pub content_fingerprint_input: String,
}

/// What [`LoopHost::on_build`] reports about one agent invocation.
#[derive(Debug, Clone, Default)]
pub struct BuildOutcome {
    pub tool_calls: u32,
    pub agent_signaled_done: bool,
}

/// Host-supplied callbacks the loop drives once per iteration. A concrete
/// implementation wires these to `agentgate_driver::AgentDriver::execute`,
/// `agentgate_snapshot::{capture, file_hashes}`, and the work order's
/// `agentgate_gates::GateRunnerRegistry`.
#[async_trait]
pub trait LoopHost: Send + Sync {
    async fn on_build(&self, iteration: u32, feedback: Option<&str>) -> Result<BuildOutcome, EngineError>;

    async fn on_snapshot(&self, iteration: u32) -> Result<IterationSnapshot, EngineError>;

    async fn on_gate_check(&self, iteration: u32, snapshot: &IterationSnapshot) -> Result<Vec<GateResult>, EngineError>;

    async fn on_feedback(&self, iteration: u32, gate_results: &[GateResult]) -> Result<String, EngineError>;
}

/// Final disposition of a completed iteration loop.
#[derive(Debug, Clone, PartialEq)]
pub enum LoopOutcome {
    Converged,
    Diverged { reason: String },
    Escalated { reason: String },
}

/// Mirrors `agentgate_core::iteration::compute_error_signature`: the
/// `level:type:file` signature of the first five failures, in result
/// order. Needed here (ahead of the final [`IterationHistoryEntry`]) to
/// feed the loop detector's fingerprint.
fn compact_error_signature(gate_results: &[GateResult]) -> Option<String> {
    const MAX: usize = 5;
    let mut parts = Vec::new();
    'outer: for result in gate_results {
        if result.passed {
            continue;
        }
        for failure in &result.failures {
            let file = failure.file.as_deref().unwrap_or("-");
            parts.push(format!("error:{}:{file}", result.check_type));
            if parts.len() >= MAX {
                break 'outer;
            }
        }
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(","))
    }
}

/// Runs the iteration loop to completion, returning its outcome plus the
/// full per-iteration history (spec §4.6). `clock` drives both the
/// `maxWallClock` cap and the history timestamps, so tests can replay a
/// loop deterministically with `FakeClock`.
pub async fn run_iteration_loop<C: Clock>(
    host: &dyn LoopHost,
    strategy: &mut dyn ConvergenceStrategy,
    limits: &Limits,
    clock: &C,
) -> Result<(LoopOutcome, Vec<IterationHistoryEntry>), EngineError> {
    let max_wall_clock = parse_duration_spec(&limits.max_wall_clock)
        .ok_or_else(|| EngineError::InvalidWallClock(limits.max_wall_clock.clone()))?;
    let started = clock.now();

    let mut detector = LoopDetector::new();
    let mut history = Vec::new();
    let mut previous_diagnostics: u32 = 0;
    let mut feedback: Option<String> = None;

    strategy.on_loop_start();

    let mut iteration: u32 = 0;
    loop {
        iteration += 1;

        if iteration > limits.max_iterations {
            return Ok((
                LoopOutcome::Diverged { reason: format!("exceeded maxIterations {}", limits.max_iterations) },
                history,
            ));
        }
        let elapsed = clock.now().duration_since(started);
        if elapsed > max_wall_clock {
            return Ok((
                LoopOutcome::Diverged { reason: format!("exceeded maxWallClock {}", limits.max_wall_clock) },
                history,
            ));
        }

        strategy.on_iteration_start(iteration);

        let build = host.on_build(iteration, feedback.as_deref()).await?;
        let snapshot = host.on_snapshot(iteration).await?;
        let gate_results = host.on_gate_check(iteration, &snapshot).await?;

        let current_diagnostics: u32 = gate_results.iter().map(|r| r.failures.len() as u32).sum();
        let errors_fixed = previous_diagnostics.saturating_sub(current_diagnostics);
        let errors_remaining = current_diagnostics;
        previous_diagnostics = current_diagnostics;

        let error_signature = compact_error_signature(&gate_results);
        detector.push(Fingerprint {
            iteration,
            sha: snapshot.sha.clone(),
            file_hashes: snapshot.file_hashes.clone(),
            error_signature,
        });

        let loop_ctx = LoopContext {
            iteration,
            elapsed,
            gate_results: &gate_results,
            errors_fixed,
            errors_remaining,
            agent_signaled_done: build.agent_signaled_done,
        };
        let all_passed = loop_ctx.all_gates_passed();

        let (decision, reason) = match detector.detect() {
            Some(finding) => (
                Decision::Escalate,
                format!("loop detected: {} pattern (confidence {:.2})", finding.kind, finding.confidence),
            ),
            None => strategy.should_continue(&loop_ctx),
        };

        let iteration_decision = if all_passed {
            IterationDecision::Succeed
        } else if matches!(decision, Decision::Stop | Decision::Escalate) {
            IterationDecision::Fail
        } else {
            IterationDecision::Retry
        };

        let entry = IterationHistoryEntry::new(iteration, clock.utc_now(), gate_results.clone(), iteration_decision)
            .with_fingerprint(snapshot.sha.clone());
        history.push(entry);

        if matches!(decision, Decision::Stop | Decision::Escalate) {
            let outcome = if all_passed {
                LoopOutcome::Converged
            } else if matches!(decision, Decision::Escalate) {
                LoopOutcome::Escalated { reason }
            } else {
                LoopOutcome::Diverged { reason }
            };
            return Ok((outcome, history));
        }

        if all_passed {
            return Ok((LoopOutcome::Converged, history));
        }

        feedback = Some(host.on_feedback(iteration, &gate_results).await?);
    }
}

#[cfg(test)]
#[path = "iteration_loop_tests.rs"]
mod tests;
