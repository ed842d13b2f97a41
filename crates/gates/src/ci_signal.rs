// SPDX-License-Identifier: MIT

//! CI / external signal gate: polls an external system for terminal status.
//!
//! The actual git-hosting-provider API client is out of scope for this
//! harness (spec §1); callers inject a [`CiSignalSource`] that knows how to
//! poll one concrete CI provider.

use crate::context::GateContext;
use crate::runner::GateRunner;
use agentgate_core::gate_plan::CiSignalCheck;
use agentgate_core::{GateFailure, GateResult, WorkOrderId};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub enum CiOutcome {
    Success,
    Failure { job: Option<String>, step: Option<String>, detail: Option<String> },
    Cancelled,
}

/// Polls one external CI/workflow run for its current status.
#[async_trait]
pub trait CiSignalSource: Send + Sync {
    /// `None` means the run is still in progress.
    async fn poll(&self, workflow: &str) -> Option<CiOutcome>;
}

pub struct CiSignalRunner {
    check: CiSignalCheck,
    source: Arc<dyn CiSignalSource>,
}

impl CiSignalRunner {
    pub fn new(check: CiSignalCheck, source: Arc<dyn CiSignalSource>) -> Self {
        Self { check, source }
    }
}

#[async_trait]
impl GateRunner for CiSignalRunner {
    fn check_type(&self) -> &'static str {
        "ci_signal"
    }

    async fn run(&self, _ctx: &GateContext<'_>, gate_name: &str) -> GateResult {
        let start = Instant::now();
        let deadline = Duration::from_millis(self.check.timeout_ms);
        let poll_interval = Duration::from_millis(self.check.poll_interval_ms);

        let poll_loop = async {
            loop {
                if let Some(outcome) = self.source.poll(&self.check.workflow).await {
                    return outcome;
                }
                tokio::time::sleep(poll_interval).await;
            }
        };

        let outcome = tokio::time::timeout(deadline, poll_loop).await;
        let duration = start.elapsed();

        match outcome {
            Ok(CiOutcome::Success) => GateResult::pass(gate_name, self.check_type(), duration),
            Ok(CiOutcome::Failure { job, step, detail }) => {
                let message = detail.clone().unwrap_or_else(|| format!("CI workflow `{}` failed", self.check.workflow));
                let mut result = GateResult::fail(gate_name, self.check_type(), duration, vec![GateFailure {
                    workflow: Some(self.check.workflow.clone()),
                    ..GateFailure::message(message)
                }]);
                if let Some(job) = job {
                    result = result.with_detail("job", job.into());
                }
                if let Some(step) = step {
                    result = result.with_detail("step", step.into());
                }
                result
            }
            Ok(CiOutcome::Cancelled) => GateResult::fail(
                gate_name,
                self.check_type(),
                duration,
                vec![GateFailure { workflow: Some(self.check.workflow.clone()), ..GateFailure::message("CI workflow was cancelled") }],
            ),
            Err(_) => GateResult::fail(
                gate_name,
                self.check_type(),
                duration,
                vec![GateFailure {
                    workflow: Some(self.check.workflow.clone()),
                    ..GateFailure::message(format!("timed out waiting for CI workflow `{}`", self.check.workflow))
                }],
            ),
        }
    }

    fn reset(&self, _work_order_id: WorkOrderId) {}
}

#[cfg(test)]
#[path = "ci_signal_tests.rs"]
mod tests;
