// SPDX-License-Identifier: MIT

//! Test-only builders. Enabled under `cfg(test)` within this crate and via
//! the `test-support` feature for downstream crates' test code.

use crate::gate_plan::{GatePlan, GateSpec, Limits, OnFailure, OnFailureAction, StrategyKind};
use crate::policy::SecurityPolicy;
use crate::run::Run;
use crate::work_order::{WorkOrder, WorkOrderId, WorkspaceSource};
use crate::workspace::{Workspace, WorkspaceId};
use chrono::{DateTime, Utc};
use std::path::PathBuf;

fn fixed_time() -> DateTime<Utc> {
    "2026-01-01T00:00:00Z".parse().expect("valid fixed timestamp")
}

/// A minimal, always-valid work order for test fixtures.
pub fn sample_work_order() -> WorkOrder {
    WorkOrder::new(
        "Add a health check endpoint to the service",
        WorkspaceSource::Local { path: PathBuf::from("/tmp/agentgate-fixture") },
        "fake-driver",
        3,
        3600,
        "inline:{}".to_string(),
        SecurityPolicy::default(),
        fixed_time(),
    )
    .expect("sample work order is within validation bounds")
}

/// A work order builder variant with an overridable task prompt, for tests
/// that exercise validation failures.
pub fn work_order_with_prompt(prompt: &str) -> Result<WorkOrder, crate::work_order::WorkOrderValidationError> {
    WorkOrder::new(
        prompt,
        WorkspaceSource::Local { path: PathBuf::from("/tmp/agentgate-fixture") },
        "fake-driver",
        3,
        3600,
        "inline:{}".to_string(),
        SecurityPolicy::default(),
        fixed_time(),
    )
}

pub fn sample_workspace() -> Workspace {
    Workspace::new(PathBuf::from("/tmp/agentgate-fixture"))
}

pub fn sample_run(work_order_id: WorkOrderId, workspace_id: WorkspaceId) -> Run {
    Run::new(work_order_id, workspace_id, fixed_time())
}

/// A single-gate "always passes" plan, useful as a baseline fixture.
pub fn sample_gate_plan() -> GatePlan {
    GatePlan {
        version: 1,
        strategy: StrategyKind::Fixed,
        config: serde_json::json!({}),
        gates: vec![GateSpec {
            name: "contracts".to_string(),
            check: crate::gate_plan::GateCheck::Contracts(Default::default()),
            on_failure: OnFailure { action: OnFailureAction::Stop, max_retries: None },
        }],
        limits: Limits { max_iterations: 3, max_wall_clock: "1h".to_string(), max_cost: None, max_tokens: None },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_work_order_is_valid() {
        let wo = sample_work_order();
        assert_eq!(wo.status, crate::work_order::WorkOrderStatus::Queued);
    }

    #[test]
    fn sample_gate_plan_has_one_gate() {
        assert_eq!(sample_gate_plan().gates.len(), 1);
    }
}
