// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Turn/prompt constraints passed to the agent process.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentConstraints {
    pub max_turns: Option<u32>,
    pub additional_system_prompt: Option<String>,
}

/// One invocation of an agent driver.
#[derive(Debug, Clone)]
pub struct AgentRequest {
    pub workspace_path: PathBuf,
    pub task_prompt: String,
    pub prior_feedback: Option<String>,
    pub session_id: Option<String>,
    pub constraints: AgentConstraints,
    pub timeout: Duration,
    pub gate_plan_summary: Option<String>,
}

impl AgentRequest {
    pub fn new(workspace_path: PathBuf, task_prompt: impl Into<String>, timeout: Duration) -> Self {
        Self {
            workspace_path,
            task_prompt: task_prompt.into(),
            prior_feedback: None,
            session_id: None,
            constraints: AgentConstraints::default(),
            timeout,
            gate_plan_summary: None,
        }
    }
}

/// What the driver's event callback carries, beyond the core [`agentgate_core::EventPayload`]:
/// the work order/run context needed to stamp emitted events.
#[derive(Debug, Clone, Copy)]
pub struct StreamContext {
    pub work_order_id: agentgate_core::WorkOrderId,
    pub run_id: agentgate_core::RunId,
}
