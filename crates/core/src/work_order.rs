// SPDX-License-Identifier: MIT

//! Work order: an immutable-after-submission task request.

use crate::run::RunId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

crate::define_id! {
    /// Unique identifier for a work order.
    pub struct WorkOrderId("wko-");
}

/// Where the agent's workspace comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WorkspaceSource {
    Local {
        path: PathBuf,
    },
    Git {
        url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        branch: Option<String>,
    },
    Fresh {
        dest_path: PathBuf,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        template_kind: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        project_name: Option<String>,
    },
    GitHub {
        owner: String,
        repo: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        branch: Option<String>,
    },
}

/// Lifecycle status of a work order.
///
/// Invariant: status only advances along
/// `queued -> running -> {succeeded|failed|canceled}`; terminal is permanent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkOrderStatus {
    Queued,
    Running,
    Succeeded,
    Failed,
    Canceled,
}

impl WorkOrderStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Canceled)
    }

    /// Whether `self -> next` is a legal status advance.
    pub fn can_advance_to(self, next: Self) -> bool {
        use WorkOrderStatus::*;
        matches!(
            (self, next),
            (Queued, Running)
                | (Running, Succeeded)
                | (Running, Failed)
                | (Running, Canceled)
                | (Queued, Canceled)
                | (Queued, Failed)
        )
    }
}

crate::simple_display! {
    WorkOrderStatus {
        Queued => "queued",
        Running => "running",
        Succeeded => "succeeded",
        Failed => "failed",
        Canceled => "canceled",
    }
}

/// Error validating a work order at submission time.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum WorkOrderValidationError {
    #[error("task prompt must be at least 10 characters, got {0}")]
    PromptTooShort(usize),
    #[error("maxIterations must be in 1..=10, got {0}")]
    MaxIterationsOutOfRange(u32),
    #[error("maxWallClockSeconds must be in 60..=86400, got {0}")]
    MaxWallClockOutOfRange(u64),
    #[error("illegal status advance {from} -> {to}")]
    IllegalStatusAdvance { from: WorkOrderStatus, to: WorkOrderStatus },
}

/// An immutable-after-submission task request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkOrder {
    pub id: WorkOrderId,
    pub task_prompt: String,
    pub workspace_source: WorkspaceSource,
    pub agent_driver_key: String,
    pub max_iterations: u32,
    pub max_wall_clock_seconds: u64,
    pub gate_plan_source: String,
    pub security: crate::policy::SecurityPolicy,
    pub status: WorkOrderStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_id: Option<RunId>,
}

impl WorkOrder {
    /// Build and validate a new work order. Returns an error at the
    /// construction boundary rather than admitting an invalid order.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        task_prompt: impl Into<String>,
        workspace_source: WorkspaceSource,
        agent_driver_key: impl Into<String>,
        max_iterations: u32,
        max_wall_clock_seconds: u64,
        gate_plan_source: impl Into<String>,
        security: crate::policy::SecurityPolicy,
        created_at: DateTime<Utc>,
    ) -> Result<Self, WorkOrderValidationError> {
        let task_prompt = task_prompt.into();
        if task_prompt.len() < 10 {
            return Err(WorkOrderValidationError::PromptTooShort(task_prompt.len()));
        }
        if !(1..=10).contains(&max_iterations) {
            return Err(WorkOrderValidationError::MaxIterationsOutOfRange(max_iterations));
        }
        if !(60..=86400).contains(&max_wall_clock_seconds) {
            return Err(WorkOrderValidationError::MaxWallClockOutOfRange(max_wall_clock_seconds));
        }
        Ok(Self {
            id: WorkOrderId::new(),
            task_prompt,
            workspace_source,
            agent_driver_key: agent_driver_key.into(),
            max_iterations,
            max_wall_clock_seconds,
            gate_plan_source: gate_plan_source.into(),
            security,
            status: WorkOrderStatus::Queued,
            created_at,
            completed_at: None,
            error: None,
            run_id: None,
        })
    }

    /// Advance the status, enforcing the monotonic lifecycle invariant.
    pub fn advance_status(
        &mut self,
        next: WorkOrderStatus,
        at: DateTime<Utc>,
    ) -> Result<(), WorkOrderValidationError> {
        if !self.status.can_advance_to(next) {
            return Err(WorkOrderValidationError::IllegalStatusAdvance {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        if next.is_terminal() {
            self.completed_at = Some(at);
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "work_order_tests.rs"]
mod tests;
