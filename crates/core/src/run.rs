// SPDX-License-Identifier: MIT

//! Run: one execution attempt at a work order.

use crate::work_order::WorkOrderId;
use crate::workspace::WorkspaceId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Unique identifier for a run (one attempt at a work order).
    pub struct RunId("run-");
}

/// States of the run state machine (C7). See `agentgate_engine::state` for
/// the transition table and validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Queued,
    Leased,
    Building,
    Snapshotting,
    Verifying,
    Feedback,
    Succeeded,
    Failed,
    Canceled,
}

impl RunState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Canceled)
    }

    pub fn all() -> [RunState; 9] {
        [
            Self::Queued,
            Self::Leased,
            Self::Building,
            Self::Snapshotting,
            Self::Verifying,
            Self::Feedback,
            Self::Succeeded,
            Self::Failed,
            Self::Canceled,
        ]
    }
}

crate::simple_display! {
    RunState {
        Queued => "queued",
        Leased => "leased",
        Building => "building",
        Snapshotting => "snapshotting",
        Verifying => "verifying",
        Feedback => "feedback",
        Succeeded => "succeeded",
        Failed => "failed",
        Canceled => "canceled",
    }
}

/// Events that drive the run state machine (C7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunEvent {
    WorkspaceAcquired,
    BuildStarted,
    BuildCompleted,
    BuildFailed,
    SnapshotCompleted,
    SnapshotFailed,
    VerifyPassed,
    VerifyFailedRetryable,
    VerifyFailedTerminal,
    FeedbackGenerated,
    UserCanceled,
    SystemError,
}

/// Final outcome tag for a terminated run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RunResult {
    Passed,
    FailedVerification,
    FailedBuild,
    FailedTimeout,
    FailedError,
    Canceled,
}

crate::simple_display! {
    RunResult {
        Passed => "passed",
        FailedVerification => "failed-verification",
        FailedBuild => "failed-build",
        FailedTimeout => "failed-timeout",
        FailedError => "failed-error",
        Canceled => "canceled",
    }
}

/// A handle allowing an agent driver to resume a prior session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionHandle(pub String);

/// One execution attempt at a work order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Run {
    pub id: RunId,
    pub work_order_id: WorkOrderId,
    pub workspace_id: WorkspaceId,
    pub iteration: u32,
    pub state: RunState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<RunResult>,
    pub started_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot_before: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot_after: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<SessionHandle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pr_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Run {
    pub fn new(
        work_order_id: WorkOrderId,
        workspace_id: WorkspaceId,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: RunId::new(),
            work_order_id,
            workspace_id,
            iteration: 1,
            state: RunState::Queued,
            result: None,
            started_at,
            completed_at: None,
            snapshot_before: None,
            snapshot_after: None,
            session: None,
            branch: None,
            pr_id: None,
            error: None,
        }
    }
}

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;
