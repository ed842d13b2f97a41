// SPDX-License-Identifier: MIT

//! Workspace identifier and lifecycle status.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

crate::define_id! {
    /// Unique identifier for a workspace (filesystem root + history backend).
    pub struct WorkspaceId("wks-");
}

/// Lifecycle status of a workspace.
///
/// Invariant: at most one active lease per workspace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkspaceStatus {
    #[default]
    Available,
    Leased,
    Error {
        reason: String,
    },
}

crate::simple_display! {
    WorkspaceStatus {
        Available => "available",
        Leased => "leased",
        Error(..) => "error",
    }
}

/// A filesystem root plus a content-addressed history backend (git).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workspace {
    pub id: WorkspaceId,
    pub root_path: PathBuf,
    pub status: WorkspaceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lease_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leased_at: Option<chrono::DateTime<chrono::Utc>>,
    pub history_initialized: bool,
}

impl Workspace {
    pub fn new(root_path: PathBuf) -> Self {
        Self {
            id: WorkspaceId::new(),
            root_path,
            status: WorkspaceStatus::Available,
            lease_id: None,
            leased_at: None,
            history_initialized: false,
        }
    }

    pub fn is_leased(&self) -> bool {
        matches!(self.status, WorkspaceStatus::Leased)
    }

    /// Acquire an exclusive lease. Fails if already leased.
    pub fn lease(&mut self, lease_id: impl Into<String>, at: chrono::DateTime<chrono::Utc>) -> bool {
        if self.is_leased() {
            return false;
        }
        self.status = WorkspaceStatus::Leased;
        self.lease_id = Some(lease_id.into());
        self.leased_at = Some(at);
        true
    }

    pub fn release(&mut self) {
        self.status = WorkspaceStatus::Available;
        self.lease_id = None;
        self.leased_at = None;
    }
}

#[cfg(test)]
#[path = "workspace_tests.rs"]
mod tests;
