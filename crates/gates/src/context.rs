// SPDX-License-Identifier: MIT

use agentgate_core::WorkOrderId;
use agentgate_sandbox::Sandbox;
use std::path::{Path, PathBuf};

/// Everything a [`crate::GateRunner`] needs to evaluate one gate for one
/// iteration of one work order.
pub struct GateContext<'a> {
    pub work_order_id: WorkOrderId,
    pub iteration: u32,
    pub workspace_root: PathBuf,
    pub sandbox: &'a dyn Sandbox,
    /// Content used by the convergence runner's similarity comparison —
    /// typically the concatenated text of changed files.
    pub content_fingerprint_input: String,
}

impl<'a> GateContext<'a> {
    pub fn resolve(&self, relative: &str) -> PathBuf {
        self.workspace_root.join(relative)
    }

    pub fn root(&self) -> &Path {
        &self.workspace_root
    }
}
