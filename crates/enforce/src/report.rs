// SPDX-License-Identifier: MIT

//! Types produced by the enforcement aggregator (see [`crate::aggregate`]).

use agentgate_core::Finding;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The effect a sensitivity level has on the aggregate verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Deny,
    Block,
    Warn,
    Log,
}

/// Default sensitivity -> action map. `Deny` and `Block` both land findings
/// in the `blocked` bucket; only their label differs.
pub fn action_for(sensitivity: agentgate_core::Sensitivity) -> Action {
    use agentgate_core::Sensitivity::*;
    match sensitivity {
        Info => Action::Log,
        Warning => Action::Warn,
        Sensitive => Action::Block,
        Restricted => Action::Deny,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Summary {
    pub total: usize,
    pub by_level: BTreeMap<String, usize>,
    pub by_detector: BTreeMap<String, usize>,
    pub scan_duration_ms: u128,
    pub files_scanned: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnforcementReport {
    pub blocked: Vec<Finding>,
    pub warned: Vec<Finding>,
    pub logged: Vec<Finding>,
    pub allowlisted: Vec<Finding>,
    pub summary: Summary,
    pub allowed: bool,
}
