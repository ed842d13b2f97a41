// SPDX-License-Identifier: MIT

use crate::context::GateContext;
use agentgate_core::{GateResult, WorkOrderId};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

/// A single verification check (spec §4.4). Implementations validate their
/// own config at construction and never let an internal error abort the
/// run — failures are recorded as a failed [`GateResult`] instead (spec §7).
#[async_trait]
pub trait GateRunner: Send + Sync {
    fn check_type(&self) -> &'static str;

    async fn run(&self, ctx: &GateContext<'_>, gate_name: &str) -> GateResult;

    /// Clear any state this runner holds for `work_order_id` (e.g. previous
    /// fingerprints), so a controller can start a fresh run cleanly.
    fn reset(&self, work_order_id: WorkOrderId);
}

/// Keyed by the gate plan's check `type` tag.
#[derive(Default)]
pub struct GateRunnerRegistry {
    runners: HashMap<&'static str, Arc<dyn GateRunner>>,
}

impl GateRunnerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, runner: Arc<dyn GateRunner>) {
        self.runners.insert(runner.check_type(), runner);
    }

    pub fn get(&self, check_type: &str) -> Option<Arc<dyn GateRunner>> {
        self.runners.get(check_type).cloned()
    }

    pub fn reset_all(&self, work_order_id: WorkOrderId) {
        for runner in self.runners.values() {
            runner.reset(work_order_id);
        }
    }
}
