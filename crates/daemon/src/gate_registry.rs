// SPDX-License-Identifier: MIT

//! Builds a fresh [`GateRunnerRegistry`] from a gate plan's declared gates.
//!
//! A registry is keyed by check type, not by gate name (see
//! `agentgate_gates::GateRunnerRegistry`), so a gate plan that declares two
//! gates of the same check type collides: the later one wins. Gate plans
//! are expected to declare at most one gate per check type; this is not
//! enforced here, matching the registry's own pass-through `register`.

use agentgate_core::gate_plan::{GateCheck, GateSpec};
use agentgate_gates::{
    CiOutcome, CiSignalRunner, CiSignalSource, CommandRunner, ContractsRunner, ConvergenceRunner, CustomCommandRunner, GateRunnerRegistry,
};
use async_trait::async_trait;
use std::sync::Arc;

use crate::error::ApplicationError;

/// Stand-in for the git-hosting-provider CI client the harness never
/// implements itself (out of scope, spec §1). Fails fast with a clear
/// message rather than polling until `timeout_ms` expires.
pub struct NullCiSignalSource;

#[async_trait]
impl CiSignalSource for NullCiSignalSource {
    async fn poll(&self, workflow: &str) -> Option<CiOutcome> {
        Some(CiOutcome::Failure {
            job: None,
            step: None,
            detail: Some(format!("no CiSignalSource configured to poll workflow `{workflow}`")),
        })
    }
}

pub fn build_gate_registry(gates: &[GateSpec], ci_signal_source: Arc<dyn CiSignalSource>) -> Result<GateRunnerRegistry, ApplicationError> {
    let mut registry = GateRunnerRegistry::new();
    for spec in gates {
        match spec.check.clone() {
            GateCheck::Contracts(check) => registry.register(Arc::new(ContractsRunner::new(check))),
            GateCheck::Command(check) => registry.register(Arc::new(CommandRunner::new(check))),
            GateCheck::CustomCommand(check) => registry.register(Arc::new(CustomCommandRunner::new(check)?)),
            GateCheck::Convergence(check) => registry.register(Arc::new(ConvergenceRunner::new(check))),
            GateCheck::CiSignal(check) => registry.register(Arc::new(CiSignalRunner::new(check, ci_signal_source.clone()))),
        }
    }
    Ok(registry)
}
