// SPDX-License-Identifier: MIT

//! Convergence gate: compares the current iteration's content fingerprint
//! against the previous iteration's, by exact fingerprint equality or
//! Jaccard similarity over whitespace tokens.

use crate::context::GateContext;
use crate::runner::GateRunner;
use agentgate_core::gate_plan::{ConvergenceCheck, ConvergenceStrategyKind};
use agentgate_core::{GateFailure, GateResult, WorkOrderId};
use async_trait::async_trait;
use parking_lot::Mutex;
use sha2::{Digest, Sha256};
use std::collections::{HashMap, HashSet};
use std::time::Instant;

#[derive(Clone)]
struct PreviousState {
    sha256_hex: String,
    content: String,
}

pub struct ConvergenceRunner {
    check: ConvergenceCheck,
    state: Mutex<HashMap<WorkOrderId, PreviousState>>,
}

impl ConvergenceRunner {
    pub fn new(check: ConvergenceCheck) -> Self {
        Self { check, state: Mutex::new(HashMap::new()) }
    }
}

fn sha256_hex(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hasher.finalize().iter().map(|byte| format!("{byte:02x}")).collect()
}

fn jaccard_similarity(a: &str, b: &str) -> f64 {
    let tokens_a: HashSet<&str> = a.split_whitespace().collect();
    let tokens_b: HashSet<&str> = b.split_whitespace().collect();
    if tokens_a.is_empty() && tokens_b.is_empty() {
        return 1.0;
    }
    let intersection = tokens_a.intersection(&tokens_b).count();
    let union = tokens_a.union(&tokens_b).count();
    if union == 0 {
        1.0
    } else {
        intersection as f64 / union as f64
    }
}

#[async_trait]
impl GateRunner for ConvergenceRunner {
    fn check_type(&self) -> &'static str {
        "convergence"
    }

    async fn run(&self, ctx: &GateContext<'_>, gate_name: &str) -> GateResult {
        let start = Instant::now();
        let current_sha = sha256_hex(&ctx.content_fingerprint_input);
        let previous = self.state.lock().get(&ctx.work_order_id).cloned();

        self.state.lock().insert(
            ctx.work_order_id,
            PreviousState { sha256_hex: current_sha.clone(), content: ctx.content_fingerprint_input.clone() },
        );

        let Some(previous) = previous else {
            let duration = start.elapsed();
            let failure = GateFailure::message("first iteration — no previous state");
            return GateResult::fail(gate_name, self.check_type(), duration, vec![failure]);
        };

        let similarity = match self.check.strategy {
            ConvergenceStrategyKind::Fingerprint => {
                if current_sha == previous.sha256_hex {
                    1.0
                } else {
                    0.0
                }
            }
            ConvergenceStrategyKind::Similarity => jaccard_similarity(&ctx.content_fingerprint_input, &previous.content),
        };

        let duration = start.elapsed();
        let passed = similarity >= self.check.threshold;
        let result = if passed {
            GateResult::pass(gate_name, self.check_type(), duration)
        } else {
            let failure = GateFailure::message(format!("similarity {similarity:.3} below threshold {}", self.check.threshold));
            GateResult::fail(gate_name, self.check_type(), duration, vec![failure])
        };
        result.with_detail("similarity", serde_json::json!(similarity))
    }

    fn reset(&self, work_order_id: WorkOrderId) {
        self.state.lock().remove(&work_order_id);
    }
}

#[cfg(test)]
#[path = "convergence_tests.rs"]
mod tests;
