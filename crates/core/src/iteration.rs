// SPDX-License-Identifier: MIT

//! Per-iteration history entries, recorded on a [`crate::run::Run`] so the
//! convergence controller (C6) can detect loops and the API can render a
//! timeline.

use crate::gate_result::GateResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What the convergence controller decided to do after an iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IterationDecision {
    Succeed,
    Retry,
    Fail,
}

crate::simple_display! {
    IterationDecision {
        Succeed => "succeed",
        Retry => "retry",
        Fail => "fail",
    }
}

/// One row of a run's iteration history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IterationHistoryEntry {
    pub iteration: u32,
    pub timestamp: DateTime<Utc>,
    pub gate_results: Vec<GateResult>,
    pub decision: IterationDecision,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot_fingerprint: Option<String>,
    /// Compact signature used by the loop detector: the top-5 diagnostics
    /// concatenated as `level:type:file`, in failure order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_signature: Option<String>,
}

/// At most this many diagnostics contribute to the compact error signature.
const MAX_SIGNATURE_DIAGNOSTICS: usize = 5;

impl IterationHistoryEntry {
    pub fn new(
        iteration: u32,
        timestamp: DateTime<Utc>,
        gate_results: Vec<GateResult>,
        decision: IterationDecision,
    ) -> Self {
        let error_signature = compute_error_signature(&gate_results);
        Self { iteration, timestamp, gate_results, decision, snapshot_fingerprint: None, error_signature }
    }

    pub fn with_fingerprint(mut self, fingerprint: impl Into<String>) -> Self {
        self.snapshot_fingerprint = Some(fingerprint.into());
        self
    }
}

/// Build the `level:type:file` compact signature from the first five
/// failures across all gate results, in result order.
fn compute_error_signature(gate_results: &[GateResult]) -> Option<String> {
    let mut parts = Vec::new();
    'outer: for result in gate_results {
        if result.passed {
            continue;
        }
        for failure in &result.failures {
            let level = "error";
            let file = failure.file.as_deref().unwrap_or("-");
            parts.push(format!("{level}:{}:{file}", result.check_type));
            if parts.len() >= MAX_SIGNATURE_DIAGNOSTICS {
                break 'outer;
            }
        }
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate_result::GateFailure;
    use std::time::Duration;

    fn now() -> DateTime<Utc> {
        "2026-01-01T00:00:00Z".parse().unwrap()
    }

    #[test]
    fn error_signature_is_none_when_all_pass() {
        let results = vec![GateResult::pass("g", "contracts", Duration::from_millis(1))];
        let entry = IterationHistoryEntry::new(1, now(), results, IterationDecision::Succeed);
        assert!(entry.error_signature.is_none());
    }

    #[test]
    fn error_signature_caps_at_five_diagnostics() {
        let failures: Vec<GateFailure> = (0..8)
            .map(|i| GateFailure { file: Some(format!("f{i}.rs")), ..GateFailure::message("bad") })
            .collect();
        let results = vec![GateResult::fail("g", "command", Duration::from_millis(1), failures)];
        let entry = IterationHistoryEntry::new(2, now(), results, IterationDecision::Retry);
        let sig = entry.error_signature.unwrap();
        assert_eq!(sig.split(',').count(), 5);
        assert!(sig.starts_with("error:command:f0.rs"));
    }

    #[test]
    fn decision_display_is_lowercase() {
        assert_eq!(IterationDecision::Retry.to_string(), "retry");
    }
}
