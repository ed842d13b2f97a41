// SPDX-License-Identifier: MIT

//! Arbitrary shell command gate with a declared expected exit code and
//! timeout (spec §4.4 "custom command").

use crate::context::GateContext;
use crate::error::GateConfigError;
use crate::runner::GateRunner;
use agentgate_core::gate_plan::CustomCommandCheck;
use agentgate_core::{parse_duration_spec, GateFailure, GateResult, WorkOrderId};
use agentgate_sandbox::ExecRequest;
use async_trait::async_trait;
use std::time::{Duration, Instant};

const TRUNCATE_LIMIT_BYTES: usize = 10_000;
const TRUNCATE_MARKER: &str = "\n...[truncated]";

fn truncate_output(s: &str) -> String {
    if s.len() <= TRUNCATE_LIMIT_BYTES {
        return s.to_string();
    }
    let mut end = TRUNCATE_LIMIT_BYTES;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}{}", &s[..end], TRUNCATE_MARKER)
}

pub struct CustomCommandRunner {
    check: CustomCommandCheck,
    timeout: Duration,
}

impl CustomCommandRunner {
    pub fn new(check: CustomCommandCheck) -> Result<Self, GateConfigError> {
        let timeout = parse_duration_spec(&check.timeout).ok_or_else(|| GateConfigError::Invalid {
            gate: "custom_command".to_string(),
            reason: format!("invalid timeout spec `{}`", check.timeout),
        })?;
        Ok(Self { check, timeout })
    }
}

#[async_trait]
impl GateRunner for CustomCommandRunner {
    fn check_type(&self) -> &'static str {
        "custom_command"
    }

    async fn run(&self, ctx: &GateContext<'_>, gate_name: &str) -> GateResult {
        let start = Instant::now();
        let request = ExecRequest::new("sh", self.timeout).arg("-c").arg(self.check.command.as_str());
        let outcome = ctx.sandbox.execute(request).await;
        let duration = start.elapsed();

        match outcome {
            Ok(result) => {
                let matched = !result.timed_out && result.exit_code == Some(self.check.expected_exit);
                let stdout = truncate_output(&result.stdout);
                let stderr = truncate_output(&result.stderr);
                let gate_result = if matched {
                    GateResult::pass(gate_name, self.check_type(), duration)
                } else {
                    let failure = GateFailure {
                        command: Some(self.check.command.clone()),
                        ..GateFailure::message(format!(
                            "expected exit {}, got {} (timed_out={})",
                            self.check.expected_exit,
                            result.exit_code.map(|c| c.to_string()).unwrap_or_else(|| "none".into()),
                            result.timed_out
                        ))
                    };
                    GateResult::fail(gate_name, self.check_type(), duration, vec![failure])
                };
                gate_result.with_detail("stdout", stdout.into()).with_detail("stderr", stderr.into())
            }
            Err(err) => {
                let failure = GateFailure { command: Some(self.check.command.clone()), ..GateFailure::message(err.to_string()) };
                GateResult::fail(gate_name, self.check_type(), duration, vec![failure])
            }
        }
    }

    fn reset(&self, _work_order_id: WorkOrderId) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_malformed_timeout_at_construction() {
        let check = CustomCommandCheck { command: "echo ok".into(), expected_exit: 0, timeout: "bogus".into() };
        assert!(CustomCommandRunner::new(check).is_err());
    }

    #[test]
    fn truncates_long_output_with_marker() {
        let long = "x".repeat(20_000);
        let out = truncate_output(&long);
        assert!(out.len() <= TRUNCATE_LIMIT_BYTES + TRUNCATE_MARKER.len());
        assert!(out.ends_with(TRUNCATE_MARKER));
    }

    #[test]
    fn short_output_is_unchanged() {
        assert_eq!(truncate_output("hi"), "hi");
    }
}
