// SPDX-License-Identifier: MIT

//! L1-L3 declared command gates (tests / build / lint): run a named shell
//! command in the sandbox and record its exit code and stderr.

use crate::context::GateContext;
use crate::runner::GateRunner;
use agentgate_core::gate_plan::CommandCheck;
use agentgate_core::{GateFailure, GateResult, WorkOrderId};
use agentgate_sandbox::ExecRequest;
use async_trait::async_trait;
use std::time::{Duration, Instant};

const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(300);

pub struct CommandRunner {
    check: CommandCheck,
}

impl CommandRunner {
    pub fn new(check: CommandCheck) -> Self {
        Self { check }
    }
}

#[async_trait]
impl GateRunner for CommandRunner {
    fn check_type(&self) -> &'static str {
        "command"
    }

    async fn run(&self, ctx: &GateContext<'_>, gate_name: &str) -> GateResult {
        let start = Instant::now();
        let request = ExecRequest::new("sh", DEFAULT_COMMAND_TIMEOUT).arg("-c").arg(self.check.command.as_str());
        let outcome = ctx.sandbox.execute(request).await;
        let duration = start.elapsed();

        match outcome {
            Ok(result) if result.success() => {
                GateResult::pass(gate_name, self.check_type(), duration).with_detail("label", self.check.label.clone().into())
            }
            Ok(result) => {
                let failure = GateFailure {
                    command: Some(self.check.command.clone()),
                    ..GateFailure::message(format!(
                        "`{}` exited {} (timed_out={})",
                        self.check.label,
                        result.exit_code.map(|c| c.to_string()).unwrap_or_else(|| "none".into()),
                        result.timed_out
                    ))
                };
                GateResult::fail(gate_name, self.check_type(), duration, vec![failure])
                    .with_detail("stderr", result.stderr.into())
                    .with_detail("label", self.check.label.clone().into())
            }
            Err(err) => {
                let failure = GateFailure { command: Some(self.check.command.clone()), ..GateFailure::message(err.to_string()) };
                GateResult::fail(gate_name, self.check_type(), duration, vec![failure])
            }
        }
    }

    fn reset(&self, _work_order_id: WorkOrderId) {}
}
