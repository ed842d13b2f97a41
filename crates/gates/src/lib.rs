// SPDX-License-Identifier: MIT

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! agentgate-gates: verification gate runners (C4) — contracts, declared
//! commands, custom commands, convergence, and CI signal polling.

mod ci_signal;
mod command;
mod context;
mod contracts;
mod convergence;
mod custom_command;
mod error;
mod glob_util;
mod naming;
mod runner;

pub use ci_signal::{CiOutcome, CiSignalRunner, CiSignalSource};
pub use command::CommandRunner;
pub use context::GateContext;
pub use contracts::ContractsRunner;
pub use convergence::ConvergenceRunner;
pub use custom_command::CustomCommandRunner;
pub use error::GateConfigError;
pub use runner::{GateRunner, GateRunnerRegistry};
