// SPDX-License-Identifier: MIT

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! agentgate-queue: FIFO work-order admission queue and subprocess registry
//! with SIGTERM-then-SIGKILL kill semantics (C8).

mod error;
mod fifo;
mod monitor;
mod process;

pub use error::{ProcessError, QueueError};
pub use fifo::{ForceCancelResult, Queue};
pub use monitor::run_stale_monitor;
pub use process::{KillOutcome, ManagedProcess, ProcessEvent, ProcessRegistry};
