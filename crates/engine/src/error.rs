// SPDX-License-Identifier: MIT

use agentgate_core::run::{RunEvent, RunState};
use agentgate_driver::DriverError;
use agentgate_snapshot::SnapshotError;

#[derive(Debug, thiserror::Error)]
pub enum TransitionError {
    #[error("event {event:?} is not valid from state {state}")]
    Illegal { state: RunState, event: RunEvent },

    #[error("state {0} is terminal and accepts no further events")]
    Terminal(RunState),
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("agent driver failed: {0}")]
    Driver(#[from] DriverError),

    #[error("snapshot failed: {0}")]
    Snapshot(#[from] SnapshotError),

    #[error("run state transition rejected: {0}")]
    Transition(#[from] TransitionError),

    #[error("gate plan declares no duration for maxWallClock: {0:?}")]
    InvalidWallClock(String),

    #[error("loop canceled")]
    Canceled,
}
