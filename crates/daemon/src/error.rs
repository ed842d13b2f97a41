// SPDX-License-Identifier: MIT

//! `Application`'s composed error type: every fallible crate boundary it
//! touches folds into this one enum via `#[from]`, the way
//! `agentgate_engine::EngineError` composes the driver/snapshot errors
//! beneath it.

use agentgate_core::work_order::WorkOrderValidationError;
use agentgate_driver::DriverError;
use agentgate_engine::{EngineError, TransitionError};
use agentgate_gates::GateConfigError;
use agentgate_queue::{ProcessError, QueueError};
use agentgate_sandbox::SandboxError;
use agentgate_snapshot::SnapshotError;
use agentgate_storage::StorageError;

#[derive(Debug, thiserror::Error)]
pub enum ApplicationError {
    #[error("could not resolve a state directory: set AGENTGATE_STATE_DIR or HOME")]
    NoStateDir,

    #[error("run state machine self-test failed: {0}")]
    StateMachineInvalid(String),

    #[error(transparent)]
    Driver(#[from] DriverError),

    #[error(transparent)]
    Sandbox(#[from] SandboxError),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Transition(#[from] TransitionError),

    #[error(transparent)]
    GateConfig(#[from] GateConfigError),

    #[error(transparent)]
    Queue(#[from] QueueError),

    #[error(transparent)]
    Process(#[from] ProcessError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("invalid work order: {0}")]
    WorkOrderValidation(#[from] WorkOrderValidationError),

    #[error("malformed gate plan: {0}")]
    GatePlan(#[from] serde_json::Error),

    #[error("unsupported workspace source: {0}")]
    UnsupportedWorkspaceSource(String),

    #[error("gate plan source: {0}")]
    GatePlanSource(String),

    #[error("work order `{0}` is not known to this application")]
    UnknownWorkOrder(String),
}
