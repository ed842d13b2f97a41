// SPDX-License-Identifier: MIT

#[derive(Debug, thiserror::Error)]
pub enum GateConfigError {
    #[error("{gate}: {reason}")]
    Invalid { gate: String, reason: String },
}
