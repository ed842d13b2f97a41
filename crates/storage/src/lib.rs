// SPDX-License-Identifier: MIT

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! agentgate-storage: per-entity JSON persistence and the security audit
//! log for the AgentGate coding-agent harness.

mod audit;
mod entity_store;
mod error;

pub use audit::{AuditDestination, AuditEntry, AuditLog, AuditLogConfig, DEFAULT_MAX_BYTES, DEFAULT_RETENTION_DAYS};
pub use entity_store::EntityStore;
pub use error::StorageError;

pub type WorkOrderStore = EntityStore<agentgate_core::WorkOrder>;
pub type RunStore = EntityStore<agentgate_core::Run>;
pub type WorkspaceStore = EntityStore<agentgate_core::Workspace>;
