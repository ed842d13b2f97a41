// SPDX-License-Identifier: MIT

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! agentgate-snapshot: content-addressed workspace snapshots (C3) over a
//! git-backed workspace history.

mod capture;
mod error;
mod git;

pub use capture::{capture, capture_with, file_hashes, init_workspace_history, CaptureOptions, Snapshot};
pub use error::SnapshotError;
