// SPDX-License-Identifier: MIT

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! agentgate-enforce: merges findings across detectors, applies the
//! allowlist, and classifies the result by sensitivity -> action (C5).

mod aggregate;
mod glob;
mod report;

pub use aggregate::aggregate;
pub use report::{action_for, Action, EnforcementReport, Summary};
