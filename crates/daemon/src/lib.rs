// SPDX-License-Identifier: MIT

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! agentgate-daemon: wires the nine AgentGate components into a single
//! long-running process — the `Application` object — and exposes the
//! `agentgated` binary entry point.

pub mod application;
pub mod env;
pub mod error;
pub mod gate_plan_source;
pub mod gate_registry;
pub mod observing_host;

pub use application::Application;
pub use error::ApplicationError;
