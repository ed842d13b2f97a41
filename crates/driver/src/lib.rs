// SPDX-License-Identifier: MIT

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! agentgate-driver: pluggable agent-process drivers, subprocess invocation,
//! wire-format streaming, and progress computation.

pub mod driver_trait;
pub mod env;
pub mod error;
#[cfg(any(test, feature = "test-support"))]
pub mod fake;
pub mod final_output;
pub mod phase;
pub mod progress;
pub mod registry;
pub mod request;
pub mod result;
pub mod streaming;
pub mod subprocess;

pub use driver_trait::{AgentDriver, ExecuteOptions};
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeAgentDriver;
pub use error::DriverError;
pub use phase::{Phase, PhaseTracker};
pub use progress::{compute_percentage, ProgressInputs};
pub use registry::DriverRegistry;
pub use request::{AgentConstraints, AgentRequest, StreamContext};
pub use result::{AgentCapabilities, AgentResult};
pub use streaming::StreamState;
pub use subprocess::{ArgvBuilder, SubprocessAgentDriver};
