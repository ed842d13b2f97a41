// SPDX-License-Identifier: MIT

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! agentgate-sandbox: isolated workspace execution (C1).
//!
//! A [`Sandbox`] is a leased, path-confined execution environment backed by
//! either a plain subprocess (default) or a container runtime (behind the
//! `container` feature). All paths passed to a sandbox are resolved and
//! checked against the sandbox root before any filesystem operation runs.

mod error;
mod exec;
mod path_guard;
mod provider;
mod subprocess;

#[cfg(feature = "container")]
mod container;

pub use error::SandboxError;
pub use exec::{ExecRequest, ExecResult};
pub use provider::{Sandbox, SandboxProvider, SandboxStats};
pub use subprocess::SubprocessSandboxProvider;

#[cfg(feature = "container")]
pub use container::ContainerSandboxProvider;
