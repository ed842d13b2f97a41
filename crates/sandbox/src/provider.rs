// SPDX-License-Identifier: MIT

//! Sandbox and provider traits. A [`SandboxProvider`] is a factory for
//! leased [`Sandbox`] instances, the same adapter-trait-object shape the
//! rest of the harness uses at its other strategy plug-points.

use crate::error::SandboxError;
use crate::exec::{ExecRequest, ExecResult};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Point-in-time resource usage for a live sandbox.
#[derive(Debug, Clone, Default)]
pub struct SandboxStats {
    pub disk_bytes: u64,
    pub process_count: u32,
}

/// An isolated, path-confined execution environment for one workspace.
#[async_trait]
pub trait Sandbox: Send + Sync {
    /// Filesystem root this sandbox is confined to.
    fn root(&self) -> &Path;

    /// Run a command, enforcing `request.timeout` with a SIGTERM-then-SIGKILL
    /// grace period on expiry.
    async fn execute(&self, request: ExecRequest) -> Result<ExecResult, SandboxError>;

    async fn write_file(&self, path: &Path, content: &[u8]) -> Result<(), SandboxError>;

    async fn read_file(&self, path: &Path) -> Result<Vec<u8>, SandboxError>;

    /// List files under `path` (relative to the sandbox root), recursively.
    async fn list_files(&self, path: &Path) -> Result<Vec<PathBuf>, SandboxError>;

    async fn get_stats(&self) -> Result<SandboxStats, SandboxError>;

    /// Tear the sandbox down, killing any live child processes. Idempotent.
    async fn destroy(&self) -> Result<(), SandboxError>;
}

/// Factory for leased sandboxes, keyed by the workspace root they wrap.
#[async_trait]
pub trait SandboxProvider: Send + Sync {
    async fn acquire(&self, workspace_root: PathBuf) -> Result<Box<dyn Sandbox>, SandboxError>;
}
