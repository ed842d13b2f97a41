// SPDX-License-Identifier: MIT

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum SandboxError {
    #[error("path `{0}` escapes the sandbox root")]
    PathEscape(PathBuf),

    #[error("sandbox root `{0}` does not exist or is not readable")]
    RootUnavailable(PathBuf),

    #[error("sandbox has already been destroyed")]
    Destroyed,

    #[error("failed to spawn `{command}`: {source}")]
    Spawn { command: String, #[source] source: std::io::Error },

    #[error("io error on `{path}`: {source}")]
    Io { path: PathBuf, #[source] source: std::io::Error },

    #[error("command `{command}` timed out after {timeout_ms}ms")]
    TimedOut { command: String, timeout_ms: u64 },
}
