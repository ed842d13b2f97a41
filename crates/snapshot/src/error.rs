// SPDX-License-Identifier: MIT

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("failed to spawn git: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("git {command} failed: {stderr}")]
    CommandFailed { command: String, stderr: String },

    #[error("git output was not valid UTF-8")]
    Utf8,
}
