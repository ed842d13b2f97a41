// SPDX-License-Identifier: MIT

#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    #[error("no driver registered under key `{0}`")]
    NotFound(String),

    #[error("driver `{0}` is not available on this host")]
    Unavailable(String),

    #[error("failed to spawn agent process: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("failed to read agent stdout/stderr: {0}")]
    Io(#[source] std::io::Error),
}
