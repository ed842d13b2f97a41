// SPDX-License-Identifier: MIT

#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    #[error("queue is at capacity")]
    Full,
}

#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("cannot register a process without a pid")]
    MissingPid,
}
