// SPDX-License-Identifier: MIT

//! Centralized environment variable access for the daemon crate. Every
//! `std::env::var` read in this crate goes through here rather than being
//! scattered ad hoc.

use std::path::PathBuf;
use std::time::Duration;

/// Resolve the application's state directory:
/// `AGENTGATE_STATE_DIR` > `XDG_STATE_HOME/agentgate` > `~/.local/state/agentgate`.
pub fn state_dir() -> Result<PathBuf, crate::error::ApplicationError> {
    if let Ok(dir) = std::env::var("AGENTGATE_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("agentgate"));
    }
    let home = std::env::var("HOME").map_err(|_| crate::error::ApplicationError::NoStateDir)?;
    Ok(PathBuf::from(home).join(".local/state/agentgate"))
}

/// Maximum number of queued-but-not-running work orders (`AGENTGATE_MAX_QUEUE_SIZE`, default 100).
pub fn max_queue_size() -> usize {
    std::env::var("AGENTGATE_MAX_QUEUE_SIZE").ok().and_then(|s| s.parse().ok()).unwrap_or(100)
}

/// Maximum number of concurrently running work orders (`AGENTGATE_MAX_CONCURRENT`, default 4).
pub fn max_concurrent() -> usize {
    std::env::var("AGENTGATE_MAX_CONCURRENT").ok().and_then(|s| s.parse().ok()).unwrap_or(4)
}

/// Graceful shutdown drain timeout (default 5s, `AGENTGATE_DRAIN_TIMEOUT_MS`).
pub fn drain_timeout() -> Duration {
    std::env::var("AGENTGATE_DRAIN_TIMEOUT_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_secs(5))
}

/// Stale-process check interval (default 30s, `AGENTGATE_STALE_CHECK_MS`).
pub fn stale_check_interval() -> Duration {
    std::env::var("AGENTGATE_STALE_CHECK_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_secs(30))
}

/// Maximum lifetime a subprocess is allowed before it's flagged stale
/// (default 2h, `AGENTGATE_MAX_PROCESS_LIFETIME_MS`).
pub fn max_process_lifetime() -> Duration {
    std::env::var("AGENTGATE_MAX_PROCESS_LIFETIME_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_secs(7200))
}

/// SIGTERM-to-SIGKILL grace period for a canceled work order's process
/// (default 5s, `AGENTGATE_KILL_GRACE_MS`).
pub fn kill_grace() -> Duration {
    std::env::var("AGENTGATE_KILL_GRACE_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_secs(5))
}

/// Path to the agent binary the default driver spawns (`AGENTGATE_AGENT_BINARY`,
/// default `claude-agent` on `$PATH`).
pub fn agent_binary() -> String {
    std::env::var("AGENTGATE_AGENT_BINARY").unwrap_or_else(|_| "claude-agent".to_string())
}

/// Log file directory, defaulting to the state directory (`AGENTGATE_LOG_DIR`).
pub fn log_dir() -> Result<PathBuf, crate::error::ApplicationError> {
    if let Ok(dir) = std::env::var("AGENTGATE_LOG_DIR") {
        return Ok(PathBuf::from(dir));
    }
    state_dir()
}
