// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};

/// Static capability advertisement for a driver, used by the engine to
/// decide whether a requested feature (resume, structured output, ...) is
/// available before invoking it.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct AgentCapabilities {
    pub supports_session_resume: bool,
    pub supports_structured_output: bool,
    pub supports_tool_restriction: bool,
    pub supports_timeout: bool,
    pub max_turns: Option<u32>,
}

/// Outcome of one [`crate::AgentRequest`] invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentResult {
    pub success: bool,
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structured_output: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens_used: Option<u64>,
    pub duration_ms: u64,
    #[serde(default)]
    pub timed_out: bool,
    #[serde(default)]
    pub cancelled: bool,
}
