// SPDX-License-Identifier: MIT

//! Typed progress events emitted during a run, fanned out by the event
//! broadcaster (C9).

use crate::run::{RunId, RunState};
use crate::work_order::WorkOrderId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Tool-result content previews are truncated to this many bytes.
pub const CONTENT_PREVIEW_MAX_BYTES: usize = 500;

/// Truncate `s` to at most `max_bytes`, respecting UTF-8 char boundaries.
pub fn truncate_preview(s: &str, max_bytes: usize) -> String {
    if s.len() <= max_bytes {
        return s.to_string();
    }
    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…", &s[..end])
}

/// The tagged union of progress event kinds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventPayload {
    Connected,
    AgentToolCall { tool_use_id: String, tool_name: String, input: serde_json::Value },
    AgentToolResult { tool_use_id: String, content_preview: String, is_error: bool },
    AgentOutput { text: String },
    ProgressUpdate { percentage: u8, phase: String },
    FileChanged { path: String },
    StateTransition { from: RunState, to: RunState },
}

impl EventPayload {
    pub fn tool_result(tool_use_id: impl Into<String>, content: &str, is_error: bool) -> Self {
        EventPayload::AgentToolResult {
            tool_use_id: tool_use_id.into(),
            content_preview: truncate_preview(content, CONTENT_PREVIEW_MAX_BYTES),
            is_error,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            EventPayload::Connected => "connected",
            EventPayload::AgentToolCall { .. } => "agent_tool_call",
            EventPayload::AgentToolResult { .. } => "agent_tool_result",
            EventPayload::AgentOutput { .. } => "agent_output",
            EventPayload::ProgressUpdate { .. } => "progress_update",
            EventPayload::FileChanged { .. } => "file_changed",
            EventPayload::StateTransition { .. } => "state_transition",
        }
    }
}

/// An event carrying the owning work order/run IDs and an ISO-8601 timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub work_order_id: WorkOrderId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_id: Option<RunId>,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub payload: EventPayload,
}

impl Event {
    pub fn new(
        work_order_id: WorkOrderId,
        run_id: Option<RunId>,
        timestamp: DateTime<Utc>,
        payload: EventPayload,
    ) -> Self {
        Self { work_order_id, run_id, timestamp, payload }
    }
}
