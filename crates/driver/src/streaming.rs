// SPDX-License-Identifier: MIT

//! Newline-delimited JSON line parser for the agent wire format (consumed).
//!
//! Recognized shapes: `{system{subtype}}`, `{assistant{message:{type:text,
//! text}}}`, `{assistant{message:{type:tool_use,id,name,input}}}`,
//! `{user{message:{type:tool_result,tool_use_id,content,is_error?}}}`.

use crate::phase::PhaseTracker;
use crate::progress::{compute_percentage, ProgressInputs};
use agentgate_core::EventPayload;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Instant;

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WireLine {
    System { #[allow(dead_code)] subtype: String },
    Assistant { message: AssistantMessage },
    User { message: UserMessage },
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum AssistantMessage {
    Text { text: String },
    ToolUse { id: String, name: String, input: serde_json::Value },
}

#[derive(Deserialize)]
struct UserMessage {
    #[serde(rename = "type")]
    #[allow(dead_code)]
    kind: String,
    tool_use_id: String,
    content: serde_json::Value,
    #[serde(default)]
    is_error: bool,
}

/// Default assumptions driving the progress formula until the real agent
/// run establishes better ones (overridable via [`StreamState::with_expectations`]).
const DEFAULT_EXPECTED_SECS: f64 = 120.0;
const DEFAULT_EXPECTED_TOOL_CALLS: u32 = 20;

pub struct StreamState {
    start: Instant,
    expected_secs: f64,
    expected_tool_calls: u32,
    tool_call_count: u32,
    tool_starts: HashMap<String, Instant>,
    phase_tracker: PhaseTracker,
}

impl StreamState {
    pub fn new(start: Instant) -> Self {
        Self {
            start,
            expected_secs: DEFAULT_EXPECTED_SECS,
            expected_tool_calls: DEFAULT_EXPECTED_TOOL_CALLS,
            tool_call_count: 0,
            tool_starts: HashMap::new(),
            phase_tracker: PhaseTracker::new(start),
        }
    }

    pub fn with_expectations(mut self, expected_secs: f64, expected_tool_calls: u32) -> Self {
        self.expected_secs = expected_secs;
        self.expected_tool_calls = expected_tool_calls;
        self
    }

    fn progress_event(&self, now: Instant) -> EventPayload {
        let percentage = compute_percentage(ProgressInputs {
            elapsed_secs: now.duration_since(self.start).as_secs_f64(),
            expected_secs: self.expected_secs,
            tool_calls: self.tool_call_count,
            expected_tool_calls: self.expected_tool_calls,
            phase: self.phase_tracker.current(),
        });
        EventPayload::ProgressUpdate { percentage, phase: format!("{:?}", self.phase_tracker.current()) }
    }

    /// Parse one stdout line, returning the events it produces (zero, one,
    /// or two — e.g. a tool-result plus a refreshed progress update).
    pub fn process_line(&mut self, line: &str, now: Instant) -> Vec<EventPayload> {
        let trimmed = line.trim();
        if trimmed.is_empty() || !trimmed.starts_with('{') {
            return Vec::new();
        }
        let Ok(parsed) = serde_json::from_str::<WireLine>(trimmed) else {
            return Vec::new();
        };

        let mut events = Vec::new();
        match parsed {
            WireLine::System { .. } => return Vec::new(),
            WireLine::Assistant { message: AssistantMessage::Text { text } } => {
                if let Some(phase) = crate::phase::Phase::from_text(&text) {
                    self.phase_tracker.observe(phase, now);
                }
                events.push(EventPayload::AgentOutput { text });
            }
            WireLine::Assistant { message: AssistantMessage::ToolUse { id, name, input } } => {
                self.tool_starts.insert(id.clone(), now);
                self.tool_call_count += 1;
                if let Some(phase) = crate::phase::Phase::from_tool_name(&name) {
                    self.phase_tracker.observe(phase, now);
                }
                events.push(EventPayload::AgentToolCall { tool_use_id: id, tool_name: name, input });
            }
            WireLine::User { message } => {
                self.tool_starts.remove(&message.tool_use_id);
                let content = match &message.content {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                events.push(EventPayload::tool_result(message.tool_use_id, &content, message.is_error));
            }
        }
        events.push(self.progress_event(now));
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn ignores_non_json_lines() {
        let mut state = StreamState::new(Instant::now());
        assert!(state.process_line("plain banner text", Instant::now()).is_empty());
    }

    #[test]
    fn ignores_system_lines() {
        let mut state = StreamState::new(Instant::now());
        let events = state.process_line(r#"{"type":"system","subtype":"init"}"#, Instant::now());
        assert!(events.is_empty());
    }

    #[test]
    fn tool_use_then_result_tracks_lifecycle() {
        let start = Instant::now();
        let mut state = StreamState::new(start);
        let line1 = r#"{"type":"assistant","message":{"type":"tool_use","id":"t1","name":"Read","input":{}}}"#;
        let events1 = state.process_line(line1, start + Duration::from_millis(10));
        assert!(matches!(events1[0], EventPayload::AgentToolCall { .. }));
        assert_eq!(state.tool_call_count, 1);

        let line2 = r#"{"type":"user","message":{"type":"tool_result","tool_use_id":"t1","content":"file contents","is_error":false}}"#;
        let events2 = state.process_line(line2, start + Duration::from_millis(20));
        assert!(matches!(events2[0], EventPayload::AgentToolResult { .. }));
        assert!(state.tool_starts.is_empty());
    }

    #[test]
    fn assistant_text_emits_agent_output() {
        let mut state = StreamState::new(Instant::now());
        let line = r#"{"type":"assistant","message":{"type":"text","text":"working on it"}}"#;
        let events = state.process_line(line, Instant::now());
        assert!(matches!(events[0], EventPayload::AgentOutput { .. }));
    }
}
