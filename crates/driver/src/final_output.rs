// SPDX-License-Identifier: MIT

//! Parsing the agent's final stdout into structured output plus any
//! sessionId/token-usage it reports.

use serde_json::Value;

/// Scan `stdout` from the bottom for the last line starting with `{` and
/// parse it as JSON. Falls back to `{"result": stdout}` if none parses.
pub fn parse_final_output(stdout: &str) -> Value {
    for line in stdout.lines().rev() {
        let trimmed = line.trim();
        if trimmed.starts_with('{') {
            if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
                return value;
            }
        }
    }
    serde_json::json!({ "result": stdout })
}

pub fn extract_session_id(value: &Value) -> Option<String> {
    value.get("sessionId").or_else(|| value.get("session_id")).and_then(|v| v.as_str()).map(str::to_string)
}

pub fn extract_tokens_used(value: &Value) -> Option<u64> {
    value.get("tokensUsed").or_else(|| value.get("tokens_used")).and_then(|v| v.as_u64())
}
