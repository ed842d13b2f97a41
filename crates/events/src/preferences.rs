// SPDX-License-Identifier: MIT

//! Per-(connection, work order) subscription preferences (spec §4.9). All
//! five toggles default to `true`; a partial update only overrides the
//! fields it sets.

use agentgate_core::EventPayload;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionPreferences {
    pub include_tool_calls: bool,
    pub include_tool_results: bool,
    pub include_output: bool,
    pub include_file_changes: bool,
    pub include_progress: bool,
}

impl Default for SubscriptionPreferences {
    fn default() -> Self {
        Self {
            include_tool_calls: true,
            include_tool_results: true,
            include_output: true,
            include_file_changes: true,
            include_progress: true,
        }
    }
}

/// A partial preference update, as accepted by `subscribe`'s optional argument.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PartialPreferences {
    pub include_tool_calls: Option<bool>,
    pub include_tool_results: Option<bool>,
    pub include_output: Option<bool>,
    pub include_file_changes: Option<bool>,
    pub include_progress: Option<bool>,
}

impl SubscriptionPreferences {
    pub fn merged_with(partial: Option<PartialPreferences>) -> Self {
        let defaults = Self::default();
        let Some(partial) = partial else { return defaults };
        Self {
            include_tool_calls: partial.include_tool_calls.unwrap_or(defaults.include_tool_calls),
            include_tool_results: partial.include_tool_results.unwrap_or(defaults.include_tool_results),
            include_output: partial.include_output.unwrap_or(defaults.include_output),
            include_file_changes: partial.include_file_changes.unwrap_or(defaults.include_file_changes),
            include_progress: partial.include_progress.unwrap_or(defaults.include_progress),
        }
    }
}

/// Which preference bit (if any) gates delivery of this payload kind.
/// `Connected` and `StateTransition` are never gated — they carry the
/// run's core narrative regardless of subscriber filtering.
pub fn allowed_by(payload: &EventPayload, prefs: &SubscriptionPreferences) -> bool {
    match payload {
        EventPayload::Connected | EventPayload::StateTransition { .. } => true,
        EventPayload::AgentToolCall { .. } => prefs.include_tool_calls,
        EventPayload::AgentToolResult { .. } => prefs.include_tool_results,
        EventPayload::AgentOutput { .. } => prefs.include_output,
        EventPayload::FileChanged { .. } => prefs.include_file_changes,
        EventPayload::ProgressUpdate { .. } => prefs.include_progress,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_all_true() {
        let prefs = SubscriptionPreferences::default();
        assert!(prefs.include_tool_calls);
        assert!(prefs.include_tool_results);
        assert!(prefs.include_output);
        assert!(prefs.include_file_changes);
        assert!(prefs.include_progress);
    }

    #[test]
    fn partial_update_only_overrides_set_fields() {
        let partial = PartialPreferences { include_output: Some(false), ..Default::default() };
        let merged = SubscriptionPreferences::merged_with(Some(partial));
        assert!(!merged.include_output);
        assert!(merged.include_tool_calls);
    }

    #[test]
    fn no_partial_yields_defaults() {
        assert_eq!(SubscriptionPreferences::merged_with(None), SubscriptionPreferences::default());
    }
}
