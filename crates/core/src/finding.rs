// SPDX-License-Identifier: MIT

//! Findings produced by enforcement detectors.

use serde::{Deserialize, Serialize};

/// Sensitivity level of a finding, driving the enforcement aggregator's
/// sensitivity -> action classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sensitivity {
    Info,
    Warning,
    Sensitive,
    Restricted,
}

crate::simple_display! {
    Sensitivity {
        Info => "info",
        Warning => "warning",
        Sensitive => "sensitive",
        Restricted => "restricted",
    }
}

/// A single detector finding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    pub rule_id: String,
    pub message: String,
    pub file: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
    pub sensitivity: Sensitivity,
    pub detector: String,
}

impl Finding {
    pub fn new(
        rule_id: impl Into<String>,
        message: impl Into<String>,
        file: impl Into<String>,
        sensitivity: Sensitivity,
        detector: impl Into<String>,
    ) -> Self {
        Self {
            rule_id: rule_id.into(),
            message: message.into(),
            file: file.into(),
            line: None,
            column: None,
            sensitivity,
            detector: detector.into(),
        }
    }

    pub fn at(mut self, line: u32, column: u32) -> Self {
        self.line = Some(line);
        self.column = Some(column);
        self
    }
}
