// SPDX-License-Identifier: MIT

//! Per-gate check results.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// A single failure detail within a [`GateResult`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GateFailure {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow: Option<String>,
}

impl GateFailure {
    pub fn message(message: impl Into<String>) -> Self {
        Self { message: message.into(), ..Default::default() }
    }
}

/// Outcome of running a single gate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateResult {
    pub gate_name: String,
    pub check_type: String,
    pub passed: bool,
    #[serde(with = "duration_ms")]
    pub duration: Duration,
    #[serde(default)]
    pub details: HashMap<String, serde_json::Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<GateFailure>,
}

impl GateResult {
    pub fn pass(gate_name: impl Into<String>, check_type: impl Into<String>, duration: Duration) -> Self {
        Self {
            gate_name: gate_name.into(),
            check_type: check_type.into(),
            passed: true,
            duration,
            details: HashMap::new(),
            failures: Vec::new(),
        }
    }

    pub fn fail(
        gate_name: impl Into<String>,
        check_type: impl Into<String>,
        duration: Duration,
        failures: Vec<GateFailure>,
    ) -> Self {
        Self {
            gate_name: gate_name.into(),
            check_type: check_type.into(),
            passed: false,
            duration,
            details: HashMap::new(),
            failures,
        }
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.details.insert(key.into(), value);
        self
    }
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u128(d.as_millis())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let millis = u64::deserialize(d)?;
        Ok(Duration::from_millis(millis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pass_has_no_failures() {
        let r = GateResult::pass("required-files", "contracts", Duration::from_millis(5));
        assert!(r.passed);
        assert!(r.failures.is_empty());
    }

    #[test]
    fn serde_round_trips_duration() {
        let r = GateResult::pass("g", "contracts", Duration::from_millis(42));
        let json = serde_json::to_string(&r).unwrap();
        let back: GateResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back.duration, Duration::from_millis(42));
    }
}
