// SPDX-License-Identifier: MIT

//! Security policy carried by a work order, and allowlist entries consumed
//! by the enforcement aggregator (C5).

use serde::{Deserialize, Serialize};

/// Per-work-order security constraints.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SecurityPolicy {
    #[serde(default)]
    pub network_allowed: bool,
    #[serde(default)]
    pub forbidden_paths: Vec<String>,
}

/// A glob + reason that suppresses matching findings, optionally scoped to
/// a detector set and an expiry date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllowlistEntry {
    pub path_glob: String,
    pub reason: String,
    #[serde(default)]
    pub detectors: Vec<String>,
    /// ISO date string; missing means it never expires.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<chrono::NaiveDate>,
}

impl AllowlistEntry {
    pub fn is_expired(&self, today: chrono::NaiveDate) -> bool {
        match self.expires {
            Some(expiry) => today > expiry,
            None => false,
        }
    }

    pub fn covers_detector(&self, detector: &str) -> bool {
        self.detectors.is_empty() || self.detectors.iter().any(|d| d == detector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn missing_expiry_never_expires() {
        let entry = AllowlistEntry {
            path_glob: "test/**".into(),
            reason: "fixtures".into(),
            detectors: vec![],
            expires: None,
        };
        assert!(!entry.is_expired(date(2099, 1, 1)));
    }

    #[test]
    fn expiry_is_compared_as_dates() {
        let entry = AllowlistEntry {
            path_glob: "test/**".into(),
            reason: "temp".into(),
            detectors: vec![],
            expires: Some(date(2026, 1, 1)),
        };
        assert!(!entry.is_expired(date(2025, 12, 31)));
        assert!(entry.is_expired(date(2026, 1, 2)));
    }

    #[test]
    fn empty_detector_set_covers_everything() {
        let entry = AllowlistEntry {
            path_glob: "*".into(),
            reason: "r".into(),
            detectors: vec![],
            expires: None,
        };
        assert!(entry.covers_detector("anything"));
    }
}
