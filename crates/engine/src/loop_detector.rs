// SPDX-License-Identifier: MIT

//! Loop detection over a sliding window of per-iteration fingerprints
//! (spec §4.6): catches an agent that keeps reproducing the same content,
//! the same errors, or oscillating between two states.

use std::collections::{HashMap, VecDeque};
use std::fmt;

/// At most this many fingerprints are kept; older entries fall off the
/// front of the window.
const WINDOW_CAP: usize = 10;

#[derive(Debug, Clone)]
pub struct Fingerprint {
    pub iteration: u32,
    pub sha: String,
    pub file_hashes: std::collections::BTreeMap<String, String>,
    pub error_signature: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopPattern {
    Exact,
    Semantic,
    Oscillating,
}

impl fmt::Display for LoopPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LoopPattern::Exact => "exact",
            LoopPattern::Semantic => "semantic",
            LoopPattern::Oscillating => "oscillating",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoopFinding {
    pub kind: LoopPattern,
    pub confidence: f64,
}

#[derive(Default)]
pub struct LoopDetector {
    window: VecDeque<Fingerprint>,
}

impl LoopDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, fingerprint: Fingerprint) {
        self.window.push_back(fingerprint);
        while self.window.len() > WINDOW_CAP {
            self.window.pop_front();
        }
    }

    /// Checks the most specific pattern (oscillating) first, then the two
    /// repeat-count patterns.
    pub fn detect(&self) -> Option<LoopFinding> {
        self.detect_oscillating().or_else(|| self.detect_exact()).or_else(|| self.detect_semantic())
    }

    fn detect_oscillating(&self) -> Option<LoopFinding> {
        if self.window.len() < 4 {
            return None;
        }
        let last4: Vec<&Fingerprint> = self.window.iter().rev().take(4).collect();
        // last4[0] is the newest; reindex to chronological order 0..3.
        let (a0, a1, a2, a3) = (last4[3], last4[2], last4[1], last4[0]);
        if a0.sha == a2.sha && a1.sha == a3.sha && a0.sha != a1.sha {
            Some(LoopFinding { kind: LoopPattern::Oscillating, confidence: 0.9 })
        } else {
            None
        }
    }

    fn detect_exact(&self) -> Option<LoopFinding> {
        let mut counts: HashMap<&str, u32> = HashMap::new();
        for fp in &self.window {
            *counts.entry(fp.sha.as_str()).or_insert(0) += 1;
        }
        counts.values().copied().max().filter(|&count| count >= 2).map(|count| LoopFinding {
            kind: LoopPattern::Exact,
            confidence: (count as f64 / 3.0).min(1.0),
        })
    }

    fn detect_semantic(&self) -> Option<LoopFinding> {
        let mut counts: HashMap<&str, u32> = HashMap::new();
        for fp in &self.window {
            if let Some(sig) = fp.error_signature.as_deref() {
                *counts.entry(sig).or_insert(0) += 1;
            }
        }
        counts.values().copied().max().filter(|&count| count >= 2).map(|count| LoopFinding {
            kind: LoopPattern::Semantic,
            confidence: (count as f64 / 3.0).min(1.0),
        })
    }
}

#[cfg(test)]
#[path = "loop_detector_tests.rs"]
mod tests;
