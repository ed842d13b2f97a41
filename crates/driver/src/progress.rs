// SPDX-License-Identifier: MIT

//! Multi-factor progress percentage: time progress + tool-call progress +
//! phase weight, clamped to `[0, 99]` (100 is reserved for completion).

use crate::phase::Phase;

const TIME_WEIGHT: f64 = 0.3;
const TOOL_CALL_WEIGHT: f64 = 0.3;
const PHASE_WEIGHT: f64 = 0.4;

/// Inputs to one progress-percentage computation.
#[derive(Debug, Clone, Copy)]
pub struct ProgressInputs {
    pub elapsed_secs: f64,
    pub expected_secs: f64,
    pub tool_calls: u32,
    pub expected_tool_calls: u32,
    pub phase: Phase,
}

/// `percentage = clamp(floor(100 * (0.3*min(elapsed/expected,1) +
/// 0.3*min(toolCalls/expected,1) + 0.4*phaseWeight/100)), 0, 99)`
pub fn compute_percentage(inputs: ProgressInputs) -> u8 {
    let time_progress = ratio(inputs.elapsed_secs, inputs.expected_secs);
    let tool_progress = ratio(inputs.tool_calls as f64, inputs.expected_tool_calls as f64);
    let phase_progress = inputs.phase.weight() as f64 / 100.0;

    let combined = TIME_WEIGHT * time_progress + TOOL_CALL_WEIGHT * tool_progress + PHASE_WEIGHT * phase_progress;
    let percentage = (100.0 * combined).floor();
    percentage.clamp(0.0, 99.0) as u8
}

fn ratio(value: f64, expected: f64) -> f64 {
    if expected <= 0.0 {
        1.0
    } else {
        (value / expected).min(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_progress_at_start() {
        let pct = compute_percentage(ProgressInputs {
            elapsed_secs: 0.0,
            expected_secs: 120.0,
            tool_calls: 0,
            expected_tool_calls: 10,
            phase: Phase::Starting,
        });
        assert_eq!(pct, 2); // 0.4 * 5/100 = 0.02 -> floor(100*0.02) = 2
    }

    #[test]
    fn never_reaches_100_before_completion() {
        let pct = compute_percentage(ProgressInputs {
            elapsed_secs: 10_000.0,
            expected_secs: 1.0,
            tool_calls: 1000,
            expected_tool_calls: 1,
            phase: Phase::Finalizing,
        });
        assert_eq!(pct, 99);
    }

    #[test]
    fn matches_worked_example_mid_implementing() {
        let pct = compute_percentage(ProgressInputs {
            elapsed_secs: 60.0,
            expected_secs: 120.0,
            tool_calls: 5,
            expected_tool_calls: 10,
            phase: Phase::Implementing,
        });
        // 0.3*0.5 + 0.3*0.5 + 0.4*0.6 = 0.15+0.15+0.24 = 0.54 -> 54
        assert_eq!(pct, 54);
    }

    #[test]
    fn expected_zero_counts_as_fully_satisfied() {
        let pct = compute_percentage(ProgressInputs {
            elapsed_secs: 5.0,
            expected_secs: 0.0,
            tool_calls: 5,
            expected_tool_calls: 0,
            phase: Phase::Implementing,
        });
        // time and tool factors both saturate at 1.0
        assert_eq!(pct, 84); // 0.3+0.3+0.24 = 0.84 -> 84
    }
}
