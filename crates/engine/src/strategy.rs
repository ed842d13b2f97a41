// SPDX-License-Identifier: MIT

//! C6 convergence strategies (spec §4.6): pluggable continue/stop/retry/
//! escalate policies consulted once per iteration by the loop runner in
//! [`crate::iteration_loop`].

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

/// What the strategy wants the loop to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Continue,
    Stop,
    Retry,
    Escalate,
}

/// Everything a strategy needs to decide, gathered for the iteration that
/// just completed.
pub struct LoopContext<'a> {
    pub iteration: u32,
    pub elapsed: Duration,
    pub gate_results: &'a [agentgate_core::GateResult],
    pub errors_fixed: u32,
    pub errors_remaining: u32,
    pub agent_signaled_done: bool,
}

impl LoopContext<'_> {
    pub fn all_gates_passed(&self) -> bool {
        self.gate_results.iter().all(|r| r.passed)
    }

    /// The `"similarity"` detail recorded by the convergence gate
    /// (`agentgate_gates::ConvergenceRunner`), if one ran this iteration.
    pub fn convergence_similarity(&self) -> Option<f64> {
        self.gate_results
            .iter()
            .find(|r| r.check_type == "convergence")
            .and_then(|r| r.details.get("similarity"))
            .and_then(serde_json::Value::as_f64)
    }
}

pub trait ConvergenceStrategy: Send + Sync {
    fn on_loop_start(&mut self) {}

    fn on_iteration_start(&mut self, _iteration: u32) {}

    fn should_continue(&mut self, ctx: &LoopContext<'_>) -> (Decision, String);
}

/// Run exactly `n` iterations unless gates pass early — early success is
/// decided by the loop runner itself once `should_continue` returns
/// anything other than `stop`/`escalate`, so this only needs to cap
/// iteration count.
pub struct FixedStrategy {
    n: u32,
}

impl FixedStrategy {
    pub fn new(n: u32) -> Self {
        Self { n }
    }
}

impl ConvergenceStrategy for FixedStrategy {
    fn should_continue(&mut self, ctx: &LoopContext<'_>) -> (Decision, String) {
        if ctx.iteration >= self.n {
            (Decision::Stop, format!("reached fixed iteration count {}", self.n))
        } else {
            (Decision::Continue, "fixed: iterations remain".to_string())
        }
    }
}

/// Up to `base` iterations; earns up to `bonus` extra iterations while
/// progress velocity (errors fixed this iteration) stays at or above
/// `threshold`.
pub struct HybridStrategy {
    base: u32,
    bonus: u32,
    threshold: f64,
    earned_bonus: u32,
}

impl HybridStrategy {
    pub fn new(base: u32, bonus: u32, threshold: f64) -> Self {
        Self { base, bonus, threshold, earned_bonus: 0 }
    }
}

impl ConvergenceStrategy for HybridStrategy {
    fn should_continue(&mut self, ctx: &LoopContext<'_>) -> (Decision, String) {
        if ctx.iteration < self.base {
            return (Decision::Continue, "hybrid: within base iteration budget".to_string());
        }
        let velocity = ctx.errors_fixed as f64;
        if velocity >= self.threshold && self.earned_bonus < self.bonus {
            self.earned_bonus += 1;
            return (
                Decision::Continue,
                format!("hybrid: earned bonus iteration {} of {} (velocity {velocity})", self.earned_bonus, self.bonus),
            );
        }
        (Decision::Stop, format!("hybrid: exhausted base {} + bonus {} iterations", self.base, self.bonus))
    }
}

/// Continues until the agent signals done or the convergence gate's
/// similarity stays at or above `threshold` for `window_size` consecutive
/// iterations, never stopping before `min_iterations`.
pub struct RalphStrategy {
    window_size: u32,
    threshold: f64,
    min_iterations: u32,
    consecutive_high_similarity: u32,
}

impl RalphStrategy {
    pub fn new(window_size: u32, threshold: f64, min_iterations: u32) -> Self {
        Self { window_size, threshold, min_iterations, consecutive_high_similarity: 0 }
    }
}

impl ConvergenceStrategy for RalphStrategy {
    fn should_continue(&mut self, ctx: &LoopContext<'_>) -> (Decision, String) {
        if ctx.agent_signaled_done {
            return (Decision::Stop, "ralph: agent signaled done".to_string());
        }

        match ctx.convergence_similarity() {
            Some(similarity) if similarity >= self.threshold => self.consecutive_high_similarity += 1,
            _ => self.consecutive_high_similarity = 0,
        }

        if self.consecutive_high_similarity >= self.window_size && ctx.iteration >= self.min_iterations {
            return (
                Decision::Stop,
                format!("ralph: similarity >= {} for {} consecutive iterations", self.threshold, self.window_size),
            );
        }
        (Decision::Continue, "ralph: below similarity window".to_string())
    }
}

/// External actor decides per iteration via [`ManualHandle::set_next`];
/// defaults to `continue` until told otherwise.
pub struct ManualStrategy {
    pending: Arc<Mutex<Decision>>,
}

#[derive(Clone)]
pub struct ManualHandle {
    pending: Arc<Mutex<Decision>>,
}

impl ManualHandle {
    pub fn set_next(&self, decision: Decision) {
        *self.pending.lock() = decision;
    }
}

impl ManualStrategy {
    pub fn new() -> (Self, ManualHandle) {
        let pending = Arc::new(Mutex::new(Decision::Continue));
        (Self { pending: pending.clone() }, ManualHandle { pending })
    }
}

impl ConvergenceStrategy for ManualStrategy {
    fn should_continue(&mut self, _ctx: &LoopContext<'_>) -> (Decision, String) {
        (*self.pending.lock(), "manual: external decision".to_string())
    }
}

/// Builds the strategy a gate plan's `strategy` + `config` fields declare.
///
/// `StrategyKind::Adaptive` has no distinct formula in the convergence
/// controller spec — it is accepted as an alias for [`HybridStrategy`],
/// since hybrid's earned-bonus-by-velocity behavior already is the
/// adaptive case the name describes. `manual` ignores `config` and always
/// needs its paired [`ManualHandle`] back, so it returns one (`None` for
/// every other strategy).
pub fn build_strategy(
    kind: agentgate_core::gate_plan::StrategyKind,
    config: &serde_json::Value,
) -> Result<(Box<dyn ConvergenceStrategy>, Option<ManualHandle>), crate::error::EngineError> {
    use agentgate_core::gate_plan::StrategyKind;

    fn field_u32(config: &serde_json::Value, key: &str, default: u32) -> u32 {
        config.get(key).and_then(serde_json::Value::as_u64).map(|v| v as u32).unwrap_or(default)
    }

    fn field_f64(config: &serde_json::Value, key: &str, default: f64) -> f64 {
        config.get(key).and_then(serde_json::Value::as_f64).unwrap_or(default)
    }

    match kind {
        StrategyKind::Fixed => {
            let n = field_u32(config, "n", 10);
            Ok((Box::new(FixedStrategy::new(n)), None))
        }
        StrategyKind::Hybrid | StrategyKind::Adaptive => {
            let base = field_u32(config, "base", 5);
            let bonus = field_u32(config, "bonus", 3);
            let threshold = field_f64(config, "threshold", 1.0);
            Ok((Box::new(HybridStrategy::new(base, bonus, threshold)), None))
        }
        StrategyKind::Ralph => {
            let window_size = field_u32(config, "window_size", 3);
            let threshold = field_f64(config, "threshold", 0.95);
            let min_iterations = field_u32(config, "min_iterations", 1);
            Ok((Box::new(RalphStrategy::new(window_size, threshold, min_iterations)), None))
        }
        StrategyKind::Manual => {
            let (strategy, handle) = ManualStrategy::new();
            Ok((Box::new(strategy), Some(handle)))
        }
    }
}

#[cfg(test)]
#[path = "strategy_tests.rs"]
mod tests;
