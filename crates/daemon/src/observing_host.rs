// SPDX-License-Identifier: MIT

//! Bridges the coarse build/snapshot/verify/feedback callbacks
//! `agentgate_engine::LoopHost` drives once per iteration to the
//! fine-grained run state machine (C7) and the event broadcaster (C9).
//!
//! `agentgate-engine` keeps its convergence decision logic pure and
//! effect-free (spec §4.6); this wrapper is where that pure logic meets the
//! daemon's owned, effectful state (the persisted `Run`, the broadcaster).
//! It delegates every callback to an inner host and fires the legal state
//! transition around it, persisting the run and emitting a
//! `StateTransition` event each time.

use agentgate_core::run::{Run, RunEvent, RunState};
use agentgate_core::{Clock, Event, EventPayload, GateResult};
use agentgate_engine::iteration_loop::{BuildOutcome, IterationSnapshot, LoopHost};
use agentgate_engine::{EngineError, TransitionError};
use agentgate_events::Broadcaster;
use agentgate_storage::RunStore;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;

pub struct ObservingLoopHost<H, C> {
    inner: H,
    broadcaster: Arc<Broadcaster>,
    run_store: Arc<RunStore>,
    run: Mutex<Run>,
    clock: C,
}

impl<H: LoopHost, C: Clock> ObservingLoopHost<H, C> {
    pub fn new(inner: H, broadcaster: Arc<Broadcaster>, run_store: Arc<RunStore>, run: Run, clock: C) -> Self {
        Self { inner, broadcaster, run_store, run: Mutex::new(run), clock }
    }

    /// Snapshot of the run's current persisted state.
    pub fn run(&self) -> Run {
        self.run.lock().clone()
    }

    fn fire(&self, event: RunEvent) -> Result<(), TransitionError> {
        let mut run = self.run.lock();
        let from = run.state;
        agentgate_engine::transition(&mut run, event, self.clock.utc_now(), None)?;
        let to = run.state;
        let work_order_id = run.work_order_id;
        let run_id = run.id;
        let _ = self.run_store.save(run_id.as_str(), &run);
        drop(run);
        self.broadcaster.emit(Event::new(work_order_id, Some(run_id), self.clock.utc_now(), EventPayload::StateTransition { from, to }));
        Ok(())
    }

    fn current_state(&self) -> RunState {
        self.run.lock().state
    }
}

#[async_trait]
impl<H: LoopHost, C: Clock> LoopHost for ObservingLoopHost<H, C> {
    async fn on_build(&self, iteration: u32, feedback: Option<&str>) -> Result<BuildOutcome, EngineError> {
        if self.current_state() == RunState::Leased {
            self.fire(RunEvent::BuildStarted)?;
        }

        match self.inner.on_build(iteration, feedback).await {
            Ok(outcome) => {
                self.fire(RunEvent::BuildCompleted)?;
                Ok(outcome)
            }
            Err(err) => {
                self.fire(RunEvent::BuildFailed)?;
                Err(err)
            }
        }
    }

    async fn on_snapshot(&self, iteration: u32) -> Result<IterationSnapshot, EngineError> {
        match self.inner.on_snapshot(iteration).await {
            Ok(snapshot) => {
                self.fire(RunEvent::SnapshotCompleted)?;
                Ok(snapshot)
            }
            Err(err) => {
                self.fire(RunEvent::SnapshotFailed)?;
                Err(err)
            }
        }
    }

    async fn on_gate_check(&self, iteration: u32, snapshot: &IterationSnapshot) -> Result<Vec<GateResult>, EngineError> {
        match self.inner.on_gate_check(iteration, snapshot).await {
            Ok(results) => {
                if results.iter().all(|r| r.passed) {
                    self.fire(RunEvent::VerifyPassed)?;
                }
                Ok(results)
            }
            Err(err) => {
                self.fire(RunEvent::SystemError)?;
                Err(err)
            }
        }
    }

    async fn on_feedback(&self, iteration: u32, gate_results: &[GateResult]) -> Result<String, EngineError> {
        match self.inner.on_feedback(iteration, gate_results).await {
            Ok(text) => {
                self.fire(RunEvent::VerifyFailedRetryable)?;
                self.fire(RunEvent::FeedbackGenerated)?;
                Ok(text)
            }
            Err(err) => {
                self.fire(RunEvent::SystemError)?;
                Err(err)
            }
        }
    }
}

/// Force a terminated-but-not-yet-failed run to its terminal `Failed` state
/// once the iteration loop has returned a divergent/escalated outcome
/// without ever reaching `on_feedback` again (e.g. a hard stop on the
/// first failing gate, or the iteration/wall-clock cap). `VerifyFailedTerminal`
/// is used when the run is still `Verifying` (the common case); `SystemError`
/// is the universal fallback for any other non-terminal state, since it is
/// legal from anywhere per the state table's cancellation/error shortcuts.
pub fn force_terminal_failure<C: Clock>(
    broadcaster: &Broadcaster,
    run_store: &RunStore,
    run: &mut Run,
    clock: &C,
    result: agentgate_core::RunResult,
) -> Result<(), TransitionError> {
    if run.state.is_terminal() {
        return Ok(());
    }
    let event = if run.state == RunState::Verifying { RunEvent::VerifyFailedTerminal } else { RunEvent::SystemError };
    let from = run.state;
    agentgate_engine::transition(run, event, clock.utc_now(), Some(result))?;
    let to = run.state;
    let _ = run_store.save(run.id.as_str(), run);
    broadcaster.emit(Event::new(run.work_order_id, Some(run.id), clock.utc_now(), EventPayload::StateTransition { from, to }));
    Ok(())
}

/// Transition a run straight to `Canceled`, from whatever non-terminal
/// state it's in. Legal from anywhere per the state table's cancellation
/// shortcut; a no-op if the run already reached a terminal state.
pub fn force_cancel<C: Clock>(
    broadcaster: &Broadcaster,
    run_store: &RunStore,
    run: &mut Run,
    clock: &C,
) -> Result<(), TransitionError> {
    if run.state.is_terminal() {
        return Ok(());
    }
    let from = run.state;
    agentgate_engine::transition(run, RunEvent::UserCanceled, clock.utc_now(), None)?;
    let to = run.state;
    let _ = run_store.save(run.id.as_str(), run);
    broadcaster.emit(Event::new(run.work_order_id, Some(run.id), clock.utc_now(), EventPayload::StateTransition { from, to }));
    Ok(())
}

#[cfg(test)]
#[path = "observing_host_tests.rs"]
mod tests;
