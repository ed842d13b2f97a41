// SPDX-License-Identifier: MIT

//! C7 run state machine: the transition table from spec §4.7 plus a
//! startup self-test validating the table's completeness.

use crate::error::TransitionError;
use agentgate_core::run::{Run, RunEvent, RunResult, RunState};
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet, VecDeque};

const ALL_EVENTS: [RunEvent; 12] = [
    RunEvent::WorkspaceAcquired,
    RunEvent::BuildStarted,
    RunEvent::BuildCompleted,
    RunEvent::BuildFailed,
    RunEvent::SnapshotCompleted,
    RunEvent::SnapshotFailed,
    RunEvent::VerifyPassed,
    RunEvent::VerifyFailedRetryable,
    RunEvent::VerifyFailedTerminal,
    RunEvent::FeedbackGenerated,
    RunEvent::UserCanceled,
    RunEvent::SystemError,
];

/// The declared per-state transition table, not counting the
/// USER_CANCELED/SYSTEM_ERROR shortcuts that fire from any non-terminal
/// state.
fn table(state: RunState, event: RunEvent) -> Option<RunState> {
    use RunEvent::*;
    use RunState::*;
    match (state, event) {
        (Queued, WorkspaceAcquired) => Some(Leased),
        (Leased, BuildStarted) => Some(Building),
        (Building, BuildCompleted) => Some(Snapshotting),
        (Building, BuildFailed) => Some(Failed),
        (Snapshotting, SnapshotCompleted) => Some(Verifying),
        (Snapshotting, SnapshotFailed) => Some(Failed),
        (Verifying, VerifyPassed) => Some(Succeeded),
        (Verifying, VerifyFailedRetryable) => Some(Feedback),
        (Verifying, VerifyFailedTerminal) => Some(Failed),
        (Feedback, FeedbackGenerated) => Some(Building),
        _ => None,
    }
}

/// Compute the next state for `(state, event)`, honoring the
/// USER_CANCELED→CANCELED / SYSTEM_ERROR→FAILED shortcuts available from
/// any non-terminal state ahead of the declared table.
pub fn apply_transition(state: RunState, event: RunEvent) -> Result<RunState, TransitionError> {
    if state.is_terminal() {
        return Err(TransitionError::Terminal(state));
    }
    match event {
        RunEvent::UserCanceled => return Ok(RunState::Canceled),
        RunEvent::SystemError => return Ok(RunState::Failed),
        _ => {}
    }
    table(state, event).ok_or(TransitionError::Illegal { state, event })
}

/// Apply `event` to `run`, stamping `result`/`completedAt` on entering a
/// terminal state. `failed_result` supplies the result kind when the
/// transition lands on FAILED (spec §4.7); defaults to `failed-error` if
/// omitted.
pub fn transition(
    run: &mut Run,
    event: RunEvent,
    now: DateTime<Utc>,
    failed_result: Option<RunResult>,
) -> Result<(), TransitionError> {
    let next = apply_transition(run.state, event)?;
    run.state = next;
    match next {
        RunState::Succeeded => {
            run.result = Some(RunResult::Passed);
            run.completed_at = Some(now);
        }
        RunState::Canceled => {
            run.result = Some(RunResult::Canceled);
            run.completed_at = Some(now);
        }
        RunState::Failed => {
            run.result = Some(failed_result.unwrap_or(RunResult::FailedError));
            run.completed_at = Some(now);
        }
        _ => {}
    }
    Ok(())
}

/// Self-test run at startup (spec §4.7): every non-terminal state has at
/// least one outgoing edge, every terminal state has none, every declared
/// event is handled by at least one state, and every state is reachable
/// from QUEUED.
///
/// Builds the full `(state, event) -> next` edge map in a single pass so
/// out-degree and reachability are each computed once, rather than
/// re-walking a growing reachable set and over-counting edges.
pub fn validate() -> Result<(), String> {
    let mut edges: HashMap<RunState, Vec<RunState>> = HashMap::new();
    let mut handled_events: HashSet<RunEvent> = HashSet::new();

    for state in RunState::all() {
        if state.is_terminal() {
            continue;
        }
        for event in ALL_EVENTS {
            if let Ok(next) = apply_transition(state, event) {
                edges.entry(state).or_default().push(next);
                handled_events.insert(event);
            }
        }
    }

    for state in RunState::all() {
        let out_degree = edges.get(&state).map(Vec::len).unwrap_or(0);
        if state.is_terminal() && out_degree != 0 {
            return Err(format!("terminal state {state} has {out_degree} outgoing transitions"));
        }
        if !state.is_terminal() && out_degree == 0 {
            return Err(format!("non-terminal state {state} has no outgoing transitions"));
        }
    }

    for event in ALL_EVENTS {
        if !handled_events.contains(&event) {
            return Err(format!("event {event:?} is not handled by any state"));
        }
    }

    let mut reached: HashSet<RunState> = HashSet::new();
    let mut frontier: VecDeque<RunState> = VecDeque::new();
    reached.insert(RunState::Queued);
    frontier.push_back(RunState::Queued);
    while let Some(state) = frontier.pop_front() {
        for &next in edges.get(&state).map(Vec::as_slice).unwrap_or(&[]) {
            if reached.insert(next) {
                frontier.push_back(next);
            }
        }
    }
    for state in RunState::all() {
        if !reached.contains(&state) {
            return Err(format!("state {state} is not reachable from queued"));
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
