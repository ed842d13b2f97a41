// SPDX-License-Identifier: MIT

//! FIFO work-order admission queue, capped at `maxQueueSize` with a running
//! set bounded by `maxConcurrent` (spec §4.8).

use crate::error::QueueError;
use agentgate_core::WorkOrderId;
use parking_lot::Mutex;
use std::collections::{HashSet, VecDeque};
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, Default)]
pub struct ForceCancelResult {
    pub from_queue: bool,
    pub from_running: bool,
}

struct State {
    queued: VecDeque<WorkOrderId>,
    running: HashSet<WorkOrderId>,
}

/// Admission queue. `ready(id)` is emitted on the returned receiver whenever
/// a running slot is free and `id` is the next waiting work order — the
/// caller is expected to call [`Queue::mark_started`] in response.
pub struct Queue {
    max_queue_size: usize,
    max_concurrent: usize,
    state: Mutex<State>,
    ready_tx: mpsc::UnboundedSender<WorkOrderId>,
}

impl Queue {
    pub fn new(max_queue_size: usize, max_concurrent: usize) -> (Self, mpsc::UnboundedReceiver<WorkOrderId>) {
        let (ready_tx, ready_rx) = mpsc::unbounded_channel();
        let queue = Self {
            max_queue_size,
            max_concurrent,
            state: Mutex::new(State { queued: VecDeque::new(), running: HashSet::new() }),
            ready_tx,
        };
        (queue, ready_rx)
    }

    pub fn enqueue(&self, id: WorkOrderId) -> Result<(), QueueError> {
        {
            let mut state = self.state.lock();
            if state.queued.len() >= self.max_queue_size {
                return Err(QueueError::Full);
            }
            state.queued.push_back(id);
        }
        self.signal_ready_if_capacity();
        Ok(())
    }

    /// Move `id` from queued to running, if a slot is available and `id` is
    /// actually waiting. Returns `false` otherwise (no-op).
    pub fn mark_started(&self, id: WorkOrderId) -> bool {
        let mut state = self.state.lock();
        if state.running.len() >= self.max_concurrent {
            return false;
        }
        match state.queued.iter().position(|queued_id| *queued_id == id) {
            Some(index) => {
                state.queued.remove(index);
                state.running.insert(id);
                true
            }
            None => false,
        }
    }

    /// Remove `id` from whichever set it's in. If it was running, this frees
    /// a slot and the next waiting id (if any) gets a fresh `ready` signal.
    pub fn force_cancel(&self, id: WorkOrderId) -> ForceCancelResult {
        let result = {
            let mut state = self.state.lock();
            let from_queue = match state.queued.iter().position(|queued_id| *queued_id == id) {
                Some(index) => {
                    state.queued.remove(index);
                    true
                }
                None => false,
            };
            let from_running = state.running.remove(&id);
            ForceCancelResult { from_queue, from_running }
        };
        if result.from_running {
            self.signal_ready_if_capacity();
        }
        result
    }

    /// Mark a running work order finished (success or failure, not a forced
    /// cancel). Frees its slot the same way `force_cancel` does.
    pub fn mark_finished(&self, id: WorkOrderId) -> bool {
        let removed = self.state.lock().running.remove(&id);
        if removed {
            self.signal_ready_if_capacity();
        }
        removed
    }

    pub fn is_queued(&self, id: WorkOrderId) -> bool {
        self.state.lock().queued.contains(&id)
    }

    pub fn is_running(&self, id: WorkOrderId) -> bool {
        self.state.lock().running.contains(&id)
    }

    pub fn queued_len(&self) -> usize {
        self.state.lock().queued.len()
    }

    pub fn running_len(&self) -> usize {
        self.state.lock().running.len()
    }

    fn signal_ready_if_capacity(&self) {
        let state = self.state.lock();
        if state.running.len() < self.max_concurrent {
            if let Some(id) = state.queued.front() {
                let _ = self.ready_tx.send(*id);
            }
        }
    }
}

#[cfg(test)]
#[path = "fifo_tests.rs"]
mod tests;
