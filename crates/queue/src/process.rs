// SPDX-License-Identifier: MIT

//! Subprocess registry keyed by work-order id, with SIGTERM-then-SIGKILL
//! kill semantics (spec §4.8).

use crate::error::ProcessError;
use agentgate_core::{RunId, WorkOrderId};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::mpsc;

#[derive(Debug, Clone)]
pub struct ManagedProcess {
    pub work_order_id: WorkOrderId,
    pub run_id: RunId,
    pub pid: u32,
    pub started_at: DateTime<Utc>,
    pub exited: bool,
    pub exit_code: Option<i32>,
    pub exit_signal: Option<i32>,
}

#[derive(Debug, Clone)]
pub enum ProcessEvent {
    Registered(WorkOrderId),
    Exited { work_order_id: WorkOrderId, exit_code: Option<i32> },
    Killed(WorkOrderId),
    ForceKilled(WorkOrderId),
    Stale(WorkOrderId),
}

#[derive(Debug, Clone, Copy, Default)]
pub struct KillOutcome {
    pub success: bool,
    pub forced_kill: bool,
}

pub struct ProcessRegistry {
    processes: Mutex<HashMap<WorkOrderId, ManagedProcess>>,
    event_tx: mpsc::UnboundedSender<ProcessEvent>,
}

impl ProcessRegistry {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ProcessEvent>) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        (Self { processes: Mutex::new(HashMap::new()), event_tx }, event_rx)
    }

    /// Register a live subprocess, replacing any prior registration for the
    /// same work order. Rejects a missing pid (e.g. the child already
    /// exited before this call observed its pid).
    pub fn register(
        &self,
        work_order_id: WorkOrderId,
        run_id: RunId,
        pid: Option<u32>,
        started_at: DateTime<Utc>,
    ) -> Result<(), ProcessError> {
        let pid = pid.ok_or(ProcessError::MissingPid)?;
        let process = ManagedProcess { work_order_id, run_id, pid, started_at, exited: false, exit_code: None, exit_signal: None };
        self.processes.lock().insert(work_order_id, process);
        let _ = self.event_tx.send(ProcessEvent::Registered(work_order_id));
        Ok(())
    }

    /// Mark the process exited. Idempotent — whichever of the exit/close
    /// signals fires first wins; the second is a no-op.
    pub fn mark_exited(&self, work_order_id: WorkOrderId, exit_code: Option<i32>, exit_signal: Option<i32>) -> bool {
        let mut processes = self.processes.lock();
        let Some(process) = processes.get_mut(&work_order_id) else { return false };
        if process.exited {
            return false;
        }
        process.exited = true;
        process.exit_code = exit_code;
        process.exit_signal = exit_signal;
        drop(processes);
        let _ = self.event_tx.send(ProcessEvent::Exited { work_order_id, exit_code });
        true
    }

    pub fn get(&self, work_order_id: WorkOrderId) -> Option<ManagedProcess> {
        self.processes.lock().get(&work_order_id).cloned()
    }

    /// SIGTERM, wait up to `grace`, escalate to SIGKILL if the process is
    /// still alive.
    pub async fn kill(&self, work_order_id: WorkOrderId, grace: Duration) -> KillOutcome {
        let Some(pid) = self.live_pid(work_order_id) else {
            return KillOutcome { success: true, forced_kill: false };
        };

        let nix_pid = nix::unistd::Pid::from_raw(pid as i32);
        if nix::sys::signal::kill(nix_pid, nix::sys::signal::Signal::SIGTERM).is_err() {
            return KillOutcome { success: false, forced_kill: false };
        }

        tokio::time::sleep(grace).await;

        let forced_kill = if nix::sys::signal::kill(nix_pid, None).is_ok() {
            let _ = nix::sys::signal::kill(nix_pid, nix::sys::signal::Signal::SIGKILL);
            true
        } else {
            false
        };

        let event = if forced_kill { ProcessEvent::ForceKilled(work_order_id) } else { ProcessEvent::Killed(work_order_id) };
        let _ = self.event_tx.send(event);
        KillOutcome { success: true, forced_kill }
    }

    /// Skip the grace period and SIGKILL immediately.
    pub async fn force_kill(&self, work_order_id: WorkOrderId) -> KillOutcome {
        let Some(pid) = self.live_pid(work_order_id) else {
            return KillOutcome { success: true, forced_kill: false };
        };
        let nix_pid = nix::unistd::Pid::from_raw(pid as i32);
        let success = nix::sys::signal::kill(nix_pid, nix::sys::signal::Signal::SIGKILL).is_ok();
        if success {
            let _ = self.event_tx.send(ProcessEvent::ForceKilled(work_order_id));
        }
        KillOutcome { success, forced_kill: true }
    }

    /// Kill every non-exited entry, used on shutdown.
    pub async fn kill_all(&self, grace: Duration) {
        let ids: Vec<WorkOrderId> = {
            let processes = self.processes.lock();
            processes.values().filter(|p| !p.exited).map(|p| p.work_order_id).collect()
        };
        for id in ids {
            self.kill(id, grace).await;
        }
    }

    /// Non-exited work orders whose process has run longer than `max_lifetime`.
    pub fn stale(&self, now: DateTime<Utc>, max_lifetime: Duration) -> Vec<WorkOrderId> {
        let max_lifetime = chrono::Duration::from_std(max_lifetime).unwrap_or(chrono::Duration::MAX);
        self.processes
            .lock()
            .values()
            .filter(|p| !p.exited && now.signed_duration_since(p.started_at) > max_lifetime)
            .map(|p| p.work_order_id)
            .collect()
    }

    pub fn notify_stale(&self, work_order_id: WorkOrderId) {
        let _ = self.event_tx.send(ProcessEvent::Stale(work_order_id));
    }

    fn live_pid(&self, work_order_id: WorkOrderId) -> Option<u32> {
        let processes = self.processes.lock();
        let process = processes.get(&work_order_id)?;
        if process.exited {
            None
        } else {
            Some(process.pid)
        }
    }
}

#[cfg(test)]
#[path = "process_tests.rs"]
mod tests;
