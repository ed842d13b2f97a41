// SPDX-License-Identifier: MIT

//! `Application`: the single explicitly-constructed, explicitly-torn-down
//! owner of the daemon's singleton registries — the driver registry, the
//! admission queue, the subprocess registry, and the event broadcaster —
//! plus the persisted entity stores and the audit log.
//!
//! One work order at a time flows: `submit` enqueues and persists it; the
//! `run` loop pulls ready ids off the queue, acquires a workspace, and
//! drives one [`agentgate_engine::iteration_loop::run_iteration_loop`] call
//! per work order, wrapping the production [`DefaultLoopHost`] in an
//! [`ObservingLoopHost`] so every iteration's effect on the run state
//! machine (C7) is persisted and broadcast (C9) as it happens.

use agentgate_core::run::{Run, RunEvent};
use agentgate_core::work_order::{WorkOrder, WorkOrderStatus, WorkspaceSource};
use agentgate_core::{Clock, RunId, RunResult, Workspace, WorkOrderId};
use agentgate_driver::DriverRegistry;
use agentgate_engine::{EngineError, LoopOutcome};
use agentgate_events::Broadcaster;
use agentgate_gates::CiSignalSource;
use agentgate_queue::{ProcessRegistry, Queue};
use agentgate_sandbox::{Sandbox, SandboxProvider, SubprocessSandboxProvider};
use agentgate_storage::{AuditLog, AuditLogConfig, RunStore, WorkOrderStore, WorkspaceStore};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::error::ApplicationError;
use crate::gate_registry::NullCiSignalSource;
use crate::observing_host::ObservingLoopHost;

pub struct Application<C: Clock> {
    driver_registry: Arc<DriverRegistry>,
    sandbox_provider: Arc<dyn SandboxProvider>,
    ci_signal_source: Arc<dyn CiSignalSource>,
    queue: Arc<Queue>,
    queue_ready_rx: tokio::sync::Mutex<mpsc::UnboundedReceiver<WorkOrderId>>,
    process_registry: Arc<ProcessRegistry>,
    broadcaster: Arc<Broadcaster>,
    work_order_store: Arc<WorkOrderStore>,
    run_store: Arc<RunStore>,
    workspace_store: Arc<WorkspaceStore>,
    audit_log: Arc<AuditLog>,
    cancellations: Mutex<HashMap<WorkOrderId, CancellationToken>>,
    clock: C,
}

impl<C: Clock + 'static> Application<C> {
    pub fn new(
        state_dir: PathBuf,
        driver_registry: DriverRegistry,
        max_queue_size: usize,
        max_concurrent: usize,
        clock: C,
    ) -> Result<Self, ApplicationError> {
        agentgate_engine::validate().map_err(ApplicationError::StateMachineInvalid)?;

        let work_order_store = Arc::new(WorkOrderStore::open(state_dir.join("work_orders"))?);
        let run_store = Arc::new(RunStore::open(state_dir.join("runs"))?);
        let workspace_store = Arc::new(WorkspaceStore::open(state_dir.join("workspaces"))?);
        let audit_log = Arc::new(AuditLog::new(AuditLogConfig::from_env(state_dir.join("audit.jsonl"))?)?);

        let (queue, queue_ready_rx) = Queue::new(max_queue_size, max_concurrent);
        let (process_registry, _process_events) = ProcessRegistry::new();

        Ok(Self {
            driver_registry: Arc::new(driver_registry),
            sandbox_provider: Arc::new(SubprocessSandboxProvider),
            ci_signal_source: Arc::new(NullCiSignalSource),
            queue: Arc::new(queue),
            queue_ready_rx: tokio::sync::Mutex::new(queue_ready_rx),
            process_registry: Arc::new(process_registry),
            broadcaster: Arc::new(Broadcaster::new()),
            work_order_store,
            run_store,
            workspace_store,
            audit_log,
            cancellations: Mutex::new(HashMap::new()),
            clock,
        })
    }

    pub fn broadcaster(&self) -> Arc<Broadcaster> {
        Arc::clone(&self.broadcaster)
    }

    pub fn get_work_order(&self, id: WorkOrderId) -> Result<WorkOrder, ApplicationError> {
        Ok(self.work_order_store.load(id.as_str())?)
    }

    pub fn get_run(&self, id: RunId) -> Result<Run, ApplicationError> {
        Ok(self.run_store.load(id.as_str())?)
    }

    /// Persist and enqueue a validated work order.
    pub fn submit(&self, work_order: WorkOrder) -> Result<(), ApplicationError> {
        self.work_order_store.save(work_order.id.as_str(), &work_order)?;
        self.queue.enqueue(work_order.id)?;
        self.audit_log.record(
            self.clock.utc_now(),
            "work_order.submitted",
            serde_json::json!({ "work_order_id": work_order.id.to_string() }),
            None,
        )?;
        Ok(())
    }

    /// Request cancellation of a queued or running work order. Best-effort:
    /// signals the work order's cancellation token and force-cancels its
    /// queue slot, then transitions its run (if one exists) straight to
    /// `Canceled`. A background task racing this call settles on whichever
    /// terminal state lands last; `transition` rejects any further event
    /// once a run is terminal, so the outcome is never corrupted, only
    /// possibly attributed to the other writer.
    pub fn force_cancel(&self, work_order_id: WorkOrderId) -> Result<(), ApplicationError> {
        if let Some(token) = self.cancellations.lock().remove(&work_order_id) {
            token.cancel();
        }
        self.queue.force_cancel(work_order_id);

        let mut work_order = self.work_order_store.load(work_order_id.as_str())?;
        if let Some(run_id) = work_order.run_id {
            if let Ok(mut run) = self.run_store.load(run_id.as_str()) {
                crate::observing_host::force_cancel(&self.broadcaster, &self.run_store, &mut run, &self.clock)?;
            }
        }
        if !work_order.status.is_terminal() {
            work_order.advance_status(WorkOrderStatus::Canceled, self.clock.utc_now())?;
            self.work_order_store.save(work_order_id.as_str(), &work_order)?;
        }
        Ok(())
    }

    /// Drain the queue's `ready` signal until `shutdown` is canceled,
    /// spawning one task per admitted work order.
    pub async fn run(self: Arc<Self>, shutdown: CancellationToken) {
        loop {
            let next = {
                let mut rx = self.queue_ready_rx.lock().await;
                tokio::select! {
                    () = shutdown.cancelled() => None,
                    id = rx.recv() => id,
                }
            };
            let Some(id) = next else { break };
            if !self.queue.mark_started(id) {
                continue;
            }
            let app = Arc::clone(&self);
            tokio::spawn(async move {
                if let Err(err) = app.execute_work_order(id).await {
                    tracing::error!(work_order_id = %id, error = %err, "work order execution failed");
                }
                app.queue.mark_finished(id);
            });
        }
    }

    /// Wait up to `drain_timeout` for in-flight work orders to finish on
    /// their own, then force-kill anything still running.
    pub async fn shutdown(&self, drain_timeout: Duration, kill_grace: Duration) {
        let deadline = tokio::time::Instant::now() + drain_timeout;
        while self.queue.running_len() > 0 && tokio::time::Instant::now() < deadline {
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        self.process_registry.kill_all(kill_grace).await;
    }

    async fn execute_work_order(&self, id: WorkOrderId) -> Result<(), ApplicationError> {
        let mut work_order = self.work_order_store.load(id.as_str())?;
        work_order.advance_status(WorkOrderStatus::Running, self.clock.utc_now())?;
        self.work_order_store.save(id.as_str(), &work_order)?;

        let workspace_root = match &work_order.workspace_source {
            WorkspaceSource::Local { path } => path.clone(),
            other => {
                let reason = format!("workspace source `{other:?}` needs an external collaborator to materialize");
                work_order.error = Some(reason.clone());
                work_order.advance_status(WorkOrderStatus::Failed, self.clock.utc_now())?;
                self.work_order_store.save(id.as_str(), &work_order)?;
                return Err(ApplicationError::UnsupportedWorkspaceSource(reason));
            }
        };

        let mut workspace = Workspace::new(workspace_root.clone());
        let now = self.clock.utc_now();
        workspace.lease(id.to_string(), now);
        self.workspace_store.save(workspace.id.as_str(), &workspace)?;

        let sandbox: Arc<dyn Sandbox> = Arc::from(self.sandbox_provider.acquire(workspace_root.clone()).await?);

        if !workspace.history_initialized {
            agentgate_snapshot::init_workspace_history(&workspace_root, "agentgate: initial snapshot").await?;
            workspace.history_initialized = true;
            self.workspace_store.save(workspace.id.as_str(), &workspace)?;
        }

        let gate_plan = crate::gate_plan_source::resolve(&work_order.gate_plan_source, &workspace_root)?;
        let driver = self.driver_registry.get(&work_order.agent_driver_key)?;
        let gate_registry = Arc::new(crate::gate_registry::build_gate_registry(&gate_plan.gates, Arc::clone(&self.ci_signal_source))?);

        let mut run = Run::new(work_order.id, workspace.id, now);
        agentgate_engine::transition(&mut run, RunEvent::WorkspaceAcquired, now, None)?;
        self.run_store.save(run.id.as_str(), &run)?;
        work_order.run_id = Some(run.id);
        self.work_order_store.save(id.as_str(), &work_order)?;

        let token = CancellationToken::new();
        self.cancellations.lock().insert(id, token);

        let inner_host = agentgate_engine::DefaultLoopHost {
            driver,
            sandbox,
            gate_registry,
            gates: gate_plan.gates.clone(),
            work_order_id: id,
            workspace_root: workspace_root.clone(),
            task_prompt: work_order.task_prompt.clone(),
            agent_timeout: Duration::from_secs(work_order.max_wall_clock_seconds),
        };

        let observing_host =
            ObservingLoopHost::new(inner_host, Arc::clone(&self.broadcaster), Arc::clone(&self.run_store), run, self.clock.clone());

        let (mut strategy, _manual_handle) = agentgate_engine::build_strategy(gate_plan.strategy, &gate_plan.config)?;

        let outcome = agentgate_engine::iteration_loop::run_iteration_loop(&observing_host, strategy.as_mut(), &gate_plan.limits, &self.clock)
            .await;

        self.cancellations.lock().remove(&id);
        let mut run = observing_host.run();

        let (status, error_text) = match outcome {
            Ok((LoopOutcome::Converged, _history)) => (WorkOrderStatus::Succeeded, None),
            Ok((LoopOutcome::Diverged { reason }, _history)) => {
                let result = if reason.contains("exceeded max") { RunResult::FailedTimeout } else { RunResult::FailedVerification };
                crate::observing_host::force_terminal_failure(&self.broadcaster, &self.run_store, &mut run, &self.clock, result)?;
                (WorkOrderStatus::Failed, Some(reason))
            }
            Ok((LoopOutcome::Escalated { reason }, _history)) => {
                crate::observing_host::force_terminal_failure(
                    &self.broadcaster,
                    &self.run_store,
                    &mut run,
                    &self.clock,
                    RunResult::FailedVerification,
                )?;
                (WorkOrderStatus::Failed, Some(reason))
            }
            Err(EngineError::Canceled) => {
                crate::observing_host::force_cancel(&self.broadcaster, &self.run_store, &mut run, &self.clock)?;
                (WorkOrderStatus::Canceled, Some("canceled".to_string()))
            }
            Err(err) => {
                let text = err.to_string();
                crate::observing_host::force_terminal_failure(&self.broadcaster, &self.run_store, &mut run, &self.clock, RunResult::FailedError)?;
                (WorkOrderStatus::Failed, Some(text))
            }
        };

        workspace.release();
        self.workspace_store.save(workspace.id.as_str(), &workspace)?;

        let completed_at = self.clock.utc_now();
        if work_order.status.can_advance_to(status) {
            work_order.advance_status(status, completed_at)?;
        }
        if let Some(reason) = error_text {
            work_order.error = Some(reason);
        }
        self.work_order_store.save(id.as_str(), &work_order)?;

        Ok(())
    }
}

#[cfg(test)]
#[path = "application_tests.rs"]
mod tests;
