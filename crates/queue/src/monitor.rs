// SPDX-License-Identifier: MIT

//! Stale-process monitor: wakes every `staleCheckIntervalMs` and flags
//! processes whose lifetime exceeds `maxProcessLifetimeMs` (spec §4.8).

use crate::process::ProcessRegistry;
use agentgate_core::Clock;
use std::sync::Arc;
use std::time::Duration;

/// Runs until `shutdown` resolves. Each tick calls [`ProcessRegistry::stale`]
/// and notifies the registry's event channel for every flagged work order.
pub async fn run_stale_monitor<C: Clock>(
    registry: Arc<ProcessRegistry>,
    clock: C,
    check_interval: Duration,
    max_lifetime: Duration,
    mut shutdown: tokio::sync::oneshot::Receiver<()>,
) {
    let mut ticker = tokio::time::interval(check_interval);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                for work_order_id in registry.stale(clock.utc_now(), max_lifetime) {
                    registry.notify_stale(work_order_id);
                }
            }
            _ = &mut shutdown => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentgate_core::{FakeClock, RunId, WorkOrderId};
    use crate::process::ProcessEvent;

    #[tokio::test(start_paused = true)]
    async fn flags_a_process_once_it_outlives_max_lifetime() {
        let (registry, mut events) = ProcessRegistry::new();
        let registry = Arc::new(registry);
        let clock = FakeClock::new();
        let id = WorkOrderId::new();
        registry.register(id, RunId::new(), Some(1), clock.utc_now()).unwrap();
        let _ = events.try_recv(); // drain the Registered event

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
        let handle = tokio::spawn(run_stale_monitor(
            registry.clone(),
            clock.clone(),
            Duration::from_millis(10),
            Duration::from_secs(60),
            shutdown_rx,
        ));

        clock.advance(Duration::from_secs(120));
        tokio::time::advance(Duration::from_millis(20)).await;
        tokio::time::sleep(Duration::from_millis(1)).await;

        let _ = shutdown_tx.send(());
        handle.await.unwrap();

        let mut saw_stale = false;
        while let Ok(event) = events.try_recv() {
            if matches!(event, ProcessEvent::Stale(flagged) if flagged == id) {
                saw_stale = true;
            }
        }
        assert!(saw_stale);
    }
}
