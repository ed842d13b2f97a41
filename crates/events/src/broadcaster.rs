// SPDX-License-Identifier: MIT

//! Typed, filtered fan-out of progress events to subscribers (spec §4.9).
//!
//! Fan-out is non-blocking: a dropped receiver is pruned the next time an
//! event would have been delivered to it, rather than stalling delivery to
//! every other subscriber.

use crate::connection::ConnectionId;
use crate::preferences::{allowed_by, PartialPreferences, SubscriptionPreferences};
use agentgate_core::{Event, WorkOrderId};
use parking_lot::Mutex;
use std::collections::HashMap;
use tokio::sync::mpsc;

#[derive(Default)]
pub struct Broadcaster {
    connections: Mutex<HashMap<ConnectionId, mpsc::UnboundedSender<Event>>>,
    subscriptions: Mutex<HashMap<(ConnectionId, WorkOrderId), SubscriptionPreferences>>,
}

impl Broadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand out a fresh connection id and its receiving half. The caller is
    /// responsible for reading from the receiver and for calling
    /// [`Broadcaster::unregister`] once the socket closes.
    pub fn register(&self) -> (ConnectionId, mpsc::UnboundedReceiver<Event>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = ConnectionId::new();
        self.connections.lock().insert(id, tx);
        (id, rx)
    }

    /// Subscribe `connection_id` to events for `work_order_id`. `partial`
    /// overrides only the fields it sets; everything else defaults to `true`.
    pub fn subscribe(&self, connection_id: ConnectionId, work_order_id: WorkOrderId, partial: Option<PartialPreferences>) {
        let prefs = SubscriptionPreferences::merged_with(partial);
        self.subscriptions.lock().insert((connection_id, work_order_id), prefs);
    }

    /// Drop a connection and every subscription it holds, atomically from
    /// the perspective of concurrent `emit` callers.
    pub fn unregister(&self, connection_id: ConnectionId) {
        self.connections.lock().remove(&connection_id);
        self.subscriptions.lock().retain(|(conn, _), _| *conn != connection_id);
    }

    /// Fan `event` out to every connection subscribed to its work order with
    /// a preference bit that admits this payload kind.
    pub fn emit(&self, event: Event) {
        let targets: Vec<ConnectionId> = {
            let subscriptions = self.subscriptions.lock();
            subscriptions
                .iter()
                .filter(|((_, work_order_id), _)| *work_order_id == event.work_order_id)
                .filter(|(_, prefs)| allowed_by(&event.payload, prefs))
                .map(|((connection_id, _), _)| *connection_id)
                .collect()
        };
        if targets.is_empty() {
            return;
        }

        let mut stale = Vec::new();
        {
            let connections = self.connections.lock();
            for connection_id in &targets {
                if let Some(sender) = connections.get(connection_id) {
                    if sender.send(event.clone()).is_err() {
                        stale.push(*connection_id);
                    }
                }
            }
        }
        for connection_id in stale {
            self.unregister(connection_id);
        }
    }
}

#[cfg(test)]
#[path = "broadcaster_tests.rs"]
mod tests;
