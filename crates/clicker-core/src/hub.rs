//! The clicker hub: shared counter, connection registry, broadcast engine.
//!
//! [`ClickerHub`] is constructed once at startup and shared via [`Arc`]
//! with every session. It is the only place that touches the counter or
//! the registry.
//!
//! # Ordering
//!
//! Connect, broadcast, and click all run under the registry's exclusive
//! lock, and delivery never awaits, so the lock is held only for a pass
//! over the members. Consequences:
//!
//! - A new connection's initial value is queued before any broadcast can
//!   reach it.
//! - Each click produces exactly one broadcast, carrying its own value.
//! - Every client sees a strictly increasing sequence of values.
//!
//! [`Arc`]: std::sync::Arc

use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::connection::{Connection, ConnectionId};
use crate::counter::SharedCounter;
use crate::error::HubError;
use crate::registry::{ConnectionRegistry, insert_new};

/// Outcome of one broadcast pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastReport {
    /// The counter value that was sent.
    pub value: u64,
    /// How many connections accepted the value.
    pub delivered: usize,
    /// Connections whose delivery failed and which were deregistered.
    pub pruned: Vec<ConnectionId>,
}

/// Owner of the shared counter and the connection registry.
#[derive(Debug, Default)]
pub struct ClickerHub {
    counter: SharedCounter,
    registry: ConnectionRegistry,
}

impl ClickerHub {
    /// Create a hub with the counter at zero and no connections.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a hub around an existing counter.
    #[cfg(test)]
    pub(crate) fn with_counter(counter: SharedCounter) -> Self {
        Self {
            counter,
            registry: ConnectionRegistry::new(),
        }
    }

    /// The shared counter.
    pub const fn counter(&self) -> &SharedCounter {
        &self.counter
    }

    /// The connection registry.
    pub const fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    /// Register a connection and unicast it the current value.
    ///
    /// Returns the value sent. The connection is only registered if the
    /// initial value was queued.
    pub async fn connect(&self, connection: Connection) -> Result<u64, HubError> {
        let id = connection.id();
        let mut members = self.registry.lock().await;
        if members.contains_key(&id) {
            return Err(HubError::Duplicate(id));
        }

        let value = self.counter.current();
        connection.deliver(value)?;
        insert_new(&mut members, connection);

        info!(connection = %id, value, connections = members.len(), "Client connected");
        Ok(value)
    }

    /// Deregister a connection. Absent ids are ignored.
    pub async fn disconnect(&self, id: ConnectionId) -> bool {
        let removed = self.registry.deregister(id).await;
        if removed {
            info!(connection = %id, "Client disconnected");
        }
        removed
    }

    /// Push the current value to every registered connection.
    pub async fn broadcast_current_value(&self) -> BroadcastReport {
        let mut members = self.registry.lock().await;
        let value = self.counter.current();
        deliver_to_all(&mut members, value)
    }

    /// Increment the counter and broadcast the new value, as one step.
    pub async fn click(&self) -> BroadcastReport {
        let mut members = self.registry.lock().await;
        let value = self.counter.increment();
        deliver_to_all(&mut members, value)
    }
}

/// Attempt delivery to each member exactly once, dropping the failures.
fn deliver_to_all(members: &mut BTreeMap<ConnectionId, Connection>, value: u64) -> BroadcastReport {
    let mut delivered: usize = 0;
    let mut pruned = Vec::new();

    members.retain(|id, connection| match connection.deliver(value) {
        Ok(()) => {
            delivered = delivered.saturating_add(1);
            true
        }
        Err(e) => {
            debug!(connection = %id, error = %e, "Pruning connection after failed delivery");
            pruned.push(*id);
            false
        }
    });

    debug!(value, delivered, pruned = pruned.len(), "Broadcast counter value");

    BroadcastReport {
        value,
        delivered,
        pruned,
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects
)]
mod tests {
    use std::sync::Arc;

    use tokio::sync::mpsc;

    use super::*;

    fn open(capacity: usize) -> (Connection, mpsc::Receiver<u64>) {
        Connection::channel(capacity)
    }

    #[tokio::test]
    async fn connect_sends_current_value() {
        let hub = ClickerHub::with_counter(SharedCounter::starting_at(41));
        let (conn, mut rx) = open(8);

        assert_eq!(hub.connect(conn).await.unwrap(), 41);
        assert_eq!(rx.recv().await, Some(41));
        assert_eq!(hub.registry().len().await, 1);
    }

    #[tokio::test]
    async fn connect_twice_is_duplicate() {
        let hub = ClickerHub::new();
        let (conn, _rx) = open(8);
        let id = conn.id();

        hub.connect(conn.clone()).await.unwrap();
        assert_eq!(hub.connect(conn).await, Err(HubError::Duplicate(id)));
        assert_eq!(hub.registry().len().await, 1);
    }

    #[tokio::test]
    async fn connect_with_dead_peer_is_not_registered() {
        let hub = ClickerHub::new();
        let (conn, rx) = open(8);
        drop(rx);

        assert!(matches!(hub.connect(conn).await, Err(HubError::Delivery(_))));
        assert!(hub.registry().is_empty().await);
    }

    #[tokio::test]
    async fn broadcast_without_clients_is_empty() {
        let hub = ClickerHub::new();
        let report = hub.broadcast_current_value().await;
        assert_eq!(report.value, 0);
        assert_eq!(report.delivered, 0);
        assert!(report.pruned.is_empty());
    }

    #[tokio::test]
    async fn broadcast_current_value_does_not_increment() {
        let hub = ClickerHub::new();
        let (conn, mut rx) = open(8);
        hub.connect(conn).await.unwrap();
        assert_eq!(rx.recv().await, Some(0));

        let report = hub.broadcast_current_value().await;
        assert_eq!(report.value, 0);
        assert_eq!(report.delivered, 1);
        assert_eq!(rx.recv().await, Some(0));
        assert_eq!(hub.counter().current(), 0);
    }

    #[tokio::test]
    async fn three_clients_click_and_leave() {
        let hub = ClickerHub::new();
        let (a, mut rx_a) = open(8);
        let (b, mut rx_b) = open(8);
        let (c, mut rx_c) = open(8);
        let b_id = b.id();

        for conn in [a, b, c] {
            hub.connect(conn).await.unwrap();
        }
        assert_eq!(hub.registry().len().await, 3);
        for rx in [&mut rx_a, &mut rx_b, &mut rx_c] {
            assert_eq!(rx.recv().await, Some(0));
        }

        let report = hub.click().await;
        assert_eq!(report.value, 1);
        assert_eq!(report.delivered, 3);
        for rx in [&mut rx_a, &mut rx_b, &mut rx_c] {
            assert_eq!(rx.recv().await, Some(1));
        }

        assert!(hub.disconnect(b_id).await);
        drop(rx_b);

        let report = hub.click().await;
        assert_eq!(report.value, 2);
        assert_eq!(report.delivered, 2);
        assert!(report.pruned.is_empty());
        assert_eq!(rx_a.recv().await, Some(2));
        assert_eq!(rx_c.recv().await, Some(2));
        assert_eq!(hub.registry().len().await, 2);
    }

    #[tokio::test]
    async fn dead_connections_are_pruned_without_blocking_others() {
        let hub = ClickerHub::new();
        let (alive, mut rx_alive) = open(8);
        let (dead, rx_dead) = open(8);
        let dead_id = dead.id();

        hub.connect(alive).await.unwrap();
        hub.connect(dead).await.unwrap();
        drop(rx_dead);

        let report = hub.click().await;
        assert_eq!(report.delivered, 1);
        assert_eq!(report.pruned, vec![dead_id]);
        assert!(!hub.registry().contains(dead_id).await);

        assert_eq!(rx_alive.recv().await, Some(0));
        assert_eq!(rx_alive.recv().await, Some(1));
    }

    #[tokio::test]
    async fn slow_connection_is_pruned_and_its_queue_closes() {
        let hub = ClickerHub::new();
        let (slow, mut rx_slow) = open(2);
        let slow_id = slow.id();
        hub.connect(slow).await.unwrap();

        // Initial value plus one click fill the queue; the next click overflows it.
        hub.click().await;
        let report = hub.click().await;
        assert_eq!(report.pruned, vec![slow_id]);
        assert!(hub.registry().is_empty().await);

        assert_eq!(rx_slow.recv().await, Some(0));
        assert_eq!(rx_slow.recv().await, Some(1));
        assert_eq!(rx_slow.recv().await, None);
    }

    #[tokio::test]
    async fn disconnect_absent_is_noop() {
        let hub = ClickerHub::new();
        let (conn, _rx) = open(8);
        assert!(!hub.disconnect(conn.id()).await);
        assert!(!hub.disconnect(conn.id()).await);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn connect_during_clicks_gets_snapshot_first() {
        const CLICKS: u64 = 2000;

        let hub = Arc::new(ClickerHub::new());
        let clicker = {
            let hub = Arc::clone(&hub);
            tokio::spawn(async move {
                for _ in 0..CLICKS {
                    hub.click().await;
                    tokio::task::yield_now().await;
                }
            })
        };

        let mut joined = Vec::new();
        for _ in 0..200 {
            let (conn, rx) = open(4096);
            let snapshot = hub.connect(conn).await.unwrap();
            joined.push((snapshot, rx));
            tokio::task::yield_now().await;
        }
        clicker.await.unwrap();
        assert_eq!(hub.counter().current(), CLICKS);

        for (snapshot, mut rx) in joined {
            assert_eq!(rx.recv().await, Some(snapshot));
            let mut expected = snapshot;
            while let Ok(value) = rx.try_recv() {
                expected += 1;
                assert_eq!(value, expected, "gap after snapshot {snapshot}");
            }
            assert_eq!(expected, CLICKS);
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_clicks_are_counted_and_ordered() {
        let hub = Arc::new(ClickerHub::new());
        let (watcher, mut rx) = open(1024);
        hub.connect(watcher).await.unwrap();
        assert_eq!(rx.recv().await, Some(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let hub = Arc::clone(&hub);
            handles.push(tokio::spawn(async move {
                for _ in 0..50 {
                    hub.click().await;
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(hub.counter().current(), 400);

        let mut received = Vec::new();
        while let Ok(value) = rx.try_recv() {
            received.push(value);
        }
        let expected: Vec<u64> = (1..=400).collect();
        assert_eq!(received, expected);
    }
}
