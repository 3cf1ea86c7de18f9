//! The set of live client connections.
//!
//! [`ConnectionRegistry`] is a [`BTreeMap`] keyed by [`ConnectionId`]
//! behind a [`tokio::sync::RwLock`]. Keying by id rules out duplicates,
//! and the ordered map gives every snapshot a stable iteration order.

use std::collections::BTreeMap;

use tokio::sync::{RwLock, RwLockWriteGuard};

use crate::connection::{Connection, ConnectionId};

/// Live connections, keyed by id.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    members: RwLock<BTreeMap<ConnectionId, Connection>>,
}

impl ConnectionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a connection.
    ///
    /// Returns `false` and leaves the registry untouched if a connection
    /// with the same id is already present.
    pub async fn register(&self, connection: Connection) -> bool {
        let mut members = self.members.write().await;
        insert_new(&mut members, connection)
    }

    /// Remove a connection.
    ///
    /// Returns whether anything was removed. Removing an absent id is a
    /// no-op.
    pub async fn deregister(&self, id: ConnectionId) -> bool {
        self.members.write().await.remove(&id).is_some()
    }

    /// Copy of the current membership, in id order.
    ///
    /// The copy is detached from the registry, so it can be iterated
    /// while other tasks register and deregister.
    pub async fn snapshot(&self) -> Vec<Connection> {
        self.members.read().await.values().cloned().collect()
    }

    /// Number of registered connections.
    pub async fn len(&self) -> usize {
        self.members.read().await.len()
    }

    /// Whether no connections are registered.
    pub async fn is_empty(&self) -> bool {
        self.members.read().await.is_empty()
    }

    /// Whether a connection with this id is registered.
    pub async fn contains(&self, id: ConnectionId) -> bool {
        self.members.read().await.contains_key(&id)
    }

    /// Exclusive access for operations that must not interleave with
    /// membership changes (initial snapshot, broadcast).
    pub(crate) async fn lock(&self) -> RwLockWriteGuard<'_, BTreeMap<ConnectionId, Connection>> {
        self.members.write().await
    }
}

/// Insert `connection` unless its id is already present.
pub(crate) fn insert_new(
    members: &mut BTreeMap<ConnectionId, Connection>,
    connection: Connection,
) -> bool {
    match members.entry(connection.id()) {
        std::collections::btree_map::Entry::Occupied(_) => false,
        std::collections::btree_map::Entry::Vacant(slot) => {
            slot.insert(connection);
            true
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn register_and_deregister() {
        let registry = ConnectionRegistry::new();
        let (conn, _rx) = Connection::channel(1);
        let id = conn.id();

        assert!(registry.register(conn).await);
        assert_eq!(registry.len().await, 1);
        assert!(registry.contains(id).await);

        assert!(registry.deregister(id).await);
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn duplicate_register_is_rejected() {
        let registry = ConnectionRegistry::new();
        let (conn, _rx) = Connection::channel(1);

        assert!(registry.register(conn.clone()).await);
        assert!(!registry.register(conn).await);
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn deregister_absent_is_noop() {
        let registry = ConnectionRegistry::new();
        let (kept, _rx_kept) = Connection::channel(1);
        let (never_added, _rx) = Connection::channel(1);
        registry.register(kept).await;

        assert!(!registry.deregister(never_added.id()).await);
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn snapshot_is_detached_and_ordered() {
        let registry = ConnectionRegistry::new();
        let mut receivers = Vec::new();
        for _ in 0..3 {
            let (conn, rx) = Connection::channel(1);
            receivers.push(rx);
            registry.register(conn).await;
        }

        let snapshot = registry.snapshot().await;
        let ids: Vec<_> = snapshot.iter().map(Connection::id).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);

        // Mutating the registry does not touch the snapshot already taken.
        for conn in &snapshot {
            registry.deregister(conn.id()).await;
        }
        assert!(registry.is_empty().await);
        assert_eq!(snapshot.len(), 3);
    }
}
