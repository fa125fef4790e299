//! Connection registry.
//!
//! The single owner of presence state: which users currently hold live
//! connections, and the outbound queue handle for each connection. All
//! mutations go through one write lock, and the presence broadcast that
//! follows a membership change happens under that same lock, so no observer
//! ever sees a presence list that did not correspond to a real registry
//! state.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tokio::sync::mpsc;
use uuid::Uuid;

use super::events::ServerFrame;
use super::presence::{PresenceBroadcaster, PresenceSet};
use crate::infrastructure::metrics;

/// Sender half of a connection's outbound frame queue.
pub type FrameSender = mpsc::UnboundedSender<ServerFrame>;

/// One live transport session tracked by the registry.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    pub id: Uuid,
    pub user_id: Uuid,
    pub opened_at: DateTime<Utc>,
    sender: FrameSender,
}

impl ConnectionHandle {
    /// Queue a frame for this connection. Returns false if the transport
    /// task has already gone away; the frame is then simply lost.
    pub fn push(&self, frame: ServerFrame) -> bool {
        self.sender.send(frame).is_ok()
    }
}

/// Registry errors.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("connection {0} is already registered")]
    DuplicateConnection(Uuid),
}

#[derive(Default)]
struct RegistryInner {
    /// user id -> that user's live connections
    by_user: HashMap<Uuid, HashMap<Uuid, ConnectionHandle>>,
    /// connection id -> owning user id
    owners: HashMap<Uuid, Uuid>,
}

/// Registry of live connections, owned by [`crate::startup::AppState`] and
/// passed explicitly to every component that needs it.
pub struct ConnectionRegistry {
    inner: RwLock<RegistryInner>,
    broadcaster: PresenceBroadcaster,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(RegistryInner::default()),
            broadcaster: PresenceBroadcaster::new(),
        }
    }

    /// Bind a connection to a user.
    ///
    /// Fails with [`RegistryError::DuplicateConnection`] if the connection id
    /// is already bound to any user. When the user transitions from zero to
    /// one connection, the new presence set is broadcast before the lock is
    /// released.
    pub fn register(
        &self,
        user_id: Uuid,
        connection_id: Uuid,
        sender: FrameSender,
    ) -> Result<(), RegistryError> {
        let mut inner = self.inner.write();

        if inner.owners.contains_key(&connection_id) {
            return Err(RegistryError::DuplicateConnection(connection_id));
        }
        inner.owners.insert(connection_id, user_id);

        let handle = ConnectionHandle {
            id: connection_id,
            user_id,
            opened_at: Utc::now(),
            sender,
        };
        let came_online = {
            let connections = inner.by_user.entry(user_id).or_default();
            let was_empty = connections.is_empty();
            connections.insert(connection_id, handle);
            was_empty
        };

        metrics::REALTIME_CONNECTIONS.inc();
        tracing::info!(%user_id, %connection_id, "connection registered");

        if came_online {
            self.announce_locked(&inner);
        }
        Ok(())
    }

    /// Remove a connection from whatever user owns it.
    ///
    /// Unknown connection ids are a no-op. When the owning user's last
    /// connection disappears, the shrunken presence set is broadcast
    /// atomically with the removal.
    pub fn unregister(&self, connection_id: Uuid) {
        let mut inner = self.inner.write();

        let Some(user_id) = inner.owners.remove(&connection_id) else {
            tracing::debug!(%connection_id, "unregister for unknown connection");
            return;
        };

        let went_offline = match inner.by_user.get_mut(&user_id) {
            Some(connections) => {
                if connections.remove(&connection_id).is_some() {
                    metrics::REALTIME_CONNECTIONS.dec();
                }
                connections.is_empty()
            }
            None => false,
        };

        tracing::info!(%user_id, %connection_id, "connection unregistered");

        if went_offline {
            inner.by_user.remove(&user_id);
            self.announce_locked(&inner);
        }
    }

    /// Snapshot of the user's live connection handles (empty if offline).
    pub fn connections_of(&self, user_id: Uuid) -> Vec<ConnectionHandle> {
        let inner = self.inner.read();
        inner
            .by_user
            .get(&user_id)
            .map(|connections| connections.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Point-in-time copy of the presence set.
    pub fn snapshot_presence(&self) -> PresenceSet {
        let inner = self.inner.read();
        PresenceSet::from_users(inner.by_user.keys().copied())
    }

    /// Whether the user has at least one live connection.
    pub fn is_online(&self, user_id: Uuid) -> bool {
        let inner = self.inner.read();
        inner
            .by_user
            .get(&user_id)
            .map(|connections| !connections.is_empty())
            .unwrap_or(false)
    }

    /// Total live connections across all users.
    pub fn connection_count(&self) -> usize {
        self.inner.read().owners.len()
    }

    /// Recompute presence and broadcast it while holding the write lock.
    fn announce_locked(&self, inner: &RegistryInner) {
        let presence = PresenceSet::from_users(inner.by_user.keys().copied());
        metrics::ONLINE_USERS.set(presence.len() as i64);
        self.broadcaster.announce(
            &presence,
            inner.by_user.values().flat_map(|connections| connections.values()),
        );
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::UnboundedReceiver;

    fn connection() -> (Uuid, FrameSender, UnboundedReceiver<ServerFrame>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Uuid::new_v4(), tx, rx)
    }

    fn drain(rx: &mut UnboundedReceiver<ServerFrame>) -> Vec<ServerFrame> {
        let mut frames = Vec::new();
        while let Ok(frame) = rx.try_recv() {
            frames.push(frame);
        }
        frames
    }

    #[test]
    fn test_register_broadcasts_presence_to_all_connections() {
        let registry = ConnectionRegistry::new();
        let user_a = Uuid::now_v7();
        let user_b = Uuid::now_v7();

        let (conn_a, tx_a, mut rx_a) = connection();
        registry.register(user_a, conn_a, tx_a).unwrap();

        let frames_a = drain(&mut rx_a);
        assert_eq!(frames_a, vec![ServerFrame::Presence(vec![user_a])]);

        let (conn_b, tx_b, mut rx_b) = connection();
        registry.register(user_b, conn_b, tx_b).unwrap();

        let mut expected = vec![user_a, user_b];
        expected.sort_unstable();

        // both the existing and the new connection see the updated list
        assert_eq!(drain(&mut rx_a), vec![ServerFrame::Presence(expected.clone())]);
        assert_eq!(drain(&mut rx_b), vec![ServerFrame::Presence(expected)]);
    }

    #[test]
    fn test_second_connection_of_same_user_does_not_broadcast() {
        let registry = ConnectionRegistry::new();
        let user = Uuid::now_v7();

        let (conn1, tx1, mut rx1) = connection();
        registry.register(user, conn1, tx1).unwrap();
        drain(&mut rx1);

        let (conn2, tx2, mut rx2) = connection();
        registry.register(user, conn2, tx2).unwrap();

        assert!(drain(&mut rx1).is_empty());
        assert!(drain(&mut rx2).is_empty());
        assert_eq!(registry.connections_of(user).len(), 2);
    }

    #[test]
    fn test_duplicate_connection_id_is_refused() {
        let registry = ConnectionRegistry::new();
        let user_a = Uuid::now_v7();
        let user_b = Uuid::now_v7();

        let (conn, tx, _rx) = connection();
        registry.register(user_a, conn, tx).unwrap();

        let (_, tx2, _rx2) = connection();
        let err = registry.register(user_b, conn, tx2).unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateConnection(id) if id == conn));

        // the failed registration must not have rebound the connection
        assert!(registry.is_online(user_a));
        assert!(!registry.is_online(user_b));
    }

    #[test]
    fn test_unregister_unknown_connection_is_noop() {
        let registry = ConnectionRegistry::new();
        registry.unregister(Uuid::new_v4());
        assert_eq!(registry.connection_count(), 0);
        assert!(registry.snapshot_presence().is_empty());
    }

    #[test]
    fn test_user_leaves_presence_only_after_last_connection_closes() {
        let registry = ConnectionRegistry::new();
        let user = Uuid::now_v7();

        let (conn1, tx1, mut rx1) = connection();
        let (conn2, tx2, _rx2) = connection();
        registry.register(user, conn1, tx1).unwrap();
        registry.register(user, conn2, tx2).unwrap();
        drain(&mut rx1);

        registry.unregister(conn2);
        assert!(registry.is_online(user));
        // still present: no broadcast for the first disconnect
        assert!(drain(&mut rx1).is_empty());

        registry.unregister(conn1);
        assert!(!registry.is_online(user));
        assert!(registry.snapshot_presence().is_empty());
    }

    #[test]
    fn test_exactly_one_broadcast_reflects_the_removal() {
        let registry = ConnectionRegistry::new();
        let user = Uuid::now_v7();
        let watcher = Uuid::now_v7();

        let (watcher_conn, watcher_tx, mut watcher_rx) = connection();
        registry.register(watcher, watcher_conn, watcher_tx).unwrap();

        let (conn1, tx1, _rx1) = connection();
        let (conn2, tx2, _rx2) = connection();
        registry.register(user, conn1, tx1).unwrap();
        registry.register(user, conn2, tx2).unwrap();
        drain(&mut watcher_rx);

        registry.unregister(conn1);
        registry.unregister(conn2);

        let frames = drain(&mut watcher_rx);
        assert_eq!(frames, vec![ServerFrame::Presence(vec![watcher])]);
    }

    #[test]
    fn test_presence_matches_nonempty_connection_sets() {
        let registry = ConnectionRegistry::new();
        let users: Vec<Uuid> = (0..3).map(|_| Uuid::now_v7()).collect();

        let mut conns = Vec::new();
        for user in &users {
            let (conn, tx, _rx) = connection();
            registry.register(*user, conn, tx).unwrap();
            conns.push((conn, _rx));
        }
        registry.unregister(conns[1].0);

        let presence = registry.snapshot_presence();
        for user in &users {
            assert_eq!(
                presence.contains(*user),
                !registry.connections_of(*user).is_empty()
            );
        }
    }

    #[test]
    fn test_dead_recipient_does_not_block_presence_broadcast() {
        let registry = ConnectionRegistry::new();
        let dead_user = Uuid::now_v7();
        let live_user = Uuid::now_v7();

        let (dead_conn, dead_tx, dead_rx) = connection();
        registry.register(dead_user, dead_conn, dead_tx).unwrap();
        drop(dead_rx); // transport went away without unregistering yet

        let (live_conn, live_tx, mut live_rx) = connection();
        registry.register(live_user, live_conn, live_tx).unwrap();

        let frames = drain(&mut live_rx);
        assert_eq!(frames.len(), 1);
        let mut expected = vec![dead_user, live_user];
        expected.sort_unstable();
        assert_eq!(frames[0], ServerFrame::Presence(expected));
    }
}
