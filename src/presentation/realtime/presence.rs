//! Presence set and broadcaster.
//!
//! Presence is never stored on its own: it is recomputed from the registry's
//! connection map at each state change and pushed, in full, to every live
//! connection. Clients treat the latest list as authoritative.

use uuid::Uuid;

use super::events::ServerFrame;
use super::registry::ConnectionHandle;
use crate::infrastructure::metrics;

/// Point-in-time set of user ids with at least one live connection.
///
/// Sorted so that broadcast payloads are deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PresenceSet(Vec<Uuid>);

impl PresenceSet {
    /// Build a set from user ids (deduplicated, sorted).
    pub fn from_users(users: impl IntoIterator<Item = Uuid>) -> Self {
        let mut ids: Vec<Uuid> = users.into_iter().collect();
        ids.sort_unstable();
        ids.dedup();
        Self(ids)
    }

    pub fn users(&self) -> &[Uuid] {
        &self.0
    }

    pub fn contains(&self, user_id: Uuid) -> bool {
        self.0.binary_search(&user_id).is_ok()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Pushes the full online-identity list to every live connection.
#[derive(Debug, Default)]
pub struct PresenceBroadcaster;

impl PresenceBroadcaster {
    pub fn new() -> Self {
        Self
    }

    /// Announce `presence` to every recipient.
    ///
    /// A recipient whose transport is mid-close is skipped; its failure
    /// never blocks delivery to the rest.
    pub fn announce<'a>(
        &self,
        presence: &PresenceSet,
        recipients: impl Iterator<Item = &'a ConnectionHandle>,
    ) {
        let online = presence.users().to_vec();
        let mut delivered = 0usize;
        let mut dropped = 0usize;

        for handle in recipients {
            if handle.push(ServerFrame::Presence(online.clone())) {
                delivered += 1;
            } else {
                dropped += 1;
                tracing::debug!(
                    connection_id = %handle.id,
                    user_id = %handle.user_id,
                    "presence frame dropped on closing connection"
                );
            }
        }

        metrics::PRESENCE_BROADCASTS_TOTAL.inc();
        tracing::debug!(online = online.len(), delivered, dropped, "presence announced");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presence_set_sorts_and_dedups() {
        let a = Uuid::now_v7();
        let b = Uuid::now_v7();

        let set = PresenceSet::from_users(vec![b, a, b]);

        assert_eq!(set.len(), 2);
        assert!(set.contains(a));
        assert!(set.contains(b));
        let mut expected = vec![a, b];
        expected.sort_unstable();
        assert_eq!(set.users(), expected.as_slice());
    }

    #[test]
    fn test_empty_presence_set() {
        let set = PresenceSet::from_users(std::iter::empty());
        assert!(set.is_empty());
        assert!(!set.contains(Uuid::now_v7()));
    }
}
