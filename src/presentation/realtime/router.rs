//! Event router.
//!
//! Fanout of one event to every live connection of its target user.
//! Delivery is at-most-once and best-effort: an offline target is a silent
//! no-op, a dead connection loses its copy, and nothing here ever returns an
//! error to the HTTP handler that triggered the event.

use std::sync::Arc;

use uuid::Uuid;

use super::events::Event;
use super::registry::ConnectionRegistry;
use crate::infrastructure::metrics;

/// Routes realtime events to the target user's live connections.
#[derive(Clone)]
pub struct EventRouter {
    registry: Arc<ConnectionRegistry>,
}

impl EventRouter {
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self { registry }
    }

    /// Deliver `event` to every connection of `target`.
    ///
    /// Each connection gets its own independent push; a failure on one (the
    /// transport is mid-close and will unregister itself) never prevents
    /// delivery to the rest.
    pub fn deliver(&self, target: Uuid, event: Event) {
        let connections = self.registry.connections_of(target);
        if connections.is_empty() {
            // offline recipient: the normal at-most-once path, not a failure
            return;
        }

        let kind = event.kind();
        let frame = event.into_frame();
        for handle in &connections {
            if handle.push(frame.clone()) {
                metrics::EVENTS_DELIVERED_TOTAL.with_label_values(&[kind]).inc();
            } else {
                metrics::EVENTS_DROPPED_TOTAL.with_label_values(&[kind]).inc();
                tracing::debug!(
                    connection_id = %handle.id,
                    user_id = %target,
                    kind,
                    "event dropped on closing connection"
                );
            }
        }

        tracing::debug!(
            user_id = %target,
            kind,
            connections = connections.len(),
            "event routed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presentation::realtime::events::{ActorSummary, ServerFrame};
    use chrono::Utc;
    use tokio::sync::mpsc;

    fn like_event() -> Event {
        Event::Like {
            actor_id: Uuid::now_v7(),
            actor: ActorSummary {
                username: "bob".into(),
                avatar_url: None,
            },
            post_id: Uuid::now_v7(),
            at: Utc::now(),
        }
    }

    #[test]
    fn test_deliver_to_offline_user_is_a_noop() {
        let registry = Arc::new(ConnectionRegistry::new());
        let router = EventRouter::new(registry.clone());
        let bystander = Uuid::now_v7();

        let (tx, mut rx) = mpsc::unbounded_channel();
        registry.register(bystander, Uuid::new_v4(), tx).unwrap();
        while rx.try_recv().is_ok() {}

        router.deliver(Uuid::now_v7(), like_event());

        // no frame reaches anyone, and no error surfaces
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_deliver_reaches_every_connection_of_the_target() {
        let registry = Arc::new(ConnectionRegistry::new());
        let router = EventRouter::new(registry.clone());
        let target = Uuid::now_v7();

        let (tx1, mut rx1) = mpsc::unbounded_channel();
        let (tx2, mut rx2) = mpsc::unbounded_channel();
        registry.register(target, Uuid::new_v4(), tx1).unwrap();
        registry.register(target, Uuid::new_v4(), tx2).unwrap();
        while rx1.try_recv().is_ok() {}
        while rx2.try_recv().is_ok() {}

        router.deliver(target, like_event());

        let frame1 = rx1.try_recv().expect("first connection should get the event");
        let frame2 = rx2.try_recv().expect("second connection should get the event");
        assert!(matches!(frame1, ServerFrame::Notification(_)));
        assert_eq!(frame1, frame2);
        // exactly one attempt per connection
        assert!(rx1.try_recv().is_err());
        assert!(rx2.try_recv().is_err());
    }

    #[test]
    fn test_failure_on_one_connection_does_not_stop_the_rest() {
        let registry = Arc::new(ConnectionRegistry::new());
        let router = EventRouter::new(registry.clone());
        let target = Uuid::now_v7();

        let (dead_tx, dead_rx) = mpsc::unbounded_channel();
        let (live_tx, mut live_rx) = mpsc::unbounded_channel();
        registry.register(target, Uuid::new_v4(), dead_tx).unwrap();
        registry.register(target, Uuid::new_v4(), live_tx).unwrap();
        drop(dead_rx);
        while live_rx.try_recv().is_ok() {}

        router.deliver(target, like_event());

        assert!(matches!(
            live_rx.try_recv().expect("live connection should still get the event"),
            ServerFrame::Notification(_)
        ));
    }
}
