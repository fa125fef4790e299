//! Notification and message emitters.
//!
//! Thin adapters invoked by HTTP handlers after their write has committed.
//! Each call shapes a typed [`Event`] and hands it to the router; none of
//! them touches the data store or performs I/O, so a handler can call them
//! synchronously without delaying its response.

use uuid::Uuid;

use super::events::{ActorSummary, ChatMessagePush, Event};
use super::router::EventRouter;
use crate::domain::DirectMessage;

/// Emitter facade handed to HTTP handlers through the application state.
#[derive(Clone)]
pub struct Notifier {
    router: EventRouter,
}

impl Notifier {
    pub fn new(router: EventRouter) -> Self {
        Self { router }
    }

    /// Notify a post owner that their post was liked.
    /// Liking your own post never notifies anyone.
    pub fn like(&self, actor_id: Uuid, actor: ActorSummary, post_owner_id: Uuid, post_id: Uuid) {
        if actor_id == post_owner_id {
            return;
        }
        self.router.deliver(
            post_owner_id,
            Event::Like {
                actor_id,
                actor,
                post_id,
                at: chrono::Utc::now(),
            },
        );
    }

    /// Notify a post owner that a like was withdrawn. Same self-suppression
    /// rule as [`Notifier::like`].
    pub fn dislike(&self, actor_id: Uuid, actor: ActorSummary, post_owner_id: Uuid, post_id: Uuid) {
        if actor_id == post_owner_id {
            return;
        }
        self.router.deliver(
            post_owner_id,
            Event::Dislike {
                actor_id,
                actor,
                post_id,
                at: chrono::Utc::now(),
            },
        );
    }

    /// Notify a post owner about a new comment. Commenting on your own post
    /// is suppressed, consistent with like/dislike.
    pub fn comment(
        &self,
        actor_id: Uuid,
        actor: ActorSummary,
        post_owner_id: Uuid,
        post_id: Uuid,
        body: &str,
    ) {
        if actor_id == post_owner_id {
            return;
        }
        self.router.deliver(
            post_owner_id,
            Event::Comment {
                actor_id,
                actor,
                post_id,
                body: body.to_owned(),
                at: chrono::Utc::now(),
            },
        );
    }

    /// Notify a user that someone started following them. Self-follows are
    /// rejected upstream, so no suppression here.
    pub fn follow(&self, actor_id: Uuid, actor: ActorSummary, followed_id: Uuid) {
        self.router.deliver(
            followed_id,
            Event::Follow {
                actor_id,
                actor,
                followed_id,
                at: chrono::Utc::now(),
            },
        );
    }

    /// Push a persisted chat message to its recipient. The sender already
    /// has the message from its own request/response path.
    pub fn chat_message(&self, message: &DirectMessage) {
        self.router
            .deliver(message.recipient_id, Event::ChatMessage(ChatMessagePush::from(message)));
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use test_case::test_case;
    use tokio::sync::mpsc::UnboundedReceiver;
    use uuid::Uuid;

    use super::*;
    use crate::presentation::realtime::events::{NotificationKind, ServerFrame};
    use crate::presentation::realtime::registry::ConnectionRegistry;

    struct Fixture {
        registry: Arc<ConnectionRegistry>,
        notifier: Notifier,
    }

    impl Fixture {
        fn new() -> Self {
            let registry = Arc::new(ConnectionRegistry::new());
            let notifier = Notifier::new(EventRouter::new(registry.clone()));
            Self { registry, notifier }
        }

        fn connect(&self, user_id: Uuid) -> UnboundedReceiver<ServerFrame> {
            let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
            self.registry.register(user_id, Uuid::new_v4(), tx).unwrap();
            while rx.try_recv().is_ok() {}
            rx
        }
    }

    fn actor() -> ActorSummary {
        ActorSummary {
            username: "bob".into(),
            avatar_url: None,
        }
    }

    #[test_case(NotificationKind::Like; "liking your own post")]
    #[test_case(NotificationKind::Dislike; "disliking your own post")]
    fn test_self_notification_is_suppressed(kind: NotificationKind) {
        let fixture = Fixture::new();
        let owner = Uuid::now_v7();
        let post_id = Uuid::now_v7();
        let mut rx = fixture.connect(owner);

        match kind {
            NotificationKind::Like => fixture.notifier.like(owner, actor(), owner, post_id),
            NotificationKind::Dislike => fixture.notifier.dislike(owner, actor(), owner, post_id),
            _ => unreachable!(),
        }

        assert!(rx.try_recv().is_err(), "no event should reach the owner");
    }

    #[test]
    fn test_own_comment_is_suppressed() {
        let fixture = Fixture::new();
        let owner = Uuid::now_v7();
        let mut rx = fixture.connect(owner);

        fixture
            .notifier
            .comment(owner, actor(), owner, Uuid::now_v7(), "talking to myself");

        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_like_by_other_user_reaches_post_owner() {
        let fixture = Fixture::new();
        let owner = Uuid::now_v7();
        let liker = Uuid::now_v7();
        let post_id = Uuid::now_v7();
        let mut rx = fixture.connect(owner);

        fixture.notifier.like(liker, actor(), owner, post_id);

        match rx.try_recv().expect("owner should be notified") {
            ServerFrame::Notification(payload) => {
                assert_eq!(payload.kind, NotificationKind::Like);
                assert_eq!(payload.user_id, liker);
                assert_eq!(payload.target_id, post_id);
            }
            other => panic!("expected notification frame, got {other:?}"),
        }
    }

    #[test]
    fn test_follow_notifies_the_followed_user() {
        let fixture = Fixture::new();
        let followed = Uuid::now_v7();
        let follower = Uuid::now_v7();
        let mut rx = fixture.connect(followed);

        fixture.notifier.follow(follower, actor(), followed);

        match rx.try_recv().expect("followed user should be notified") {
            ServerFrame::Notification(payload) => {
                assert_eq!(payload.kind, NotificationKind::Follow);
                assert_eq!(payload.user_id, follower);
                assert_eq!(payload.target_id, followed);
            }
            other => panic!("expected notification frame, got {other:?}"),
        }
    }

    #[test]
    fn test_chat_message_reaches_recipient_only() {
        let fixture = Fixture::new();
        let sender = Uuid::now_v7();
        let recipient = Uuid::now_v7();
        let mut sender_rx = fixture.connect(sender);
        let mut recipient_rx = fixture.connect(recipient);
        while sender_rx.try_recv().is_ok() {}

        let message = DirectMessage::new(sender, recipient, "hello".into());
        fixture.notifier.chat_message(&message);

        match recipient_rx.try_recv().expect("recipient should get the push") {
            ServerFrame::NewMessage(push) => {
                assert_eq!(push.id, message.id);
                assert_eq!(push.body, "hello");
            }
            other => panic!("expected newMessage frame, got {other:?}"),
        }
        assert!(sender_rx.try_recv().is_err(), "sender must not get a duplicate push");
    }
}
