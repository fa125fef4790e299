//! Realtime integration tests
//!
//! Exercises the registry, router and emitters together, the way the HTTP
//! handlers and socket tasks drive them in production.

use feed_server::domain::DirectMessage;
use feed_server::presentation::realtime::{
    ActorSummary, ConnectionRegistry, EventRouter, Notifier, ServerFrame,
};
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use uuid::Uuid;

struct Harness {
    registry: Arc<ConnectionRegistry>,
    notifier: Notifier,
}

impl Harness {
    fn new() -> Self {
        let registry = Arc::new(ConnectionRegistry::new());
        let notifier = Notifier::new(EventRouter::new(registry.clone()));
        Self { registry, notifier }
    }

    /// Open a connection for a user, returning its id and frame stream.
    fn connect(&self, user_id: Uuid) -> (Uuid, UnboundedReceiver<ServerFrame>) {
        let connection_id = Uuid::new_v4();
        let (tx, rx) = mpsc::unbounded_channel();
        self.registry
            .register(user_id, connection_id, tx)
            .expect("registration should succeed");
        (connection_id, rx)
    }
}

fn drain(rx: &mut UnboundedReceiver<ServerFrame>) -> Vec<ServerFrame> {
    let mut frames = Vec::new();
    while let Ok(frame) = rx.try_recv() {
        frames.push(frame);
    }
    frames
}

fn actor(name: &str) -> ActorSummary {
    ActorSummary {
        username: name.into(),
        avatar_url: None,
    }
}

fn sorted(mut ids: Vec<Uuid>) -> Vec<Uuid> {
    ids.sort_unstable();
    ids
}

#[tokio::test]
async fn full_connect_notify_disconnect_scenario() {
    let harness = Harness::new();
    let user_a = Uuid::now_v7();
    let user_b = Uuid::now_v7();
    let post_id = Uuid::now_v7();

    // A connects: presence [A] reaches conn1
    let (conn1, mut rx1) = harness.connect(user_a);
    assert_eq!(drain(&mut rx1), vec![ServerFrame::Presence(vec![user_a])]);

    // B connects: presence [A, B] reaches both connections
    let (_conn2, mut rx2) = harness.connect(user_b);
    let both = sorted(vec![user_a, user_b]);
    assert_eq!(drain(&mut rx1), vec![ServerFrame::Presence(both.clone())]);
    assert_eq!(drain(&mut rx2), vec![ServerFrame::Presence(both)]);

    // B likes A's post: the notification reaches A only
    harness.notifier.like(user_b, actor("bob"), user_a, post_id);

    let frames_a = drain(&mut rx1);
    assert_eq!(frames_a.len(), 1);
    match &frames_a[0] {
        ServerFrame::Notification(payload) => {
            assert_eq!(payload.user_id, user_b);
            assert_eq!(payload.target_id, post_id);
        }
        other => panic!("expected a notification for A, got {other:?}"),
    }
    assert!(drain(&mut rx2).is_empty(), "the liker gets no notification");

    // A disconnects: presence [B] reaches conn2 only
    harness.registry.unregister(conn1);
    assert_eq!(drain(&mut rx2), vec![ServerFrame::Presence(vec![user_b])]);

    // delivery targeting A is now a silent no-op
    harness.notifier.like(user_b, actor("bob"), user_a, post_id);
    assert!(drain(&mut rx2).is_empty());
    assert!(!harness.registry.is_online(user_a));
}

#[tokio::test]
async fn multi_device_user_sees_events_on_every_connection() {
    let harness = Harness::new();
    let owner = Uuid::now_v7();
    let liker = Uuid::now_v7();

    let (_phone, mut phone_rx) = harness.connect(owner);
    let (_laptop, mut laptop_rx) = harness.connect(owner);
    drain(&mut phone_rx);
    drain(&mut laptop_rx);

    harness
        .notifier
        .like(liker, actor("bob"), owner, Uuid::now_v7());

    assert_eq!(drain(&mut phone_rx).len(), 1);
    assert_eq!(drain(&mut laptop_rx).len(), 1);
}

#[tokio::test]
async fn multi_device_presence_survives_single_disconnect() {
    let harness = Harness::new();
    let user = Uuid::now_v7();
    let watcher = Uuid::now_v7();

    let (_watcher_conn, mut watcher_rx) = harness.connect(watcher);
    let (conn1, _rx1) = harness.connect(user);
    let (conn2, _rx2) = harness.connect(user);
    drain(&mut watcher_rx);

    harness.registry.unregister(conn1);
    assert!(harness.registry.is_online(user));
    assert!(drain(&mut watcher_rx).is_empty());

    harness.registry.unregister(conn2);
    assert!(!harness.registry.is_online(user));
    assert_eq!(
        drain(&mut watcher_rx),
        vec![ServerFrame::Presence(vec![watcher])]
    );
}

#[tokio::test]
async fn chat_push_goes_to_recipient_connections_only() {
    let harness = Harness::new();
    let sender = Uuid::now_v7();
    let recipient = Uuid::now_v7();

    let (_s, mut sender_rx) = harness.connect(sender);
    let (_r1, mut recipient_rx1) = harness.connect(recipient);
    let (_r2, mut recipient_rx2) = harness.connect(recipient);
    drain(&mut sender_rx);
    drain(&mut recipient_rx1);
    drain(&mut recipient_rx2);

    let message = DirectMessage::new(sender, recipient, "see you at 8".into());
    harness.notifier.chat_message(&message);

    for rx in [&mut recipient_rx1, &mut recipient_rx2] {
        let frames = drain(rx);
        assert_eq!(frames.len(), 1);
        match &frames[0] {
            ServerFrame::NewMessage(push) => assert_eq!(push.body, "see you at 8"),
            other => panic!("expected newMessage, got {other:?}"),
        }
    }
    assert!(drain(&mut sender_rx).is_empty());
}

#[tokio::test]
async fn self_like_produces_no_event_anywhere() {
    let harness = Harness::new();
    let owner = Uuid::now_v7();
    let bystander = Uuid::now_v7();

    let (_o, mut owner_rx) = harness.connect(owner);
    let (_b, mut bystander_rx) = harness.connect(bystander);
    drain(&mut owner_rx);
    drain(&mut bystander_rx);

    harness
        .notifier
        .like(owner, actor("alice"), owner, Uuid::now_v7());
    harness
        .notifier
        .dislike(owner, actor("alice"), owner, Uuid::now_v7());

    assert!(drain(&mut owner_rx).is_empty());
    assert!(drain(&mut bystander_rx).is_empty());
}

#[tokio::test]
async fn presence_invariant_holds_across_arbitrary_churn() {
    let harness = Harness::new();
    let users: Vec<Uuid> = (0..4).map(|_| Uuid::now_v7()).collect();

    // two connections each, then tear half of them down
    let mut conns = Vec::new();
    for user in &users {
        for _ in 0..2 {
            let (conn, rx) = harness.connect(*user);
            conns.push((*user, conn, rx));
        }
    }
    for (_, conn, _) in conns.iter().step_by(2) {
        harness.registry.unregister(*conn);
    }
    // users 0..4 all still have one live connection
    let presence = harness.registry.snapshot_presence();
    for user in &users {
        assert_eq!(
            presence.contains(*user),
            !harness.registry.connections_of(*user).is_empty()
        );
    }
    assert_eq!(presence.len(), users.len());
}
