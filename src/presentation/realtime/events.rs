//! Realtime event model and wire frames.
//!
//! Events are a closed tagged union, constructed once by an emitter and
//! immutable afterwards. Frames are what actually crosses the socket:
//! `presence`, `notification` and `newMessage`, tagged by `event` with the
//! payload under `data`.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::{DirectMessage, User};

/// Minimal actor display fields carried inside a notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActorSummary {
    pub username: String,
    #[serde(rename = "avatar")]
    pub avatar_url: Option<String>,
}

impl From<&User> for ActorSummary {
    fn from(user: &User) -> Self {
        Self {
            username: user.username.clone(),
            avatar_url: user.avatar_url.clone(),
        }
    }
}

/// Discriminator for notification events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Like,
    Dislike,
    Comment,
    Follow,
}

/// A realtime event addressed to a single recipient.
#[derive(Debug, Clone)]
pub enum Event {
    Like {
        actor_id: Uuid,
        actor: ActorSummary,
        post_id: Uuid,
        at: DateTime<Utc>,
    },
    Dislike {
        actor_id: Uuid,
        actor: ActorSummary,
        post_id: Uuid,
        at: DateTime<Utc>,
    },
    Comment {
        actor_id: Uuid,
        actor: ActorSummary,
        post_id: Uuid,
        body: String,
        at: DateTime<Utc>,
    },
    Follow {
        actor_id: Uuid,
        actor: ActorSummary,
        followed_id: Uuid,
        at: DateTime<Utc>,
    },
    ChatMessage(ChatMessagePush),
}

impl Event {
    /// Stable kind label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::Like { .. } => "like",
            Event::Dislike { .. } => "dislike",
            Event::Comment { .. } => "comment",
            Event::Follow { .. } => "follow",
            Event::ChatMessage(_) => "chat_message",
        }
    }

    /// Convert into the frame pushed onto recipient connections.
    pub fn into_frame(self) -> ServerFrame {
        match self {
            Event::Like {
                actor_id,
                actor,
                post_id,
                at,
            } => ServerFrame::Notification(NotificationPayload {
                kind: NotificationKind::Like,
                user_id: actor_id,
                user_details: actor,
                target_id: post_id,
                message: Some("Your post was liked".into()),
                timestamp: at,
            }),
            Event::Dislike {
                actor_id,
                actor,
                post_id,
                at,
            } => ServerFrame::Notification(NotificationPayload {
                kind: NotificationKind::Dislike,
                user_id: actor_id,
                user_details: actor,
                target_id: post_id,
                message: Some("Your post was disliked".into()),
                timestamp: at,
            }),
            Event::Comment {
                actor_id,
                actor,
                post_id,
                body,
                at,
            } => ServerFrame::Notification(NotificationPayload {
                kind: NotificationKind::Comment,
                user_id: actor_id,
                user_details: actor,
                target_id: post_id,
                message: Some(body),
                timestamp: at,
            }),
            Event::Follow {
                actor_id,
                actor,
                followed_id,
                at,
            } => ServerFrame::Notification(NotificationPayload {
                kind: NotificationKind::Follow,
                user_id: actor_id,
                user_details: actor,
                target_id: followed_id,
                message: Some("You have a new follower".into()),
                timestamp: at,
            }),
            Event::ChatMessage(push) => ServerFrame::NewMessage(push),
        }
    }
}

/// The `notification` frame payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPayload {
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub user_id: Uuid,
    pub user_details: ActorSummary,
    pub target_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// The persisted chat message as pushed to its recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessagePush {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub recipient_id: Uuid,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl From<&DirectMessage> for ChatMessagePush {
    fn from(message: &DirectMessage) -> Self {
        Self {
            id: message.id,
            sender_id: message.sender_id,
            recipient_id: message.recipient_id,
            body: message.body.clone(),
            created_at: message.created_at,
        }
    }
}

/// One frame on the wire.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerFrame {
    /// Full list of currently online user ids, replacing any previous list.
    #[serde(rename = "presence")]
    Presence(Vec<Uuid>),

    /// A like/dislike/comment/follow notification for the addressed user.
    #[serde(rename = "notification")]
    Notification(NotificationPayload),

    /// A chat message pushed to its recipient.
    #[serde(rename = "newMessage")]
    NewMessage(ChatMessagePush),
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn actor() -> ActorSummary {
        ActorSummary {
            username: "alice".into(),
            avatar_url: Some("https://cdn.example.com/alice.png".into()),
        }
    }

    #[test]
    fn test_presence_frame_shape() {
        let id = Uuid::nil();
        let frame = ServerFrame::Presence(vec![id]);

        let value = serde_json::to_value(&frame).unwrap();
        assert_eq!(
            value,
            json!({
                "event": "presence",
                "data": ["00000000-0000-0000-0000-000000000000"],
            })
        );
    }

    #[test]
    fn test_like_event_becomes_notification_frame() {
        let actor_id = Uuid::now_v7();
        let post_id = Uuid::now_v7();
        let at = Utc::now();

        let event = Event::Like {
            actor_id,
            actor: actor(),
            post_id,
            at,
        };
        assert_eq!(event.kind(), "like");

        let frame = event.into_frame();
        let value = serde_json::to_value(&frame).unwrap();
        assert_eq!(value["event"], "notification");
        assert_eq!(value["data"]["type"], "like");
        assert_eq!(value["data"]["userId"], json!(actor_id));
        assert_eq!(value["data"]["userDetails"]["username"], "alice");
        assert_eq!(
            value["data"]["userDetails"]["avatar"],
            "https://cdn.example.com/alice.png"
        );
        assert_eq!(value["data"]["targetId"], json!(post_id));
        assert_eq!(value["data"]["message"], "Your post was liked");
    }

    #[test]
    fn test_comment_event_carries_comment_body() {
        let event = Event::Comment {
            actor_id: Uuid::now_v7(),
            actor: actor(),
            post_id: Uuid::now_v7(),
            body: "nice shot!".into(),
            at: Utc::now(),
        };

        let value = serde_json::to_value(&event.into_frame()).unwrap();
        assert_eq!(value["data"]["type"], "comment");
        assert_eq!(value["data"]["message"], "nice shot!");
    }

    #[test]
    fn test_chat_message_becomes_new_message_frame() {
        let message = DirectMessage::new(Uuid::now_v7(), Uuid::now_v7(), "hey".into());
        let event = Event::ChatMessage(ChatMessagePush::from(&message));
        assert_eq!(event.kind(), "chat_message");

        let value = serde_json::to_value(&event.into_frame()).unwrap();
        assert_eq!(value["event"], "newMessage");
        assert_eq!(value["data"]["id"], json!(message.id));
        assert_eq!(value["data"]["senderId"], json!(message.sender_id));
        assert_eq!(value["data"]["recipientId"], json!(message.recipient_id));
        assert_eq!(value["data"]["body"], "hey");
    }
}
