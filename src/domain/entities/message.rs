//! Direct message entity and repository trait.
//!
//! Maps to the `messages` table. Messages are two-party; there is no
//! separate conversation entity.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::AppError;

/// One persisted chat message between two users.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectMessage {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub recipient_id: Uuid,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl DirectMessage {
    pub fn new(sender_id: Uuid, recipient_id: Uuid, body: String) -> Self {
        Self {
            id: Uuid::now_v7(),
            sender_id,
            recipient_id,
            body,
            created_at: Utc::now(),
        }
    }
}

/// Repository trait for direct message access.
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Persist a new message.
    async fn create(&self, message: &DirectMessage) -> Result<DirectMessage, AppError>;

    /// The conversation between two users, oldest first.
    async fn conversation(
        &self,
        user_a: Uuid,
        user_b: Uuid,
        limit: i64,
    ) -> Result<Vec<DirectMessage>, AppError>;
}
