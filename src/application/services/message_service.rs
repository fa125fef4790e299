//! Message Service
//!
//! Direct messages between two users.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{DirectMessage, MessageRepository, UserRepository};

/// Message service trait
#[async_trait]
pub trait MessageService: Send + Sync {
    /// Persist a new message from sender to recipient
    async fn send(
        &self,
        sender_id: Uuid,
        recipient_id: Uuid,
        body: String,
    ) -> Result<DirectMessage, MessageError>;

    /// The two-party conversation, oldest first
    async fn conversation(
        &self,
        user_a: Uuid,
        user_b: Uuid,
        limit: i64,
    ) -> Result<Vec<DirectMessage>, MessageError>;
}

/// Message service errors
#[derive(Debug, thiserror::Error)]
pub enum MessageError {
    #[error("Recipient not found")]
    RecipientNotFound,

    #[error("You cannot message yourself")]
    SelfMessage,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// MessageService implementation
pub struct MessageServiceImpl<M, U>
where
    M: MessageRepository,
    U: UserRepository,
{
    message_repo: Arc<M>,
    user_repo: Arc<U>,
}

impl<M, U> MessageServiceImpl<M, U>
where
    M: MessageRepository,
    U: UserRepository,
{
    pub fn new(message_repo: Arc<M>, user_repo: Arc<U>) -> Self {
        Self {
            message_repo,
            user_repo,
        }
    }
}

#[async_trait]
impl<M, U> MessageService for MessageServiceImpl<M, U>
where
    M: MessageRepository,
    U: UserRepository,
{
    async fn send(
        &self,
        sender_id: Uuid,
        recipient_id: Uuid,
        body: String,
    ) -> Result<DirectMessage, MessageError> {
        if sender_id == recipient_id {
            return Err(MessageError::SelfMessage);
        }

        self.user_repo
            .find_by_id(recipient_id)
            .await
            .map_err(|e| MessageError::Internal(e.to_string()))?
            .ok_or(MessageError::RecipientNotFound)?;

        let message = DirectMessage::new(sender_id, recipient_id, body);
        self.message_repo
            .create(&message)
            .await
            .map_err(|e| MessageError::Internal(e.to_string()))
    }

    async fn conversation(
        &self,
        user_a: Uuid,
        user_b: Uuid,
        limit: i64,
    ) -> Result<Vec<DirectMessage>, MessageError> {
        self.message_repo
            .conversation(user_a, user_b, limit)
            .await
            .map_err(|e| MessageError::Internal(e.to_string()))
    }
}
