//! Comment entity and repository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::AppError;

/// A comment on a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(post_id: Uuid, author_id: Uuid, body: String) -> Self {
        Self {
            id: Uuid::now_v7(),
            post_id,
            author_id,
            body,
            created_at: Utc::now(),
        }
    }
}

/// A comment joined with the author summary, as returned to clients.
#[derive(Debug, Clone)]
pub struct CommentDetail {
    pub comment: Comment,
    pub author_username: String,
    pub author_avatar_url: Option<String>,
}

/// Repository trait for Comment data access operations.
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Persist a new comment.
    async fn create(&self, comment: &Comment) -> Result<Comment, AppError>;

    /// Comments on a post with author summaries, oldest first.
    async fn for_post(&self, post_id: Uuid) -> Result<Vec<CommentDetail>, AppError>;
}
