//! Post entity and repository trait.
//!
//! Maps to the `posts`, `post_likes` and `bookmarks` tables.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::AppError;

/// A feed post: an image with a caption.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub caption: String,
    pub image_url: String,
    pub created_at: DateTime<Utc>,
}

impl Post {
    pub fn new(author_id: Uuid, caption: String, image_url: String) -> Self {
        Self {
            id: Uuid::now_v7(),
            author_id,
            caption,
            image_url,
            created_at: Utc::now(),
        }
    }
}

/// A post joined with the author summary and aggregate counts,
/// as the feed endpoints return it.
#[derive(Debug, Clone)]
pub struct FeedItem {
    pub post: Post,
    pub author_username: String,
    pub author_avatar_url: Option<String>,
    pub like_count: i64,
    pub comment_count: i64,
}

/// Repository trait for Post data access operations.
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Persist a new post.
    async fn create(&self, post: &Post) -> Result<Post, AppError>;

    /// Find a post by id.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, AppError>;

    /// Newest-first feed with author summaries and counts.
    async fn feed(&self, limit: i64) -> Result<Vec<FeedItem>, AppError>;

    /// All posts by one author, newest first, same shape as the feed.
    async fn by_author(&self, author_id: Uuid) -> Result<Vec<FeedItem>, AppError>;

    /// Delete a post (cascades to comments, likes and bookmarks).
    async fn delete(&self, id: Uuid) -> Result<(), AppError>;

    /// Add a like. Returns false if the user had already liked the post.
    async fn add_like(&self, post_id: Uuid, user_id: Uuid) -> Result<bool, AppError>;

    /// Remove a like. Returns false if there was none.
    async fn remove_like(&self, post_id: Uuid, user_id: Uuid) -> Result<bool, AppError>;

    /// Current like count for a post.
    async fn like_count(&self, post_id: Uuid) -> Result<i64, AppError>;

    /// Add a bookmark. Returns false if already bookmarked.
    async fn add_bookmark(&self, user_id: Uuid, post_id: Uuid) -> Result<bool, AppError>;

    /// Remove a bookmark. Returns false if there was none.
    async fn remove_bookmark(&self, user_id: Uuid, post_id: Uuid) -> Result<bool, AppError>;

    /// Whether the user has bookmarked the post.
    async fn is_bookmarked(&self, user_id: Uuid, post_id: Uuid) -> Result<bool, AppError>;
}
