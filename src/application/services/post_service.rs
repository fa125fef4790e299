//! Post Service
//!
//! Feed posts: creation, listing, likes, comments, bookmarks.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Comment, CommentDetail, CommentRepository, FeedItem, Post, PostRepository};

/// Post service trait
#[async_trait]
pub trait PostService: Send + Sync {
    /// Create a new post
    async fn create_post(
        &self,
        author_id: Uuid,
        caption: String,
        image_url: String,
    ) -> Result<Post, PostError>;

    /// Newest-first feed
    async fn feed(&self, limit: i64) -> Result<Vec<FeedItem>, PostError>;

    /// One author's posts, newest first
    async fn posts_of(&self, author_id: Uuid) -> Result<Vec<FeedItem>, PostError>;

    /// Like a post. Returns the post owner for notification purposes.
    async fn like(&self, post_id: Uuid, actor_id: Uuid) -> Result<Uuid, PostError>;

    /// Withdraw a like. Returns the post owner for notification purposes.
    async fn dislike(&self, post_id: Uuid, actor_id: Uuid) -> Result<Uuid, PostError>;

    /// Comment on a post. Returns the comment and the post owner.
    async fn add_comment(
        &self,
        post_id: Uuid,
        author_id: Uuid,
        body: String,
    ) -> Result<(Comment, Uuid), PostError>;

    /// Comments on a post, oldest first
    async fn comments_of(&self, post_id: Uuid) -> Result<Vec<CommentDetail>, PostError>;

    /// Delete the caller's own post
    async fn delete_post(&self, post_id: Uuid, actor_id: Uuid) -> Result<(), PostError>;

    /// Bookmark the post if unsaved, remove the bookmark otherwise
    async fn toggle_bookmark(
        &self,
        post_id: Uuid,
        user_id: Uuid,
    ) -> Result<BookmarkAction, PostError>;
}

/// What a bookmark toggle did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookmarkAction {
    Saved,
    Unsaved,
}

/// Post service errors
#[derive(Debug, thiserror::Error)]
pub enum PostError {
    #[error("Post not found")]
    NotFound,

    #[error("Permission denied")]
    Forbidden,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// PostService implementation
pub struct PostServiceImpl<P, C>
where
    P: PostRepository,
    C: CommentRepository,
{
    post_repo: Arc<P>,
    comment_repo: Arc<C>,
}

impl<P, C> PostServiceImpl<P, C>
where
    P: PostRepository,
    C: CommentRepository,
{
    pub fn new(post_repo: Arc<P>, comment_repo: Arc<C>) -> Self {
        Self {
            post_repo,
            comment_repo,
        }
    }

    async fn require_post(&self, post_id: Uuid) -> Result<Post, PostError> {
        self.post_repo
            .find_by_id(post_id)
            .await
            .map_err(|e| PostError::Internal(e.to_string()))?
            .ok_or(PostError::NotFound)
    }
}

#[async_trait]
impl<P, C> PostService for PostServiceImpl<P, C>
where
    P: PostRepository,
    C: CommentRepository,
{
    async fn create_post(
        &self,
        author_id: Uuid,
        caption: String,
        image_url: String,
    ) -> Result<Post, PostError> {
        let post = Post::new(author_id, caption, image_url);
        self.post_repo
            .create(&post)
            .await
            .map_err(|e| PostError::Internal(e.to_string()))
    }

    async fn feed(&self, limit: i64) -> Result<Vec<FeedItem>, PostError> {
        self.post_repo
            .feed(limit)
            .await
            .map_err(|e| PostError::Internal(e.to_string()))
    }

    async fn posts_of(&self, author_id: Uuid) -> Result<Vec<FeedItem>, PostError> {
        self.post_repo
            .by_author(author_id)
            .await
            .map_err(|e| PostError::Internal(e.to_string()))
    }

    async fn like(&self, post_id: Uuid, actor_id: Uuid) -> Result<Uuid, PostError> {
        let post = self.require_post(post_id).await?;
        self.post_repo
            .add_like(post_id, actor_id)
            .await
            .map_err(|e| PostError::Internal(e.to_string()))?;
        Ok(post.author_id)
    }

    async fn dislike(&self, post_id: Uuid, actor_id: Uuid) -> Result<Uuid, PostError> {
        let post = self.require_post(post_id).await?;
        self.post_repo
            .remove_like(post_id, actor_id)
            .await
            .map_err(|e| PostError::Internal(e.to_string()))?;
        Ok(post.author_id)
    }

    async fn add_comment(
        &self,
        post_id: Uuid,
        author_id: Uuid,
        body: String,
    ) -> Result<(Comment, Uuid), PostError> {
        let post = self.require_post(post_id).await?;

        let comment = Comment::new(post_id, author_id, body);
        let comment = self
            .comment_repo
            .create(&comment)
            .await
            .map_err(|e| PostError::Internal(e.to_string()))?;

        Ok((comment, post.author_id))
    }

    async fn comments_of(&self, post_id: Uuid) -> Result<Vec<CommentDetail>, PostError> {
        self.require_post(post_id).await?;
        self.comment_repo
            .for_post(post_id)
            .await
            .map_err(|e| PostError::Internal(e.to_string()))
    }

    async fn delete_post(&self, post_id: Uuid, actor_id: Uuid) -> Result<(), PostError> {
        let post = self.require_post(post_id).await?;
        if post.author_id != actor_id {
            return Err(PostError::Forbidden);
        }
        self.post_repo
            .delete(post_id)
            .await
            .map_err(|e| PostError::Internal(e.to_string()))
    }

    async fn toggle_bookmark(
        &self,
        post_id: Uuid,
        user_id: Uuid,
    ) -> Result<BookmarkAction, PostError> {
        self.require_post(post_id).await?;

        let saved = self
            .post_repo
            .is_bookmarked(user_id, post_id)
            .await
            .map_err(|e| PostError::Internal(e.to_string()))?;

        if saved {
            self.post_repo
                .remove_bookmark(user_id, post_id)
                .await
                .map_err(|e| PostError::Internal(e.to_string()))?;
            Ok(BookmarkAction::Unsaved)
        } else {
            self.post_repo
                .add_bookmark(user_id, post_id)
                .await
                .map_err(|e| PostError::Internal(e.to_string()))?;
            Ok(BookmarkAction::Saved)
        }
    }
}
