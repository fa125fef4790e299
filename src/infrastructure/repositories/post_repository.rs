//! Post Repository Implementation
//!
//! PostgreSQL implementation of post storage, likes and bookmarks.
//! Feed queries join the author and aggregate counts in one round trip.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{FeedItem, Post, PostRepository};
use crate::shared::error::AppError;

/// Row for plain post lookups.
#[derive(Debug, sqlx::FromRow)]
struct PostRow {
    id: Uuid,
    author_id: Uuid,
    caption: String,
    image_url: String,
    created_at: DateTime<Utc>,
}

impl PostRow {
    fn into_post(self) -> Post {
        Post {
            id: self.id,
            author_id: self.author_id,
            caption: self.caption,
            image_url: self.image_url,
            created_at: self.created_at,
        }
    }
}

/// Row for feed queries: post + author summary + counts.
#[derive(Debug, sqlx::FromRow)]
struct FeedItemRow {
    id: Uuid,
    author_id: Uuid,
    caption: String,
    image_url: String,
    created_at: DateTime<Utc>,
    author_username: String,
    author_avatar_url: Option<String>,
    like_count: i64,
    comment_count: i64,
}

impl FeedItemRow {
    fn into_feed_item(self) -> FeedItem {
        FeedItem {
            post: Post {
                id: self.id,
                author_id: self.author_id,
                caption: self.caption,
                image_url: self.image_url,
                created_at: self.created_at,
            },
            author_username: self.author_username,
            author_avatar_url: self.author_avatar_url,
            like_count: self.like_count,
            comment_count: self.comment_count,
        }
    }
}

const FEED_SELECT: &str = r#"
    SELECT p.id, p.author_id, p.caption, p.image_url, p.created_at,
           u.username AS author_username, u.avatar_url AS author_avatar_url,
           (SELECT COUNT(*) FROM post_likes pl WHERE pl.post_id = p.id) AS like_count,
           (SELECT COUNT(*) FROM comments c WHERE c.post_id = p.id) AS comment_count
    FROM posts p
    JOIN users u ON u.id = p.author_id
"#;

/// PostgreSQL post repository implementation.
#[derive(Clone)]
pub struct PgPostRepository {
    pool: PgPool,
}

impl PgPostRepository {
    /// Create a new PgPostRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostRepository for PgPostRepository {
    async fn create(&self, post: &Post) -> Result<Post, AppError> {
        let row = sqlx::query_as::<_, PostRow>(
            r#"
            INSERT INTO posts (id, author_id, caption, image_url, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, author_id, caption, image_url, created_at
            "#,
        )
        .bind(post.id)
        .bind(post.author_id)
        .bind(&post.caption)
        .bind(&post.image_url)
        .bind(post.created_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into_post())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, AppError> {
        let row = sqlx::query_as::<_, PostRow>(
            "SELECT id, author_id, caption, image_url, created_at FROM posts WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_post()))
    }

    async fn feed(&self, limit: i64) -> Result<Vec<FeedItem>, AppError> {
        let rows = sqlx::query_as::<_, FeedItemRow>(&format!(
            "{FEED_SELECT} ORDER BY p.created_at DESC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into_feed_item()).collect())
    }

    async fn by_author(&self, author_id: Uuid) -> Result<Vec<FeedItem>, AppError> {
        let rows = sqlx::query_as::<_, FeedItemRow>(&format!(
            "{FEED_SELECT} WHERE p.author_id = $1 ORDER BY p.created_at DESC"
        ))
        .bind(author_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into_feed_item()).collect())
    }

    async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn add_like(&self, post_id: Uuid, user_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            INSERT INTO post_likes (post_id, user_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(post_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn remove_like(&self, post_id: Uuid, user_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM post_likes WHERE post_id = $1 AND user_id = $2")
            .bind(post_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn like_count(&self, post_id: Uuid) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM post_likes WHERE post_id = $1")
            .bind(post_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn add_bookmark(&self, user_id: Uuid, post_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            INSERT INTO bookmarks (user_id, post_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(post_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn remove_bookmark(&self, user_id: Uuid, post_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM bookmarks WHERE user_id = $1 AND post_id = $2")
            .bind(user_id)
            .bind(post_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn is_bookmarked(&self, user_id: Uuid, post_id: Uuid) -> Result<bool, AppError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM bookmarks WHERE user_id = $1 AND post_id = $2)",
        )
        .bind(user_id)
        .bind(post_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }
}
