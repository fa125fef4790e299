//! Comment Repository Implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{Comment, CommentDetail, CommentRepository};
use crate::shared::error::AppError;

#[derive(Debug, sqlx::FromRow)]
struct CommentRow {
    id: Uuid,
    post_id: Uuid,
    author_id: Uuid,
    body: String,
    created_at: DateTime<Utc>,
}

impl CommentRow {
    fn into_comment(self) -> Comment {
        Comment {
            id: self.id,
            post_id: self.post_id,
            author_id: self.author_id,
            body: self.body,
            created_at: self.created_at,
        }
    }
}

/// Row for comment listings joined with the author summary.
#[derive(Debug, sqlx::FromRow)]
struct CommentDetailRow {
    id: Uuid,
    post_id: Uuid,
    author_id: Uuid,
    body: String,
    created_at: DateTime<Utc>,
    author_username: String,
    author_avatar_url: Option<String>,
}

impl CommentDetailRow {
    fn into_detail(self) -> CommentDetail {
        CommentDetail {
            comment: Comment {
                id: self.id,
                post_id: self.post_id,
                author_id: self.author_id,
                body: self.body,
                created_at: self.created_at,
            },
            author_username: self.author_username,
            author_avatar_url: self.author_avatar_url,
        }
    }
}

/// PostgreSQL comment repository implementation.
#[derive(Clone)]
pub struct PgCommentRepository {
    pool: PgPool,
}

impl PgCommentRepository {
    /// Create a new PgCommentRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommentRepository for PgCommentRepository {
    async fn create(&self, comment: &Comment) -> Result<Comment, AppError> {
        let row = sqlx::query_as::<_, CommentRow>(
            r#"
            INSERT INTO comments (id, post_id, author_id, body, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, post_id, author_id, body, created_at
            "#,
        )
        .bind(comment.id)
        .bind(comment.post_id)
        .bind(comment.author_id)
        .bind(&comment.body)
        .bind(comment.created_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into_comment())
    }

    async fn for_post(&self, post_id: Uuid) -> Result<Vec<CommentDetail>, AppError> {
        let rows = sqlx::query_as::<_, CommentDetailRow>(
            r#"
            SELECT c.id, c.post_id, c.author_id, c.body, c.created_at,
                   u.username AS author_username, u.avatar_url AS author_avatar_url
            FROM comments c
            JOIN users u ON u.id = c.author_id
            WHERE c.post_id = $1
            ORDER BY c.created_at ASC
            "#,
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into_detail()).collect())
    }
}
