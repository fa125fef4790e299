//! Response DTOs
//!
//! Data structures for API response bodies.

use serde::Serialize;
use uuid::Uuid;

use crate::application::services::{AuthTokens, ProfileDto};
use crate::domain::{Comment, CommentDetail, DirectMessage, FeedItem, User};

/// Registration / login response: the user plus their token
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: UserResponse,
    pub access_token: String,
    pub expires_in: i64,
    pub token_type: String,
}

impl AuthResponse {
    pub fn new(user: User, tokens: AuthTokens) -> Self {
        Self {
            user: UserResponse::from_user(user, true),
            access_token: tokens.access_token,
            expires_in: tokens.expires_in,
            token_type: tokens.token_type,
        }
    }
}

/// User response
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub gender: Option<String>,
    pub created_at: String,
}

impl UserResponse {
    pub fn from_user(user: User, include_email: bool) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: if include_email { Some(user.email) } else { None },
            avatar_url: user.avatar_url,
            bio: user.bio,
            gender: user.gender,
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

/// Public profile response
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub follower_count: i64,
    pub following_count: i64,
    pub posts: Vec<PostResponse>,
}

impl ProfileResponse {
    pub fn new(profile: ProfileDto, posts: Vec<FeedItem>) -> Self {
        Self {
            user: UserResponse::from_user(profile.user, false),
            follower_count: profile.follower_count,
            following_count: profile.following_count,
            posts: posts.into_iter().map(PostResponse::from).collect(),
        }
    }
}

/// Post author summary embedded in feed responses
#[derive(Debug, Serialize)]
pub struct AuthorResponse {
    pub id: Uuid,
    pub username: String,
    pub avatar_url: Option<String>,
}

/// Post response with author and counts
#[derive(Debug, Serialize)]
pub struct PostResponse {
    pub id: Uuid,
    pub author: AuthorResponse,
    pub caption: String,
    pub image_url: String,
    pub like_count: i64,
    pub comment_count: i64,
    pub created_at: String,
}

impl From<FeedItem> for PostResponse {
    fn from(item: FeedItem) -> Self {
        Self {
            id: item.post.id,
            author: AuthorResponse {
                id: item.post.author_id,
                username: item.author_username,
                avatar_url: item.author_avatar_url,
            },
            caption: item.post.caption,
            image_url: item.post.image_url,
            like_count: item.like_count,
            comment_count: item.comment_count,
            created_at: item.post.created_at.to_rfc3339(),
        }
    }
}

/// Comment response with author summary
#[derive(Debug, Serialize)]
pub struct CommentResponse {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author: AuthorResponse,
    pub body: String,
    pub created_at: String,
}

impl From<CommentDetail> for CommentResponse {
    fn from(detail: CommentDetail) -> Self {
        Self {
            id: detail.comment.id,
            post_id: detail.comment.post_id,
            author: AuthorResponse {
                id: detail.comment.author_id,
                username: detail.author_username,
                avatar_url: detail.author_avatar_url,
            },
            body: detail.comment.body,
            created_at: detail.comment.created_at.to_rfc3339(),
        }
    }
}

impl CommentResponse {
    /// Build from a freshly created comment and its (already loaded) author.
    pub fn from_comment(comment: Comment, author: &User) -> Self {
        Self {
            id: comment.id,
            post_id: comment.post_id,
            author: AuthorResponse {
                id: comment.author_id,
                username: author.username.clone(),
                avatar_url: author.avatar_url.clone(),
            },
            body: comment.body,
            created_at: comment.created_at.to_rfc3339(),
        }
    }
}

/// Direct message response
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub recipient_id: Uuid,
    pub body: String,
    pub created_at: String,
}

impl From<DirectMessage> for MessageResponse {
    fn from(message: DirectMessage) -> Self {
        Self {
            id: message.id,
            sender_id: message.sender_id,
            recipient_id: message.recipient_id,
            body: message.body,
            created_at: message.created_at.to_rfc3339(),
        }
    }
}

/// Simple acknowledgement response
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub message: String,
}

impl StatusResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
