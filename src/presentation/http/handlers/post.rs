//! Post Handlers
//!
//! Feed CRUD plus the like/dislike/comment writes that trigger realtime
//! notifications. Every emitter call happens strictly after the service has
//! committed its write; a delivery problem can never fail the request.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::application::dto::request::{CreateCommentRequest, CreatePostRequest};
use crate::application::dto::response::{
    CommentResponse, PostResponse, StatusResponse,
};
use crate::application::services::{
    BookmarkAction, PostError, PostService, PostServiceImpl,
};
use crate::domain::{User, UserRepository};
use crate::infrastructure::repositories::{
    PgCommentRepository, PgPostRepository, PgUserRepository,
};
use crate::presentation::middleware::AuthUser;
use crate::presentation::realtime::ActorSummary;
use crate::shared::error::AppError;
use crate::shared::validation::validation_error;
use crate::startup::AppState;

/// Default and maximum feed page sizes
const DEFAULT_FEED_LIMIT: i64 = 20;
const MAX_FEED_LIMIT: i64 = 100;

/// Feed query parameters
#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    pub limit: Option<i64>,
}

fn map_post_error(e: PostError) -> AppError {
    match e {
        PostError::NotFound => AppError::NotFound("Post not found".into()),
        PostError::Forbidden => AppError::Forbidden("Permission denied".into()),
        PostError::Internal(msg) => AppError::Internal(msg),
    }
}

fn post_service(state: &AppState) -> PostServiceImpl<PgPostRepository, PgCommentRepository> {
    PostServiceImpl::new(
        Arc::new(PgPostRepository::new(state.db.clone())),
        Arc::new(PgCommentRepository::new(state.db.clone())),
    )
}

/// Fetch the acting user's display fields for a notification payload.
/// Returns None (and skips the emit) if the account vanished mid-request.
async fn load_actor(state: &AppState, user_id: Uuid) -> Result<Option<User>, AppError> {
    let user_repo = PgUserRepository::new(state.db.clone());
    user_repo.find_by_id(user_id).await
}

/// Create a new post
pub async fn create_post(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<CreatePostRequest>,
) -> Result<(StatusCode, Json<StatusResponse>), AppError> {
    body.validate().map_err(validation_error)?;

    let service = post_service(&state);
    service
        .create_post(auth.user_id, body.caption, body.image_url)
        .await
        .map_err(map_post_error)?;

    Ok((StatusCode::CREATED, Json(StatusResponse::new("New post added"))))
}

/// Newest-first feed
pub async fn get_feed(
    State(state): State<AppState>,
    Query(query): Query<FeedQuery>,
) -> Result<Json<Vec<PostResponse>>, AppError> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_FEED_LIMIT)
        .clamp(1, MAX_FEED_LIMIT);

    let service = post_service(&state);
    let items = service.feed(limit).await.map_err(map_post_error)?;

    Ok(Json(items.into_iter().map(PostResponse::from).collect()))
}

/// One author's posts
pub async fn get_user_posts(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<PostResponse>>, AppError> {
    let service = post_service(&state);
    let items = service.posts_of(user_id).await.map_err(map_post_error)?;

    Ok(Json(items.into_iter().map(PostResponse::from).collect()))
}

/// Like a post
pub async fn like_post(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(post_id): Path<Uuid>,
) -> Result<Json<StatusResponse>, AppError> {
    let service = post_service(&state);
    let post_owner_id = service
        .like(post_id, auth.user_id)
        .await
        .map_err(map_post_error)?;

    if let Some(actor) = load_actor(&state, auth.user_id).await? {
        state
            .notifier
            .like(auth.user_id, ActorSummary::from(&actor), post_owner_id, post_id);
    }

    Ok(Json(StatusResponse::new("Post liked")))
}

/// Withdraw a like
pub async fn dislike_post(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(post_id): Path<Uuid>,
) -> Result<Json<StatusResponse>, AppError> {
    let service = post_service(&state);
    let post_owner_id = service
        .dislike(post_id, auth.user_id)
        .await
        .map_err(map_post_error)?;

    if let Some(actor) = load_actor(&state, auth.user_id).await? {
        state
            .notifier
            .dislike(auth.user_id, ActorSummary::from(&actor), post_owner_id, post_id);
    }

    Ok(Json(StatusResponse::new("Post disliked")))
}

/// Comment on a post
pub async fn add_comment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(post_id): Path<Uuid>,
    Json(body): Json<CreateCommentRequest>,
) -> Result<(StatusCode, Json<CommentResponse>), AppError> {
    body.validate().map_err(validation_error)?;

    let service = post_service(&state);
    let (comment, post_owner_id) = service
        .add_comment(post_id, auth.user_id, body.body)
        .await
        .map_err(map_post_error)?;

    let actor = load_actor(&state, auth.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    state.notifier.comment(
        auth.user_id,
        ActorSummary::from(&actor),
        post_owner_id,
        post_id,
        &comment.body,
    );

    Ok((
        StatusCode::CREATED,
        Json(CommentResponse::from_comment(comment, &actor)),
    ))
}

/// Comments on a post, oldest first
pub async fn get_comments(
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
) -> Result<Json<Vec<CommentResponse>>, AppError> {
    let service = post_service(&state);
    let comments = service.comments_of(post_id).await.map_err(map_post_error)?;

    Ok(Json(comments.into_iter().map(CommentResponse::from).collect()))
}

/// Delete the caller's own post
pub async fn delete_post(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(post_id): Path<Uuid>,
) -> Result<Json<StatusResponse>, AppError> {
    let service = post_service(&state);
    service
        .delete_post(post_id, auth.user_id)
        .await
        .map_err(map_post_error)?;

    Ok(Json(StatusResponse::new("Post deleted")))
}

/// Toggle a bookmark on a post
pub async fn bookmark_post(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(post_id): Path<Uuid>,
) -> Result<Json<StatusResponse>, AppError> {
    let service = post_service(&state);
    let action = service
        .toggle_bookmark(post_id, auth.user_id)
        .await
        .map_err(map_post_error)?;

    let message = match action {
        BookmarkAction::Saved => "Post bookmarked",
        BookmarkAction::Unsaved => "Post removed from bookmarks",
    };
    Ok(Json(StatusResponse::new(message)))
}
