//! User Handlers
//!
//! Profiles, suggestions and the follow toggle. A successful follow emits a
//! realtime notification to the followed user once the write has committed.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::application::dto::request::UpdateProfileRequest;
use crate::application::dto::response::{ProfileResponse, StatusResponse, UserResponse};
use crate::application::services::{
    FollowAction, PostService, PostServiceImpl, UpdateProfileDto, UserError, UserService,
    UserServiceImpl,
};
use crate::domain::UserRepository;
use crate::infrastructure::repositories::{
    PgCommentRepository, PgPostRepository, PgUserRepository,
};
use crate::presentation::middleware::AuthUser;
use crate::presentation::realtime::ActorSummary;
use crate::shared::error::AppError;
use crate::shared::validation::validation_error;
use crate::startup::AppState;

/// Number of accounts returned by the suggestion endpoint
const SUGGESTED_LIMIT: i64 = 5;

fn map_user_error(e: UserError) -> AppError {
    match e {
        UserError::NotFound => AppError::NotFound("User not found".into()),
        UserError::SelfFollow => AppError::BadRequest("You cannot follow yourself".into()),
        UserError::Internal(msg) => AppError::Internal(msg),
    }
}

/// Get the authenticated user's own profile
pub async fn get_current_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<UserResponse>, AppError> {
    let user_repo = PgUserRepository::new(state.db.clone());

    let user = user_repo
        .find_by_id(auth.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    Ok(Json(UserResponse::from_user(user, true)))
}

/// Update the authenticated user's profile
pub async fn update_current_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<UpdateProfileRequest>,
) -> Result<Json<UserResponse>, AppError> {
    body.validate().map_err(validation_error)?;

    let user_repo = Arc::new(PgUserRepository::new(state.db.clone()));
    let service = UserServiceImpl::new(user_repo);

    let user = service
        .update_profile(
            auth.user_id,
            UpdateProfileDto {
                bio: body.bio,
                gender: body.gender,
                avatar_url: body.avatar_url,
            },
        )
        .await
        .map_err(map_user_error)?;

    Ok(Json(UserResponse::from_user(user, true)))
}

/// Accounts the caller might want to follow
pub async fn suggested_users(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Vec<UserResponse>>, AppError> {
    let user_repo = Arc::new(PgUserRepository::new(state.db.clone()));
    let service = UserServiceImpl::new(user_repo);

    let users = service
        .suggested(auth.user_id, SUGGESTED_LIMIT)
        .await
        .map_err(map_user_error)?;

    Ok(Json(
        users
            .into_iter()
            .map(|u| UserResponse::from_user(u, false))
            .collect(),
    ))
}

/// Public profile: user, follow counts and their posts
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<ProfileResponse>, AppError> {
    let user_repo = Arc::new(PgUserRepository::new(state.db.clone()));
    let user_service = UserServiceImpl::new(user_repo);

    let profile = user_service.profile(user_id).await.map_err(map_user_error)?;

    let post_repo = Arc::new(PgPostRepository::new(state.db.clone()));
    let comment_repo = Arc::new(PgCommentRepository::new(state.db.clone()));
    let post_service = PostServiceImpl::new(post_repo, comment_repo);

    let posts = post_service
        .posts_of(user_id)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(ProfileResponse::new(profile, posts)))
}

/// Toggle following a user
pub async fn follow_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<StatusResponse>, AppError> {
    let user_repo = Arc::new(PgUserRepository::new(state.db.clone()));
    let service = UserServiceImpl::new(user_repo.clone());

    let action = service
        .toggle_follow(auth.user_id, user_id)
        .await
        .map_err(map_user_error)?;

    match action {
        FollowAction::Followed => {
            // write committed: push the notification to the followed user
            if let Some(actor) = user_repo.find_by_id(auth.user_id).await? {
                state
                    .notifier
                    .follow(auth.user_id, ActorSummary::from(&actor), user_id);
            }
            Ok(Json(StatusResponse::new("Followed successfully")))
        }
        FollowAction::Unfollowed => Ok(Json(StatusResponse::new("Unfollowed successfully"))),
    }
}
