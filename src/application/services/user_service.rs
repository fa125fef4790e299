//! User Service
//!
//! Profile management, suggestions and the follow graph.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{User, UserRepository};

/// User service trait
#[async_trait]
pub trait UserService: Send + Sync {
    /// A user's public profile with follow counts
    async fn profile(&self, user_id: Uuid) -> Result<ProfileDto, UserError>;

    /// Update the caller's own profile fields
    async fn update_profile(
        &self,
        user_id: Uuid,
        update: UpdateProfileDto,
    ) -> Result<User, UserError>;

    /// Users the caller does not follow yet
    async fn suggested(&self, for_user: Uuid, limit: i64) -> Result<Vec<User>, UserError>;

    /// Follow the target if not yet followed, unfollow otherwise
    async fn toggle_follow(
        &self,
        follower_id: Uuid,
        followee_id: Uuid,
    ) -> Result<FollowAction, UserError>;
}

/// Profile with aggregate follow counts
#[derive(Debug, Clone)]
pub struct ProfileDto {
    pub user: User,
    pub follower_count: i64,
    pub following_count: i64,
}

/// Profile update request
#[derive(Debug, Clone, Default)]
pub struct UpdateProfileDto {
    pub bio: Option<String>,
    pub gender: Option<String>,
    pub avatar_url: Option<String>,
}

/// What a follow toggle did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowAction {
    Followed,
    Unfollowed,
}

/// User service errors
#[derive(Debug, thiserror::Error)]
pub enum UserError {
    #[error("User not found")]
    NotFound,

    #[error("You cannot follow yourself")]
    SelfFollow,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// UserService implementation
pub struct UserServiceImpl<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
}

impl<U> UserServiceImpl<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>) -> Self {
        Self { user_repo }
    }
}

#[async_trait]
impl<U> UserService for UserServiceImpl<U>
where
    U: UserRepository,
{
    async fn profile(&self, user_id: Uuid) -> Result<ProfileDto, UserError> {
        let user = self
            .user_repo
            .find_by_id(user_id)
            .await
            .map_err(|e| UserError::Internal(e.to_string()))?
            .ok_or(UserError::NotFound)?;

        let follower_count = self
            .user_repo
            .follower_count(user_id)
            .await
            .map_err(|e| UserError::Internal(e.to_string()))?;
        let following_count = self
            .user_repo
            .following_count(user_id)
            .await
            .map_err(|e| UserError::Internal(e.to_string()))?;

        Ok(ProfileDto {
            user,
            follower_count,
            following_count,
        })
    }

    async fn update_profile(
        &self,
        user_id: Uuid,
        update: UpdateProfileDto,
    ) -> Result<User, UserError> {
        let mut user = self
            .user_repo
            .find_by_id(user_id)
            .await
            .map_err(|e| UserError::Internal(e.to_string()))?
            .ok_or(UserError::NotFound)?;

        if let Some(bio) = update.bio {
            user.bio = Some(bio);
        }
        if let Some(gender) = update.gender {
            user.gender = Some(gender);
        }
        if let Some(avatar_url) = update.avatar_url {
            user.avatar_url = Some(avatar_url);
        }

        self.user_repo
            .update(&user)
            .await
            .map_err(|e| UserError::Internal(e.to_string()))
    }

    async fn suggested(&self, for_user: Uuid, limit: i64) -> Result<Vec<User>, UserError> {
        self.user_repo
            .suggested(for_user, limit)
            .await
            .map_err(|e| UserError::Internal(e.to_string()))
    }

    async fn toggle_follow(
        &self,
        follower_id: Uuid,
        followee_id: Uuid,
    ) -> Result<FollowAction, UserError> {
        if follower_id == followee_id {
            return Err(UserError::SelfFollow);
        }

        // the target must exist before we touch the follow graph
        self.user_repo
            .find_by_id(followee_id)
            .await
            .map_err(|e| UserError::Internal(e.to_string()))?
            .ok_or(UserError::NotFound)?;

        let already_following = self
            .user_repo
            .is_following(follower_id, followee_id)
            .await
            .map_err(|e| UserError::Internal(e.to_string()))?;

        if already_following {
            self.user_repo
                .unfollow(follower_id, followee_id)
                .await
                .map_err(|e| UserError::Internal(e.to_string()))?;
            Ok(FollowAction::Unfollowed)
        } else {
            self.user_repo
                .follow(follower_id, followee_id)
                .await
                .map_err(|e| UserError::Internal(e.to_string()))?;
            Ok(FollowAction::Followed)
        }
    }
}
