//! User entity and repository trait.
//!
//! Maps to the `users` table in the database schema.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::AppError;

/// Represents a user account.
///
/// Maps to the `users` table:
/// - id: UUID PRIMARY KEY
/// - username: VARCHAR(32) NOT NULL UNIQUE
/// - email: VARCHAR(255) NOT NULL UNIQUE
/// - password_hash: VARCHAR(255) NOT NULL
/// - avatar_url: TEXT NULL
/// - bio: TEXT NULL
/// - gender: VARCHAR(16) NULL
/// - created_at / updated_at: TIMESTAMPTZ
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Primary key (UUIDv7, time-ordered)
    pub id: Uuid,

    /// Username (2-32 characters, unique)
    pub username: String,

    /// Email address (unique)
    pub email: String,

    /// Argon2 password hash
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// URL to the user's avatar image
    pub avatar_url: Option<String>,

    /// Profile bio text
    pub bio: Option<String>,

    /// Self-described gender
    pub gender: Option<String>,

    /// Account creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new user with a fresh time-ordered id.
    pub fn new(username: String, email: String, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            username,
            email,
            password_hash,
            avatar_url: None,
            bio: None,
            gender: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Repository trait for User data access operations.
///
/// Implementations of this trait handle the actual database interactions.
/// The trait is defined in the domain layer to maintain dependency inversion.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user by id.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError>;

    /// Find a user by their email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    /// Find a user by username.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError>;

    /// Create a new user in the database.
    async fn create(&self, user: &User) -> Result<User, AppError>;

    /// Update an existing user's profile fields.
    async fn update(&self, user: &User) -> Result<User, AppError>;

    /// Check if an email address is already registered.
    async fn email_exists(&self, email: &str) -> Result<bool, AppError>;

    /// Check if a username is already taken.
    async fn username_exists(&self, username: &str) -> Result<bool, AppError>;

    /// Record that `follower_id` follows `followee_id` (idempotent).
    async fn follow(&self, follower_id: Uuid, followee_id: Uuid) -> Result<(), AppError>;

    /// Remove a follow edge (no-op if absent).
    async fn unfollow(&self, follower_id: Uuid, followee_id: Uuid) -> Result<(), AppError>;

    /// Whether `follower_id` currently follows `followee_id`.
    async fn is_following(&self, follower_id: Uuid, followee_id: Uuid) -> Result<bool, AppError>;

    /// Number of users following `user_id`.
    async fn follower_count(&self, user_id: Uuid) -> Result<i64, AppError>;

    /// Number of users `user_id` follows.
    async fn following_count(&self, user_id: Uuid) -> Result<i64, AppError>;

    /// Users `for_user` does not follow yet, newest accounts first.
    async fn suggested(&self, for_user: Uuid, limit: i64) -> Result<Vec<User>, AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_user() -> User {
        User::new(
            "testuser".to_string(),
            "test@example.com".to_string(),
            "hashed_password".to_string(),
        )
    }

    #[test]
    fn test_new_user_has_unique_ids() {
        let a = create_test_user();
        let b = create_test_user();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_new_user_id_is_v7() {
        let user = create_test_user();
        assert_eq!(user.id.get_version_num(), 7);
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let user = create_test_user();

        let serialized = serde_json::to_string(&user).expect("Failed to serialize user");

        assert!(!serialized.contains("password_hash"));
        assert!(!serialized.contains("hashed_password"));
    }

    #[test]
    fn test_serialization_includes_required_fields() {
        let user = create_test_user();

        let serialized = serde_json::to_string(&user).expect("Failed to serialize user");

        assert!(serialized.contains("\"username\":\"testuser\""));
        assert!(serialized.contains("\"email\":\"test@example.com\""));
    }
}
