//! Request DTOs
//!
//! Data structures for API request bodies.

use serde::Deserialize;
use validator::Validate;

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

/// Registration request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 2, max = 32, message = "Username must be 2-32 characters"))]
    pub username: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

/// Profile update request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(max = 190, message = "Bio must be at most 190 characters"))]
    pub bio: Option<String>,

    #[validate(length(max = 16, message = "Gender must be at most 16 characters"))]
    pub gender: Option<String>,

    #[validate(url(message = "Avatar must be a valid URL"))]
    pub avatar_url: Option<String>,
}

/// Create post request
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePostRequest {
    #[validate(length(max = 2200, message = "Caption must be at most 2200 characters"))]
    pub caption: String,

    #[validate(url(message = "Image must be a valid URL"))]
    pub image_url: String,
}

/// Create comment request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCommentRequest {
    #[validate(length(min = 1, max = 1000, message = "Comment must be 1-1000 characters"))]
    pub body: String,
}

/// Send direct message request
#[derive(Debug, Deserialize, Validate)]
pub struct SendMessageRequest {
    #[validate(length(min = 1, max = 4000, message = "Message must be 1-4000 characters"))]
    pub body: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_rejects_short_password() {
        let request = RegisterRequest {
            username: "alice".into(),
            email: "alice@example.com".into(),
            password: "short".into(),
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_comment_request_rejects_empty_body() {
        let request = CreateCommentRequest { body: "".into() };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_valid_post_request_passes() {
        let request = CreatePostRequest {
            caption: "sunset".into(),
            image_url: "https://cdn.example.com/sunset.jpg".into(),
        };
        assert!(request.validate().is_ok());
    }
}
