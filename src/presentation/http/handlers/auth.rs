//! Authentication Handlers

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use validator::Validate;

use crate::application::dto::request::{LoginRequest, RegisterRequest};
use crate::application::dto::response::{AuthResponse, StatusResponse};
use crate::application::services::{AuthError, AuthService, AuthServiceImpl};
use crate::infrastructure::repositories::PgUserRepository;
use crate::shared::error::AppError;
use crate::shared::validation::validation_error;
use crate::startup::AppState;

fn map_auth_error(e: AuthError) -> AppError {
    match e {
        AuthError::InvalidCredentials => AppError::Unauthorized("Invalid credentials".into()),
        AuthError::EmailExists => AppError::Conflict("Email already registered".into()),
        AuthError::UsernameExists => AppError::Conflict("Username already taken".into()),
        AuthError::Internal(msg) => AppError::Internal(msg),
    }
}

/// Register a new account
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    body.validate().map_err(validation_error)?;

    let user_repo = Arc::new(PgUserRepository::new(state.db.clone()));
    let service = AuthServiceImpl::new(user_repo, state.settings.jwt.clone());

    let (user, tokens) = service
        .register(&body.username, &body.email, &body.password)
        .await
        .map_err(map_auth_error)?;

    Ok((StatusCode::CREATED, Json(AuthResponse::new(user, tokens))))
}

/// Log in with email and password
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    body.validate().map_err(validation_error)?;

    let user_repo = Arc::new(PgUserRepository::new(state.db.clone()));
    let service = AuthServiceImpl::new(user_repo, state.settings.jwt.clone());

    let (user, tokens) = service
        .authenticate(&body.email, &body.password)
        .await
        .map_err(map_auth_error)?;

    Ok(Json(AuthResponse::new(user, tokens)))
}

/// Log out. Tokens are stateless, so this only acknowledges; clients drop
/// their copy.
pub async fn logout() -> Json<StatusResponse> {
    Json(StatusResponse::new("Logged out"))
}
