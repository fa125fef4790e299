//! Authentication Middleware
//!
//! JWT validation for protected routes. The same decode path authenticates
//! WebSocket handshakes, so HTTP requests and realtime connections share one
//! identity source.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use uuid::Uuid;

use crate::application::services::Claims;
use crate::config::JwtSettings;
use crate::shared::error::AppError;
use crate::startup::AppState;

/// Authenticated user extension
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub user_id: Uuid,
}

/// Validate a JWT and extract the user id from its subject claim.
pub fn decode_user_id(token: &str, settings: &JwtSettings) -> Result<Uuid, AppError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(settings.secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
            AppError::Unauthorized("Token expired".into())
        }
        _ => AppError::Unauthorized("Invalid token".into()),
    })?;

    Uuid::parse_str(&token_data.claims.sub)
        .map_err(|_| AppError::Unauthorized("Invalid token claims".into()))
}

/// Authentication middleware that validates bearer tokens
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Missing authorization header".into()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Unauthorized("Invalid authorization header format".into()))?;

    let user_id = decode_user_id(token, &state.settings.jwt)?;

    request.extensions_mut().insert(AuthUser { user_id });

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn settings() -> JwtSettings {
        JwtSettings {
            secret: "0123456789abcdef0123456789abcdef".into(),
            access_token_expiry_minutes: 60,
        }
    }

    fn token_for(sub: &str, expires_in_secs: i64) -> String {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: sub.to_string(),
            exp: now + expires_in_secs,
            iat: now,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(settings().secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_decode_round_trips_user_id() {
        let user_id = Uuid::now_v7();
        let token = token_for(&user_id.to_string(), 3600);

        assert_eq!(decode_user_id(&token, &settings()).unwrap(), user_id);
    }

    #[test]
    fn test_decode_rejects_garbage_token() {
        assert!(decode_user_id("not-a-jwt", &settings()).is_err());
    }

    #[test]
    fn test_decode_rejects_non_uuid_subject() {
        let token = token_for("42", 3600);
        assert!(decode_user_id(&token, &settings()).is_err());
    }
}
