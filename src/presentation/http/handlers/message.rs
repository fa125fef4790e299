//! Message Handlers
//!
//! Direct messages. The send handler persists first, then pushes the stored
//! record to the recipient's live connections; the sender gets it back in
//! the HTTP response and receives no push.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::application::dto::request::SendMessageRequest;
use crate::application::dto::response::MessageResponse;
use crate::application::services::{
    MessageError, MessageService, MessageServiceImpl,
};
use crate::infrastructure::repositories::{PgMessageRepository, PgUserRepository};
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::shared::validation::validation_error;
use crate::startup::AppState;

/// Default and maximum conversation page sizes
const DEFAULT_CONVERSATION_LIMIT: i64 = 100;
const MAX_CONVERSATION_LIMIT: i64 = 500;

/// Conversation query parameters
#[derive(Debug, Deserialize)]
pub struct ConversationQuery {
    pub limit: Option<i64>,
}

fn map_message_error(e: MessageError) -> AppError {
    match e {
        MessageError::RecipientNotFound => AppError::NotFound("Recipient not found".into()),
        MessageError::SelfMessage => AppError::BadRequest("You cannot message yourself".into()),
        MessageError::Internal(msg) => AppError::Internal(msg),
    }
}

fn message_service(
    state: &AppState,
) -> MessageServiceImpl<PgMessageRepository, PgUserRepository> {
    MessageServiceImpl::new(
        Arc::new(PgMessageRepository::new(state.db.clone())),
        Arc::new(PgUserRepository::new(state.db.clone())),
    )
}

/// Send a direct message
pub async fn send_message(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(user_id): Path<Uuid>,
    Json(body): Json<SendMessageRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    body.validate().map_err(validation_error)?;

    let service = message_service(&state);
    let message = service
        .send(auth.user_id, user_id, body.body)
        .await
        .map_err(map_message_error)?;

    // write committed: push the stored record to the recipient only
    state.notifier.chat_message(&message);

    Ok((StatusCode::CREATED, Json(MessageResponse::from(message))))
}

/// The conversation between the caller and another user
pub async fn get_conversation(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(user_id): Path<Uuid>,
    Query(query): Query<ConversationQuery>,
) -> Result<Json<Vec<MessageResponse>>, AppError> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_CONVERSATION_LIMIT)
        .clamp(1, MAX_CONVERSATION_LIMIT);

    let service = message_service(&state);
    let messages = service
        .conversation(auth.user_id, user_id, limit)
        .await
        .map_err(map_message_error)?;

    Ok(Json(messages.into_iter().map(MessageResponse::from).collect()))
}
