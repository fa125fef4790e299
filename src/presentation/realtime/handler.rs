//! WebSocket connection handler.
//!
//! Upgrades `GET /ws?token=<jwt>` into a live connection. The token is the
//! same JWT the HTTP middleware validates; the user identity is taken from
//! its claims before the upgrade completes, never from a client-asserted id.
//! A connection that fails validation or registration is closed without ever
//! touching the registry.

use std::time::Duration;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        Query, State, WebSocketUpgrade,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;
use tokio::time::interval;
use uuid::Uuid;

use super::events::ServerFrame;
use super::session::SessionState;
use crate::presentation::middleware::auth::decode_user_id;
use crate::shared::error::AppError;
use crate::startup::AppState;

/// Extra grace on top of the configured idle timeout before a silent
/// connection is closed.
const IDLE_GRACE: Duration = Duration::from_secs(10);

/// Handshake query parameters.
#[derive(Debug, Deserialize)]
pub struct ConnectParams {
    token: String,
}

/// WebSocket upgrade handler
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<ConnectParams>,
    State(state): State<AppState>,
) -> Result<Response, AppError> {
    let user_id = decode_user_id(&params.token, &state.settings.jwt)?;
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, user_id, state)))
}

/// Drive one connection: register, pump frames out, police idleness,
/// unregister on any exit path.
async fn handle_socket(socket: WebSocket, user_id: Uuid, state: AppState) {
    let connection_id = Uuid::new_v4();
    let (mut sink, mut stream) = socket.split();

    // Outbound queue. The registry and router push frames here without ever
    // awaiting socket I/O; this task drains them onto the wire.
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerFrame>();
    let writer = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            let text = match serde_json::to_string(&frame) {
                Ok(text) => text,
                Err(e) => {
                    tracing::error!(error = %e, "failed to serialize frame");
                    continue;
                }
            };
            if sink.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    if let Err(e) = state.registry.register(user_id, connection_id, tx) {
        tracing::warn!(%user_id, %connection_id, error = %e, "connection refused");
        writer.abort();
        return;
    }
    tracing::debug!(%user_id, %connection_id, "client connected");

    let idle_timeout = Duration::from_secs(state.settings.websocket.idle_timeout_secs);
    let mut session = SessionState::new(connection_id, user_id);
    let mut idle_check = interval(idle_timeout);
    idle_check.tick().await; // skip the immediate first tick

    loop {
        tokio::select! {
            msg = stream.next() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => {
                        tracing::debug!(%connection_id, "connection closed");
                        break;
                    }
                    Some(Ok(_)) => {
                        // any client traffic counts as liveness; pings are
                        // answered automatically by axum
                        session.touch();
                    }
                    Some(Err(e)) => {
                        tracing::debug!(%connection_id, error = %e, "websocket error");
                        break;
                    }
                }
            }

            _ = idle_check.tick() => {
                if !session.is_alive(idle_timeout + IDLE_GRACE) {
                    tracing::info!(%user_id, %connection_id, "idle timeout, closing connection");
                    break;
                }
            }
        }
    }

    state.registry.unregister(connection_id);
    writer.abort();

    tracing::debug!(%user_id, %connection_id, "client disconnected");
}
