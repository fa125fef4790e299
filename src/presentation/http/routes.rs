//! Route Configuration
//!
//! Configures all HTTP routes for the API.

use axum::{
    middleware,
    response::IntoResponse,
    routing::{delete, get, post},
    Router,
};

use super::handlers;
use crate::infrastructure::metrics;
use crate::presentation::middleware::{
    auth::auth_middleware,
    rate_limit::{rate_limit_api, rate_limit_auth, rate_limit_ws},
};
use crate::presentation::realtime::ws_handler;
use crate::startup::AppState;

/// Create the main API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", api_routes(state.clone()))
        // WebSocket endpoint with its own rate limiting
        .merge(ws_routes(state.clone()))
        // Health check endpoints
        .route("/health", get(handlers::health::health_check))
        .route("/health/live", get(handlers::health::liveness))
        .route("/health/ready", get(handlers::health::readiness))
        // Prometheus metrics endpoint
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}

/// Prometheus metrics endpoint handler
async fn metrics_handler() -> impl IntoResponse {
    let metrics = metrics::gather_metrics();
    (
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        metrics,
    )
}

/// Realtime connection route
fn ws_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/ws", get(ws_handler))
        .route_layer(middleware::from_fn_with_state(state, rate_limit_ws))
}

/// API v1 routes
fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Public routes (auth has its own stricter rate limiting)
        .nest("/auth", auth_routes(state.clone()))
        // Protected routes (require authentication)
        .nest("/users", user_routes(state.clone()))
        .nest("/posts", post_routes(state.clone()))
        .nest("/messages", message_routes(state.clone()))
        // Apply API rate limiting to all API routes
        .route_layer(middleware::from_fn_with_state(state, rate_limit_api))
}

/// Authentication routes (public, with stricter rate limiting)
fn auth_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login))
        .route("/logout", post(handlers::auth::logout))
        .route_layer(middleware::from_fn_with_state(state, rate_limit_auth))
}

/// User routes (protected)
fn user_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/@me",
            get(handlers::user::get_current_user).patch(handlers::user::update_current_user),
        )
        .route("/suggested", get(handlers::user::suggested_users))
        .route("/{user_id}", get(handlers::user::get_user))
        .route("/{user_id}/follow", post(handlers::user::follow_user))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Post routes (protected)
fn post_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", post(handlers::post::create_post))
        .route("/feed", get(handlers::post::get_feed))
        .route("/user/{user_id}", get(handlers::post::get_user_posts))
        .route("/{post_id}", delete(handlers::post::delete_post))
        .route("/{post_id}/like", post(handlers::post::like_post))
        .route("/{post_id}/dislike", post(handlers::post::dislike_post))
        .route(
            "/{post_id}/comments",
            post(handlers::post::add_comment).get(handlers::post::get_comments),
        )
        .route("/{post_id}/bookmark", post(handlers::post::bookmark_post))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Message routes (protected)
fn message_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/{user_id}",
            post(handlers::message::send_message).get(handlers::message::get_conversation),
        )
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}
