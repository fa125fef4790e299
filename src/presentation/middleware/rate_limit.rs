//! Rate Limiting Middleware
//!
//! In-memory fixed-window rate limiting keyed by client IP. Presence state
//! is process-local, so a distributed limiter would buy nothing here; one
//! `DashMap` of counters per (scope, ip) pair is enough.

use std::net::{IpAddr, SocketAddr};
use std::time::{Duration, Instant};

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use dashmap::DashMap;

use crate::shared::error::AppError;
use crate::startup::AppState;

/// Window length for all scopes.
const WINDOW: Duration = Duration::from_secs(60);

#[derive(Debug)]
struct Window {
    started_at: Instant,
    count: u32,
}

/// Fixed-window request counter.
#[derive(Debug, Default)]
pub struct RateLimiter {
    windows: DashMap<(&'static str, IpAddr), Window>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self {
            windows: DashMap::new(),
        }
    }

    /// Count one request against `(scope, client)`. Returns false once the
    /// client has exceeded `limit` within the current window.
    pub fn try_acquire(&self, scope: &'static str, client: IpAddr, limit: u32) -> bool {
        self.try_acquire_at(scope, client, limit, WINDOW)
    }

    fn try_acquire_at(
        &self,
        scope: &'static str,
        client: IpAddr,
        limit: u32,
        window: Duration,
    ) -> bool {
        let mut entry = self.windows.entry((scope, client)).or_insert(Window {
            started_at: Instant::now(),
            count: 0,
        });

        if entry.started_at.elapsed() >= window {
            entry.started_at = Instant::now();
            entry.count = 0;
        }
        entry.count = entry.count.saturating_add(1);
        entry.count <= limit
    }
}

async fn enforce(
    state: &AppState,
    scope: &'static str,
    limit: u32,
    addr: SocketAddr,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if !state.limiter.try_acquire(scope, addr.ip(), limit) {
        tracing::warn!(scope, client = %addr.ip(), "rate limit exceeded");
        return Err(AppError::RateLimited);
    }
    Ok(next.run(request).await)
}

/// Strict limiting for authentication endpoints (brute-force protection)
pub async fn rate_limit_auth(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let limit = state.settings.rate_limit.auth_per_minute;
    enforce(&state, "auth", limit, addr, request, next).await
}

/// Baseline limiting for API endpoints
pub async fn rate_limit_api(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let limit = state.settings.rate_limit.api_per_minute;
    enforce(&state, "api", limit, addr, request, next).await
}

/// Limiting for WebSocket upgrades (connection flooding protection)
pub async fn rate_limit_ws(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let limit = state.settings.rate_limit.ws_per_minute;
    enforce(&state, "ws", limit, addr, request, next).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    fn client(last_octet: u8) -> IpAddr {
        IpAddr::V4(Ipv4Addr::new(10, 0, 0, last_octet))
    }

    #[test]
    fn test_requests_within_limit_pass() {
        let limiter = RateLimiter::new();
        for _ in 0..5 {
            assert!(limiter.try_acquire("api", client(1), 5));
        }
    }

    #[test]
    fn test_request_over_limit_is_rejected() {
        let limiter = RateLimiter::new();
        for _ in 0..3 {
            assert!(limiter.try_acquire("auth", client(2), 3));
        }
        assert!(!limiter.try_acquire("auth", client(2), 3));
    }

    #[test]
    fn test_scopes_and_clients_are_independent() {
        let limiter = RateLimiter::new();
        assert!(limiter.try_acquire("auth", client(3), 1));
        assert!(!limiter.try_acquire("auth", client(3), 1));

        // different client, same scope
        assert!(limiter.try_acquire("auth", client(4), 1));
        // same client, different scope
        assert!(limiter.try_acquire("api", client(3), 1));
    }

    #[test]
    fn test_window_resets_after_expiry() {
        let limiter = RateLimiter::new();
        assert!(limiter.try_acquire_at("api", client(5), 1, Duration::ZERO));
        // a zero-length window has always expired, so the counter resets
        assert!(limiter.try_acquire_at("api", client(5), 1, Duration::ZERO));
    }
}
