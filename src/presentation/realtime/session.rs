//! Per-socket session bookkeeping.

use std::time::{Duration, Instant};

use uuid::Uuid;

/// Liveness state for one socket task.
#[derive(Debug)]
pub struct SessionState {
    pub connection_id: Uuid,
    pub user_id: Uuid,
    last_seen: Instant,
}

impl SessionState {
    pub fn new(connection_id: Uuid, user_id: Uuid) -> Self {
        Self {
            connection_id,
            user_id,
            last_seen: Instant::now(),
        }
    }

    /// Record client traffic.
    pub fn touch(&mut self) {
        self.last_seen = Instant::now();
    }

    /// Whether the client has shown signs of life within `timeout`.
    pub fn is_alive(&self, timeout: Duration) -> bool {
        self.last_seen.elapsed() < timeout
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_session_is_alive() {
        let session = SessionState::new(Uuid::new_v4(), Uuid::now_v7());
        assert!(session.is_alive(Duration::from_secs(60)));
    }

    #[test]
    fn test_session_expires_without_traffic() {
        let session = SessionState::new(Uuid::new_v4(), Uuid::now_v7());
        assert!(!session.is_alive(Duration::ZERO));
    }

    #[test]
    fn test_touch_resets_the_clock() {
        let mut session = SessionState::new(Uuid::new_v4(), Uuid::now_v7());
        std::thread::sleep(Duration::from_millis(5));
        session.touch();
        assert!(session.is_alive(Duration::from_millis(5)));
    }
}
