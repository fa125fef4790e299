//! Prometheus Metrics Module
//!
//! Provides application-wide metrics collection using Prometheus.
//!
//! # Metrics Collected
//! - Active realtime connection and online-user gauges
//! - Realtime event delivery counters by kind
//! - Presence broadcast counter

use once_cell::sync::Lazy;
use prometheus::{Encoder, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

/// Global metrics registry
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

/// Active realtime connections gauge
pub static REALTIME_CONNECTIONS: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::with_opts(
        Opts::new(
            "realtime_connections_active",
            "Number of live realtime connections",
        )
        .namespace("feed_server"),
    )
    .expect("Failed to create REALTIME_CONNECTIONS metric")
});

/// Online users gauge (users with at least one live connection)
pub static ONLINE_USERS: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::with_opts(
        Opts::new("online_users", "Number of users currently online").namespace("feed_server"),
    )
    .expect("Failed to create ONLINE_USERS metric")
});

/// Realtime events pushed to connections, by event kind
pub static EVENTS_DELIVERED_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "realtime_events_delivered_total",
            "Realtime event delivery attempts per connection",
        )
        .namespace("feed_server"),
        &["kind"],
    )
    .expect("Failed to create EVENTS_DELIVERED_TOTAL metric")
});

/// Events dropped because the target connection was mid-close
pub static EVENTS_DROPPED_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "realtime_events_dropped_total",
            "Realtime events dropped on dead connections",
        )
        .namespace("feed_server"),
        &["kind"],
    )
    .expect("Failed to create EVENTS_DROPPED_TOTAL metric")
});

/// Presence broadcasts performed
pub static PRESENCE_BROADCASTS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::with_opts(
        Opts::new(
            "presence_broadcasts_total",
            "Full presence-list broadcasts",
        )
        .namespace("feed_server"),
    )
    .expect("Failed to create PRESENCE_BROADCASTS_TOTAL metric")
});

/// Register all metrics with the registry
fn register_metrics(registry: &Registry) {
    registry
        .register(Box::new(REALTIME_CONNECTIONS.clone()))
        .expect("Failed to register REALTIME_CONNECTIONS");
    registry
        .register(Box::new(ONLINE_USERS.clone()))
        .expect("Failed to register ONLINE_USERS");
    registry
        .register(Box::new(EVENTS_DELIVERED_TOTAL.clone()))
        .expect("Failed to register EVENTS_DELIVERED_TOTAL");
    registry
        .register(Box::new(EVENTS_DROPPED_TOTAL.clone()))
        .expect("Failed to register EVENTS_DROPPED_TOTAL");
    registry
        .register(Box::new(PRESENCE_BROADCASTS_TOTAL.clone()))
        .expect("Failed to register PRESENCE_BROADCASTS_TOTAL");
}

/// Collect and encode all metrics as Prometheus text format
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .expect("Failed to encode metrics");
    String::from_utf8(buffer).expect("Metrics should be valid UTF-8")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gather_metrics_includes_registered_families() {
        REALTIME_CONNECTIONS.set(0);
        let text = gather_metrics();
        assert!(text.contains("feed_server_realtime_connections_active"));
    }
}
