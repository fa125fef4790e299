//! Application Startup
//!
//! Application building and server initialization. The connection registry
//! is created here and passed explicitly through [`AppState`]; no component
//! reaches for a global.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use sqlx::PgPool;
use tokio::net::TcpListener;
use tower_http::compression::CompressionLayer;

use crate::config::Settings;
use crate::infrastructure::database;
use crate::presentation::http::routes;
use crate::presentation::http::handlers::health;
use crate::presentation::middleware::{cors, logging, RateLimiter};
use crate::presentation::realtime::{ConnectionRegistry, EventRouter, Notifier};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub registry: Arc<ConnectionRegistry>,
    pub notifier: Notifier,
    pub limiter: Arc<RateLimiter>,
    pub settings: Arc<Settings>,
}

/// Application instance
pub struct Application {
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application from settings
    pub async fn build(settings: Settings) -> Result<Self> {
        // Create database pool and bring the schema up to date
        let db = database::create_pool(&settings.database).await?;
        database::run_migrations(&db).await?;
        tracing::info!("Database connection pool created");

        // Realtime core: one registry instance owned by the process,
        // router and emitters layered on top of it
        let registry = Arc::new(ConnectionRegistry::new());
        let notifier = Notifier::new(EventRouter::new(registry.clone()));

        health::init_server_start();

        // Create app state
        let state = AppState {
            db,
            registry,
            notifier,
            limiter: Arc::new(RateLimiter::new()),
            settings: Arc::new(settings.clone()),
        };

        // Build router with middleware
        let router = routes::create_router(state)
            .layer(CompressionLayer::new())
            .layer(logging::create_trace_layer())
            .layer(cors::create_cors_layer(&settings.cors));

        // Bind to address
        let addr = settings.server.socket_addr();
        let listener = TcpListener::bind(addr).await?;
        tracing::info!("Listening on {}", addr);

        Ok(Self { listener, router })
    }

    /// Run the server until stopped
    pub async fn run_until_stopped(self) -> Result<()> {
        axum::serve(
            self.listener,
            self.router
                .into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await?;
        Ok(())
    }

    /// Get the bound address
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}
