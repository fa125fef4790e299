//! Configuration Management
//!
//! Settings loaded from files and environment variables.

pub mod settings;

pub use settings::{
    CorsSettings, DatabaseSettings, JwtSettings, RateLimitSettings, ServerSettings, Settings,
    WebSocketSettings,
};
