//! Realtime Layer
//!
//! Presence tracking and event fanout over WebSocket connections.
//! The registry owns all connection state; the router delivers events to a
//! single user's connections; emitters adapt committed HTTP writes into
//! typed events.

pub mod emitter;
pub mod events;
pub mod handler;
pub mod presence;
pub mod registry;
pub mod router;
pub mod session;

pub use emitter::Notifier;
pub use events::{ActorSummary, ChatMessagePush, Event, NotificationPayload, ServerFrame};
pub use handler::ws_handler;
pub use presence::{PresenceBroadcaster, PresenceSet};
pub use registry::{ConnectionRegistry, FrameSender, RegistryError};
pub use router::EventRouter;
