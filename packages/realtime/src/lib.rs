//! Realtime fan-out core.
//!
//! Events from the change feed adapter and the heartbeat ticker go through a
//! single [`Broadcaster`] actor. It writes each one to every connection in
//! the [`ConnectionRegistry`]. A connection whose write fails or times out is
//! closed and removed without affecting the others.

pub mod adapter;
pub mod broadcaster;
pub mod config;
pub mod connection;
pub mod endpoint;
pub mod error;
pub mod heartbeat;
pub mod hub;
pub mod messages;
pub mod registry;

pub use adapter::{FeedAdapter, Relevance, classify};
pub use broadcaster::{Broadcaster, BroadcasterActor, fan_out};
pub use config::RealtimeConfig;
pub use connection::{Connection, ConnectionId, ConnectionState};
pub use endpoint::{StreamingEndpoint, Subscription};
pub use error::{RealtimeError, RegistryError, WriteError};
pub use heartbeat::HeartbeatTicker;
pub use hub::RealtimeHub;
pub use messages::{BroadcasterStats, PublishReport};
pub use registry::ConnectionRegistry;
