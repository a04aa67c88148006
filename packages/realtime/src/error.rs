//! Error types for the fan-out core.

use std::time::Duration;

use thiserror::Error;

use crate::connection::ConnectionId;

/// A write to one connection's sink failed. Contained at that connection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WriteError {
    #[error("Connection sink is closed")]
    Closed,
    #[error("Write timed out after {0:?}")]
    Timeout(Duration),
}

/// Registry invariant violations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("Connection {0} is already registered")]
    DuplicateId(ConnectionId),
}

/// Errors surfaced by the realtime hub and its handles.
#[derive(Debug, Error)]
pub enum RealtimeError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("Broadcaster is not running")]
    BroadcasterUnavailable,

    #[error("Failed to spawn broadcaster: {0}")]
    Spawn(String),
}
