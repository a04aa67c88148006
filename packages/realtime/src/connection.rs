//! A single client connection and its write-side sink.

use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;

use list_core::BroadcastEvent;
use tokio::sync::Notify;
use tokio::sync::mpsc::{self, error::SendTimeoutError};

use crate::error::WriteError;

/// Process-unique connection identifier. Allocated in increasing order and
/// never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConnectionId(pub u64);

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle of a connection. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum ConnectionState {
    /// Created, not yet registered.
    Connecting = 0,
    /// Registered and receiving events.
    Open = 1,
    /// A send failed or the client went away; removal pending.
    Closing = 2,
    /// Gone from the registry.
    Closed = 3,
}

impl ConnectionState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Connecting,
            1 => Self::Open,
            2 => Self::Closing,
            _ => Self::Closed,
        }
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionState::Connecting => write!(f, "connecting"),
            ConnectionState::Open => write!(f, "open"),
            ConnectionState::Closing => write!(f, "closing"),
            ConnectionState::Closed => write!(f, "closed"),
        }
    }
}

/// A live client connection.
///
/// The sink is the sending half of a bounded channel whose receiver feeds the
/// client's response stream. Dropping that receiver is the disconnect signal.
#[derive(Debug)]
pub struct Connection {
    id: ConnectionId,
    sink: mpsc::Sender<BroadcastEvent>,
    state: AtomicU8,
    close_signal: Notify,
}

impl Connection {
    pub fn new(id: ConnectionId, sink: mpsc::Sender<BroadcastEvent>) -> Self {
        Self {
            id,
            sink,
            state: AtomicU8::new(ConnectionState::Connecting as u8),
            close_signal: Notify::new(),
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn state(&self) -> ConnectionState {
        ConnectionState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Move forward to `next`; a later state is never overwritten.
    fn advance(&self, next: ConnectionState) -> ConnectionState {
        ConnectionState::from_u8(self.state.fetch_max(next as u8, Ordering::AcqRel))
    }

    pub(crate) fn mark_open(&self) {
        self.advance(ConnectionState::Open);
    }

    pub(crate) fn mark_closed(&self) {
        self.advance(ConnectionState::Closed);
        self.close_signal.notify_one();
    }

    /// Begin closing. Wakes the task waiting in [`Connection::disconnected`].
    pub fn close(&self) {
        if self.advance(ConnectionState::Closing) < ConnectionState::Closing {
            self.close_signal.notify_one();
        }
    }

    /// Write one event, waiting at most `timeout` for buffer space.
    pub async fn send(&self, event: BroadcastEvent, timeout: Duration) -> Result<(), WriteError> {
        if self.state() >= ConnectionState::Closing {
            return Err(WriteError::Closed);
        }

        match self.sink.send_timeout(event, timeout).await {
            Ok(()) => Ok(()),
            Err(SendTimeoutError::Closed(_)) => Err(WriteError::Closed),
            Err(SendTimeoutError::Timeout(_)) => Err(WriteError::Timeout(timeout)),
        }
    }

    /// Resolves once the client has dropped its receiver or the connection
    /// has been closed from the server side.
    pub async fn disconnected(&self) {
        if self.state() >= ConnectionState::Closing {
            return;
        }

        tokio::select! {
            _ = self.sink.closed() => {}
            _ = self.close_signal.notified() => {}
        }
    }
}
