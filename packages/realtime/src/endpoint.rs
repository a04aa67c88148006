//! Streaming endpoint: per-connection lifecycle from open to deregistration.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use futures_util::Stream;
use futures_util::stream;
use list_core::BroadcastEvent;
use tokio::sync::mpsc;

use crate::connection::{Connection, ConnectionId};
use crate::error::RegistryError;
use crate::registry::ConnectionRegistry;

/// The client side of an open connection. Dropping it is the disconnect.
#[derive(Debug)]
pub struct Subscription {
    id: ConnectionId,
    events: mpsc::Receiver<BroadcastEvent>,
}

impl Subscription {
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Next event, or `None` once the server has dropped the connection.
    pub async fn recv(&mut self) -> Option<BroadcastEvent> {
        self.events.recv().await
    }

    /// Non-blocking variant of [`recv`](Self::recv).
    pub fn try_recv(&mut self) -> Option<BroadcastEvent> {
        self.events.try_recv().ok()
    }

    /// Turn into a stream that ends when the server drops the connection.
    pub fn into_stream(self) -> impl Stream<Item = BroadcastEvent> + Send + 'static {
        stream::unfold(self, |mut sub| async move {
            let event = sub.recv().await?;
            Some((event, sub))
        })
    }
}

/// Accepts streaming clients and keeps the registry in step with them.
#[derive(Clone)]
pub struct StreamingEndpoint {
    registry: Arc<ConnectionRegistry>,
    next_id: Arc<AtomicU64>,
    sink_capacity: usize,
}

impl StreamingEndpoint {
    pub fn new(registry: Arc<ConnectionRegistry>, sink_capacity: usize) -> Self {
        Self {
            registry,
            next_id: Arc::new(AtomicU64::new(0)),
            sink_capacity: sink_capacity.max(1),
        }
    }

    fn allocate_id(&self) -> ConnectionId {
        ConnectionId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Register a new connection and spawn the task that removes it again
    /// once the client disconnects.
    pub fn open(&self) -> Result<Subscription, RegistryError> {
        let (sink, events) = mpsc::channel(self.sink_capacity);
        let id = self.allocate_id();
        let connection = Arc::new(Connection::new(id, sink));

        self.registry.add(connection.clone())?;
        tokio::spawn(serve_connection(self.registry.clone(), connection));

        Ok(Subscription { id, events })
    }
}

/// Wait for `connection` to end, then deregister it.
///
/// The wait is unbounded; it returns on client disconnect or when the
/// broadcaster closes the connection after a failed send.
pub async fn serve_connection(registry: Arc<ConnectionRegistry>, connection: Arc<Connection>) {
    connection.disconnected().await;
    connection.close();

    if !registry.remove(connection.id()) {
        tracing::debug!(connection_id = %connection.id(), "Client already removed");
    }
}
