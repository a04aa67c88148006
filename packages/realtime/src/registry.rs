//! Registry of live client connections.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::connection::{Connection, ConnectionId};
use crate::error::RegistryError;

/// The set of connections currently receiving events.
///
/// Add, remove, and snapshot are serialized by one lock. Sends never happen
/// under it: the broadcaster works on a [`snapshot`](Self::snapshot).
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    connections: Mutex<BTreeMap<ConnectionId, Arc<Connection>>>,
}

impl ConnectionRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<ConnectionId, Arc<Connection>>> {
        // Nothing panics while holding the lock, but a poisoned map is
        // still consistent: every operation is a single insert or remove.
        self.connections
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a connection and mark it open.
    pub fn add(&self, connection: Arc<Connection>) -> Result<(), RegistryError> {
        let id = connection.id();
        let total = {
            let mut connections = self.lock();
            if connections.contains_key(&id) {
                return Err(RegistryError::DuplicateId(id));
            }
            connection.mark_open();
            connections.insert(id, connection);
            connections.len()
        };

        tracing::info!(connection_id = %id, total, "Client added");
        Ok(())
    }

    /// Remove a connection. Returns `false` if it was already gone.
    pub fn remove(&self, id: ConnectionId) -> bool {
        let (removed, total) = {
            let mut connections = self.lock();
            let removed = connections.remove(&id);
            (removed, connections.len())
        };

        match removed {
            Some(connection) => {
                connection.mark_closed();
                tracing::info!(connection_id = %id, total, "Client removed");
                true
            }
            None => false,
        }
    }

    /// Point-in-time copy of the current connections, in ID order.
    pub fn snapshot(&self) -> Vec<Arc<Connection>> {
        self.lock().values().cloned().collect()
    }

    /// IDs of the current connections, in ascending order.
    pub fn ids(&self) -> Vec<ConnectionId> {
        self.lock().keys().copied().collect()
    }

    pub fn contains(&self, id: ConnectionId) -> bool {
        self.lock().contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
