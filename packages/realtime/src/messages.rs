//! Message types for broadcaster communication.

use list_core::BroadcastEvent;
use ractor::RpcReplyPort;

/// Outcome of one fan-out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishReport {
    /// Connections in the snapshot.
    pub attempted: usize,
    /// Sends that succeeded.
    pub delivered: usize,
    /// Connections removed because their send failed.
    pub pruned: usize,
}

/// Running totals kept by the broadcaster.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcasterStats {
    pub published: u64,
    pub delivered: u64,
    pub pruned: u64,
}

/// Messages for the BroadcasterActor.
#[derive(Debug)]
pub enum BroadcasterMessage {
    /// Fan an event out to every registered connection.
    Publish {
        event: BroadcastEvent,
        reply: RpcReplyPort<PublishReport>,
    },

    /// Get running totals.
    GetStats { reply: RpcReplyPort<BroadcasterStats> },
}
