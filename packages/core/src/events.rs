//! Event types for real-time updates.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// What a broadcast event announces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A new item was persisted.
    ItemAdded,
    /// Periodic liveness tick.
    Heartbeat,
}

impl EventKind {
    /// Name used for the SSE `event:` field.
    pub fn event_name(&self) -> &'static str {
        match self {
            EventKind::ItemAdded => "items-update",
            EventKind::Heartbeat => "time-update",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.event_name())
    }
}

/// A single event fanned out to every live connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastEvent {
    pub kind: EventKind,
    pub payload: String,
    /// Sent as the SSE `id:` field when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sequence_id: Option<String>,
}

impl BroadcastEvent {
    /// An event announcing a new item's text.
    pub fn item_added(text: impl Into<String>) -> Self {
        Self {
            kind: EventKind::ItemAdded,
            payload: text.into(),
            sequence_id: None,
        }
    }

    /// A heartbeat carrying `at` as RFC 3339 UTC with millisecond precision.
    pub fn heartbeat(at: DateTime<Utc>) -> Self {
        Self {
            kind: EventKind::Heartbeat,
            payload: at.to_rfc3339_opts(SecondsFormat::Millis, true),
            sequence_id: None,
        }
    }

    pub fn with_sequence_id(mut self, id: impl Into<String>) -> Self {
        self.sequence_id = Some(id.into());
        self
    }

    pub fn event_name(&self) -> &'static str {
        self.kind.event_name()
    }

    /// Get a short description of this event for logging.
    pub fn description(&self) -> String {
        match self.kind {
            EventKind::ItemAdded => format!("Item added: {}", self.payload),
            EventKind::Heartbeat => format!("Heartbeat at {}", self.payload),
        }
    }
}
