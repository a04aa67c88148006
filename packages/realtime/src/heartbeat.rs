//! Fixed-interval heartbeat published through the broadcaster.

use std::time::Duration;

use chrono::Utc;
use list_core::BroadcastEvent;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::broadcaster::Broadcaster;

/// Publishes a [`BroadcastEvent::heartbeat`] every `interval`, whether or not
/// any client is connected.
///
/// Each tick waits for its publish to finish. A slow publish pushes the next
/// tick back instead of queueing a burst of stale heartbeats.
pub struct HeartbeatTicker {
    broadcaster: Broadcaster,
    interval: Duration,
}

impl HeartbeatTicker {
    pub fn new(broadcaster: Broadcaster, interval: Duration) -> Self {
        Self {
            broadcaster,
            interval: interval.max(Duration::from_millis(1)),
        }
    }

    /// Run on a background task.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Tick until the broadcaster goes away. The first heartbeat is sent one
    /// interval after start.
    pub async fn run(self) {
        let mut ticker = tokio::time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(interval_ms = self.interval.as_millis() as u64, "Heartbeat started");

        loop {
            ticker.tick().await;

            let event = BroadcastEvent::heartbeat(Utc::now());
            match self.broadcaster.publish(event).await {
                Ok(report) => {
                    tracing::trace!(delivered = report.delivered, "Heartbeat sent");
                }
                Err(e) => {
                    tracing::info!(error = %e, "Heartbeat stopped");
                    break;
                }
            }
        }
    }
}
