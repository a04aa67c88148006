//! Tunables for the fan-out core.

use std::time::Duration;

/// Realtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RealtimeConfig {
    /// Time between heartbeat events.
    pub heartbeat_interval: Duration,
    /// Upper bound on a single write to one connection.
    pub send_timeout: Duration,
    /// Events buffered per connection before writes start to wait.
    pub sink_capacity: usize,
    /// First delay before re-subscribing to a failed change feed.
    pub feed_retry_initial: Duration,
    /// Cap for the doubling re-subscribe delay.
    pub feed_retry_max: Duration,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            heartbeat_interval: Duration::from_millis(1000),
            send_timeout: Duration::from_secs(2),
            sink_capacity: 32,
            feed_retry_initial: Duration::from_millis(250),
            feed_retry_max: Duration::from_secs(10),
        }
    }
}

impl RealtimeConfig {
    /// Set the heartbeat interval. Must be non-zero; zero becomes 1 ms.
    pub fn with_heartbeat_interval(mut self, interval: Duration) -> Self {
        self.heartbeat_interval = interval.max(Duration::from_millis(1));
        self
    }

    /// Set the per-connection write timeout.
    pub fn with_send_timeout(mut self, timeout: Duration) -> Self {
        self.send_timeout = timeout;
        self
    }

    /// Set the per-connection buffer size. Zero is raised to one.
    pub fn with_sink_capacity(mut self, capacity: usize) -> Self {
        self.sink_capacity = capacity.max(1);
        self
    }

    /// Set the change feed re-subscribe backoff bounds.
    pub fn with_feed_retry(mut self, initial: Duration, max: Duration) -> Self {
        self.feed_retry_initial = initial;
        self.feed_retry_max = max.max(initial);
        self
    }
}
