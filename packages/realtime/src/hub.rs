//! Wires the registry, broadcaster, heartbeat and change feed together.

use std::sync::Arc;

use list_core::ChangeFeed;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::adapter::FeedAdapter;
use crate::broadcaster::Broadcaster;
use crate::config::RealtimeConfig;
use crate::endpoint::StreamingEndpoint;
use crate::error::RealtimeError;
use crate::heartbeat::HeartbeatTicker;
use crate::registry::ConnectionRegistry;

/// A running fan-out core.
pub struct RealtimeHub {
    registry: Arc<ConnectionRegistry>,
    broadcaster: Broadcaster,
    endpoint: StreamingEndpoint,
    feed_status: watch::Receiver<bool>,
    actor_handle: JoinHandle<()>,
    tasks: Vec<JoinHandle<()>>,
}

impl RealtimeHub {
    /// Start the broadcaster, the heartbeat and the change feed adapter.
    pub async fn start<F>(config: RealtimeConfig, feed: F) -> Result<Self, RealtimeError>
    where
        F: ChangeFeed,
    {
        Self::start_with_feed(config, Arc::new(feed)).await
    }

    pub async fn start_with_feed(
        config: RealtimeConfig,
        feed: Arc<dyn ChangeFeed>,
    ) -> Result<Self, RealtimeError> {
        let registry = Arc::new(ConnectionRegistry::new());
        let (broadcaster, actor_handle) =
            Broadcaster::spawn(registry.clone(), config.send_timeout).await?;

        let heartbeat =
            HeartbeatTicker::new(broadcaster.clone(), config.heartbeat_interval).spawn();
        let adapter = FeedAdapter::new(feed, broadcaster.clone())
            .with_retry(config.feed_retry_initial, config.feed_retry_max);
        let feed_status = adapter.status();
        let adapter = adapter.spawn();

        let endpoint = StreamingEndpoint::new(registry.clone(), config.sink_capacity);

        tracing::info!(
            heartbeat_ms = config.heartbeat_interval.as_millis() as u64,
            sink_capacity = config.sink_capacity,
            "Realtime hub started"
        );

        Ok(Self {
            registry,
            broadcaster,
            endpoint,
            feed_status,
            actor_handle,
            tasks: vec![heartbeat, adapter],
        })
    }

    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    pub fn broadcaster(&self) -> &Broadcaster {
        &self.broadcaster
    }

    pub fn endpoint(&self) -> StreamingEndpoint {
        self.endpoint.clone()
    }

    /// Whether the change feed adapter currently holds a subscription.
    pub fn feed_subscribed(&self) -> bool {
        *self.feed_status.borrow()
    }

    /// Wait until the change feed adapter has subscribed. Changes made
    /// before that are not broadcast.
    pub async fn wait_for_feed(&self) {
        let mut status = self.feed_status.clone();
        // Err means the adapter task is gone; there is nothing to wait for.
        let _ = status.wait_for(|subscribed| *subscribed).await;
    }

    /// Stop background tasks and the broadcaster, then close every
    /// remaining connection.
    pub async fn shutdown(self) {
        for task in &self.tasks {
            task.abort();
        }
        self.broadcaster.stop();
        if let Err(e) = self.actor_handle.await {
            tracing::warn!(error = %e, "Broadcaster did not stop cleanly");
        }

        for connection in self.registry.snapshot() {
            connection.close();
            self.registry.remove(connection.id());
        }

        tracing::info!("Realtime hub stopped");
    }
}
