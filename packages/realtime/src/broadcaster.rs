//! Broadcaster actor: the single point where one event becomes N deliveries.

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use list_core::BroadcastEvent;
use ractor::{Actor, ActorProcessingErr, ActorRef};
use tokio::task::JoinHandle;

use crate::error::RealtimeError;
use crate::messages::{BroadcasterMessage, BroadcasterStats, PublishReport};
use crate::registry::ConnectionRegistry;

/// Send `event` to every connection in a fresh registry snapshot.
///
/// Sends run concurrently, each bounded by `send_timeout`. Connections whose
/// send fails are closed and removed; the others are unaffected.
pub async fn fan_out(
    registry: &ConnectionRegistry,
    event: &BroadcastEvent,
    send_timeout: Duration,
) -> PublishReport {
    let snapshot = registry.snapshot();
    let mut report = PublishReport {
        attempted: snapshot.len(),
        ..Default::default()
    };

    let results = join_all(snapshot.iter().map(|connection| async move {
        let result = connection.send(event.clone(), send_timeout).await;
        (connection, result)
    }))
    .await;

    for (connection, result) in results {
        match result {
            Ok(()) => report.delivered += 1,
            Err(e) => {
                tracing::warn!(
                    connection_id = %connection.id(),
                    error = %e,
                    "Error sending to client, removing it"
                );
                connection.close();
                registry.remove(connection.id());
                report.pruned += 1;
            }
        }
    }

    report
}

/// Arguments for spawning the broadcaster.
pub struct BroadcasterArgs {
    pub registry: Arc<ConnectionRegistry>,
    pub send_timeout: Duration,
}

/// State for the broadcaster actor.
pub struct BroadcasterState {
    registry: Arc<ConnectionRegistry>,
    send_timeout: Duration,
    stats: BroadcasterStats,
}

/// Actor that serializes publishes. Its mailbox orders events, so every
/// connection sees them in the order `publish` was called.
pub struct BroadcasterActor;

impl Actor for BroadcasterActor {
    type Msg = BroadcasterMessage;
    type State = BroadcasterState;
    type Arguments = BroadcasterArgs;

    async fn pre_start(
        &self,
        _myself: ActorRef<Self::Msg>,
        args: Self::Arguments,
    ) -> Result<Self::State, ActorProcessingErr> {
        tracing::info!(
            send_timeout_ms = args.send_timeout.as_millis() as u64,
            "Starting broadcaster"
        );
        Ok(BroadcasterState {
            registry: args.registry,
            send_timeout: args.send_timeout,
            stats: BroadcasterStats::default(),
        })
    }

    async fn handle(
        &self,
        _myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        match message {
            BroadcasterMessage::Publish { event, reply } => {
                let report = fan_out(&state.registry, &event, state.send_timeout).await;

                state.stats.published += 1;
                state.stats.delivered += report.delivered as u64;
                state.stats.pruned += report.pruned as u64;

                tracing::trace!(
                    event = event.event_name(),
                    attempted = report.attempted,
                    delivered = report.delivered,
                    pruned = report.pruned,
                    "Published event"
                );

                let _ = reply.send(report);
            }

            BroadcasterMessage::GetStats { reply } => {
                let _ = reply.send(state.stats);
            }
        }

        Ok(())
    }

    async fn post_stop(
        &self,
        _myself: ActorRef<Self::Msg>,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        tracing::info!(
            published = state.stats.published,
            pruned = state.stats.pruned,
            "Broadcaster stopped"
        );
        Ok(())
    }
}

/// Cloneable handle to the broadcaster actor.
#[derive(Clone)]
pub struct Broadcaster {
    actor: ActorRef<BroadcasterMessage>,
}

impl Broadcaster {
    /// Spawn the broadcaster over `registry`.
    pub async fn spawn(
        registry: Arc<ConnectionRegistry>,
        send_timeout: Duration,
    ) -> Result<(Self, JoinHandle<()>), RealtimeError> {
        let args = BroadcasterArgs {
            registry,
            send_timeout,
        };
        let (actor, handle) = Actor::spawn(None, BroadcasterActor, args)
            .await
            .map_err(|e| RealtimeError::Spawn(e.to_string()))?;

        Ok((Self { actor }, handle))
    }

    /// Fan `event` out and wait until every send in the snapshot has either
    /// succeeded or been pruned. Per-connection failures are not errors.
    pub async fn publish(&self, event: BroadcastEvent) -> Result<PublishReport, RealtimeError> {
        let (tx, rx) = ractor::concurrency::oneshot();
        self.actor
            .send_message(BroadcasterMessage::Publish {
                event,
                reply: tx.into(),
            })
            .map_err(|_| RealtimeError::BroadcasterUnavailable)?;

        rx.await.map_err(|_| RealtimeError::BroadcasterUnavailable)
    }

    /// Running totals since the broadcaster started.
    pub async fn stats(&self) -> Result<BroadcasterStats, RealtimeError> {
        let (tx, rx) = ractor::concurrency::oneshot();
        self.actor
            .send_message(BroadcasterMessage::GetStats { reply: tx.into() })
            .map_err(|_| RealtimeError::BroadcasterUnavailable)?;

        rx.await.map_err(|_| RealtimeError::BroadcasterUnavailable)
    }

    /// Stop the actor. Queued publishes are dropped.
    pub fn stop(&self) {
        self.actor.stop(None);
    }
}
