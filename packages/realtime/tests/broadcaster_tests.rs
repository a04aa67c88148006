mod common;

use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use list_core::{BroadcastEvent, EventKind};
use realtime::{
    Broadcaster, Connection, ConnectionId, ConnectionRegistry, PublishReport, StreamingEndpoint,
};
use tokio::sync::mpsc;

const WAIT: Duration = Duration::from_secs(5);

async fn setup(
    send_timeout: Duration,
    sink_capacity: usize,
) -> Result<(Arc<ConnectionRegistry>, Broadcaster, StreamingEndpoint), Box<dyn Error>> {
    let registry = Arc::new(ConnectionRegistry::new());
    let (broadcaster, _handle) = Broadcaster::spawn(registry.clone(), send_timeout).await?;
    let endpoint = StreamingEndpoint::new(registry.clone(), sink_capacity);
    Ok((registry, broadcaster, endpoint))
}

#[tokio::test]
async fn test_publish_with_no_connections() -> Result<(), Box<dyn Error>> {
    let (_registry, broadcaster, _endpoint) = setup(Duration::from_secs(1), 8).await?;

    let report = broadcaster.publish(BroadcastEvent::heartbeat(Utc::now())).await?;
    assert_eq!(report, PublishReport::default());

    let stats = broadcaster.stats().await?;
    assert_eq!(stats.published, 1);
    assert_eq!(stats.delivered, 0);

    broadcaster.stop();
    Ok(())
}

#[tokio::test]
async fn test_item_then_heartbeat_after_disconnect() -> Result<(), Box<dyn Error>> {
    let (registry, broadcaster, endpoint) = setup(Duration::from_secs(1), 8).await?;

    let mut a = endpoint.open()?;
    let mut b = endpoint.open()?;

    let report = broadcaster
        .publish(BroadcastEvent::item_added("milk").with_sequence_id("01J"))
        .await?;
    assert_eq!(report.delivered, 2);

    for sub in [&mut a, &mut b] {
        let event = tokio::time::timeout(WAIT, sub.recv()).await?.ok_or("closed")?;
        assert_eq!(event.kind, EventKind::ItemAdded);
        assert_eq!(event.event_name(), "items-update");
        assert_eq!(event.payload, "milk");
        assert_eq!(event.sequence_id.as_deref(), Some("01J"));
    }

    let b_id = b.id();
    drop(a);
    assert!(common::wait_until(|| registry.len() == 1).await);

    let report = broadcaster
        .publish(BroadcastEvent::heartbeat(Utc::now()))
        .await?;
    assert_eq!(report.attempted, 1);
    assert_eq!(report.pruned, 0);

    let event = tokio::time::timeout(WAIT, b.recv()).await?.ok_or("closed")?;
    assert_eq!(event.event_name(), "time-update");
    assert_eq!(registry.ids(), vec![b_id]);

    Ok(())
}

#[tokio::test]
async fn test_closed_sink_is_pruned_without_affecting_others() -> Result<(), Box<dyn Error>> {
    let (registry, broadcaster, endpoint) = setup(Duration::from_secs(1), 8).await?;

    let mut live = endpoint.open()?;

    // Registered directly, so nothing notices the dropped receiver until a send.
    let (tx, rx) = mpsc::channel(1);
    drop(rx);
    registry.add(Arc::new(Connection::new(ConnectionId(1000), tx)))?;

    let report = broadcaster.publish(BroadcastEvent::item_added("eggs")).await?;
    assert_eq!(
        report,
        PublishReport {
            attempted: 2,
            delivered: 1,
            pruned: 1,
        }
    );
    assert!(!registry.contains(ConnectionId(1000)));
    assert!(registry.contains(live.id()));

    let event = tokio::time::timeout(WAIT, live.recv()).await?.ok_or("closed")?;
    assert_eq!(event.payload, "eggs");

    Ok(())
}

#[tokio::test]
async fn test_slow_client_times_out_and_is_removed() -> Result<(), Box<dyn Error>> {
    let send_timeout = Duration::from_millis(50);
    let (registry, broadcaster, endpoint) = setup(send_timeout, 1).await?;

    let mut stalled = endpoint.open()?;
    let mut reader = endpoint.open()?;
    let stalled_id = stalled.id();

    broadcaster.publish(BroadcastEvent::item_added("one")).await?;
    let first = tokio::time::timeout(WAIT, reader.recv()).await?.ok_or("closed")?;
    assert_eq!(first.payload, "one");

    // The stalled client's single slot is still full.
    let started = tokio::time::Instant::now();
    let report = broadcaster.publish(BroadcastEvent::item_added("two")).await?;
    assert!(started.elapsed() >= send_timeout);
    assert_eq!(report.delivered, 1);
    assert_eq!(report.pruned, 1);
    assert!(!registry.contains(stalled_id));
    assert_eq!(registry.ids(), vec![reader.id()]);

    let second = tokio::time::timeout(WAIT, reader.recv()).await?.ok_or("closed")?;
    assert_eq!(second.payload, "two");

    // Later publishes see only the remaining client and report no failure.
    let report = broadcaster.publish(BroadcastEvent::item_added("three")).await?;
    assert_eq!(report.attempted, 1);
    assert_eq!(report.pruned, 0);
    assert_eq!(registry.ids(), vec![reader.id()]);
    let third = tokio::time::timeout(WAIT, reader.recv()).await?.ok_or("closed")?;
    assert_eq!(third.payload, "three");

    // The stalled client still drains what it had, then sees the end.
    let buffered = tokio::time::timeout(WAIT, stalled.recv()).await?;
    assert_eq!(buffered.map(|e| e.payload), Some("one".to_string()));
    assert!(tokio::time::timeout(WAIT, stalled.recv()).await?.is_none());

    let stats = broadcaster.stats().await?;
    assert_eq!(stats.published, 3);
    assert_eq!(stats.pruned, 1);

    Ok(())
}

#[tokio::test]
async fn test_every_connection_sees_the_same_order() -> Result<(), Box<dyn Error>> {
    let (_registry, broadcaster, endpoint) = setup(Duration::from_secs(1), 64).await?;

    let mut a = endpoint.open()?;
    let mut b = endpoint.open()?;

    let mut publishers = Vec::new();
    for task in 0..2 {
        let broadcaster = broadcaster.clone();
        publishers.push(tokio::spawn(async move {
            for n in 0..10 {
                let event = BroadcastEvent::item_added(format!("{task}-{n}"));
                broadcaster.publish(event).await?;
            }
            Ok::<_, realtime::RealtimeError>(())
        }));
    }
    for publisher in publishers {
        publisher.await??;
    }

    let mut seen_a = Vec::new();
    let mut seen_b = Vec::new();
    for _ in 0..20 {
        seen_a.push(a.try_recv().ok_or("missing event")?.payload);
        seen_b.push(b.try_recv().ok_or("missing event")?.payload);
    }
    assert_eq!(seen_a, seen_b);

    // Each publisher's own events keep their order.
    for task in 0..2 {
        let prefix = format!("{task}-");
        let mine: Vec<&String> = seen_a.iter().filter(|p| p.starts_with(&prefix)).collect();
        let expected: Vec<String> = (0..10).map(|n| format!("{task}-{n}")).collect();
        assert_eq!(mine, expected.iter().collect::<Vec<_>>());
    }

    Ok(())
}

#[tokio::test]
async fn test_publish_after_stop_fails() -> Result<(), Box<dyn Error>> {
    let registry = Arc::new(ConnectionRegistry::new());
    let (broadcaster, handle) = Broadcaster::spawn(registry, Duration::from_secs(1)).await?;

    broadcaster.stop();
    handle.await?;

    let result = broadcaster.publish(BroadcastEvent::item_added("late")).await;
    assert!(matches!(
        result,
        Err(realtime::RealtimeError::BroadcasterUnavailable)
    ));
    Ok(())
}
