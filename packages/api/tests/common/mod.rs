#![allow(dead_code)]

use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use api::{AppState, build_router};
use axum::Router;
use db::{DbConfig, ItemRepository, LiveItemFeed};
use realtime::{RealtimeConfig, RealtimeHub};

pub struct TestApp {
    pub router: Router,
    pub hub: RealtimeHub,
}

/// Router over a fresh in-memory database and a running hub. Heartbeats are
/// slowed down so they don't interleave with item events.
pub async fn setup_app(items_limit: usize) -> Result<TestApp, Box<dyn Error>> {
    let db_conn = db::init(&DbConfig::memory()).await?;
    let store = Arc::new(ItemRepository::new(db_conn.clone()));

    let config = RealtimeConfig::default().with_heartbeat_interval(Duration::from_secs(3600));
    let hub = RealtimeHub::start(config, LiveItemFeed::new(db_conn)).await?;
    tokio::time::timeout(Duration::from_secs(5), hub.wait_for_feed()).await?;

    let state = AppState::new(store, hub.endpoint()).with_items_limit(items_limit);
    Ok(TestApp {
        router: build_router(state),
        hub,
    })
}
