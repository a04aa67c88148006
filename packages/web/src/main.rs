use std::sync::Arc;

use api::{AppState, build_router};
use db::{ItemRepository, LiveItemFeed};
use realtime::RealtimeHub;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tracing_subscriber::EnvFilter;

mod config;

use config::AppConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env();

    let db_conn = db::init(&config.db).await?;
    let store = Arc::new(ItemRepository::new(db_conn.clone()));
    let hub = RealtimeHub::start(config.realtime.clone(), LiveItemFeed::new(db_conn)).await?;

    let state = config.apply(AppState::new(store, hub.endpoint()));
    let app = build_router(state);

    let listener = TcpListener::bind(&config.listen_addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "Listening");

    // Event streams stay open until the hub closes them, so the server only
    // drains after `hub.shutdown()`.
    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = stop_rx.await;
            })
            .await
    });

    shutdown_signal().await;
    tracing::info!("Shutting down");

    let _ = stop_tx.send(());
    hub.shutdown().await;
    server.await??;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
