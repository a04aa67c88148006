//! SurrealDB integration for the realtime item list.
//!
//! This crate provides database connectivity, the item repository (the
//! store behind `POST /create` and `GET /items`), and the live change feed
//! that drives realtime updates.
//!
//! # Features
//!
//! - `memory` (default): Use in-memory storage
//! - `rocksdb`: Use RocksDB for persistent file-based storage

mod connection;
mod feed;
mod schema;
pub mod repositories;

pub use connection::{Credentials, Database, DbConfig, DbError, Storage, connect};
pub use feed::LiveItemFeed;
pub use repositories::ItemRepository;
pub use schema::init_schema;

/// Connect with the given configuration and make sure the schema exists.
///
/// This should be called once at application startup.
pub async fn init(config: &DbConfig) -> Result<Database, DbError> {
    let db = connect(config).await?;
    init_schema(&db).await?;
    Ok(db)
}
