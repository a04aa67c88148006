//! Store and change-feed seams consumed by the fan-out core.

use std::future::Future;
use std::pin::Pin;

use futures_util::stream::BoxStream;
use thiserror::Error;

use crate::{ChangeRecord, Item, ValidationError};

/// Errors from an item store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Store backend error: {0}")]
    Backend(String),
}

/// Errors from a change feed. All of them are recoverable by re-subscribing.
#[derive(Debug, Clone, Error)]
pub enum FeedError {
    #[error("Failed to subscribe to change feed: {0}")]
    Subscribe(String),
    #[error("Change feed stream error: {0}")]
    Stream(String),
}

/// Future type for store operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + Send + 'a>>;

/// Stream of change records. Ends when the underlying subscription closes.
pub type ChangeStream = BoxStream<'static, Result<ChangeRecord, FeedError>>;

/// Future type for opening a change feed subscription.
pub type FeedFuture<'a> =
    Pin<Box<dyn Future<Output = Result<ChangeStream, FeedError>> + Send + 'a>>;

/// Persistent storage for items.
pub trait ItemStore: Send + Sync + 'static {
    /// Validate and persist a new item.
    fn append(&self, text: &str) -> StoreFuture<'_, Item>;

    /// The newest `limit` items, returned oldest first.
    fn list_recent(&self, limit: usize) -> StoreFuture<'_, Vec<Item>>;
}

/// Restartable subscription to store mutations.
pub trait ChangeFeed: Send + Sync + 'static {
    /// Open a new subscription. Can be called again after the previous
    /// stream ends or errors.
    fn subscribe(&self) -> FeedFuture<'_>;
}
