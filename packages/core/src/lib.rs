//! Core domain types for the realtime item list.
//!
//! This crate contains shared types used across all packages:
//! - Item, ItemId and ItemText for stored list entries
//! - BroadcastEvent for everything pushed to live clients
//! - ChangeRecord for raw change-feed notifications
//! - The ItemStore and ChangeFeed seams the fan-out core consumes

mod change;
mod events;
mod item;
mod store;

pub use change::{ChangeOperation, ChangeRecord, ItemDocument};
pub use events::{BroadcastEvent, EventKind};
pub use item::{Item, ItemId, ItemText, MAX_ITEM_LEN, ValidationError};
pub use store::{
    ChangeFeed, ChangeStream, FeedError, FeedFuture, ItemStore, StoreError, StoreFuture,
};
