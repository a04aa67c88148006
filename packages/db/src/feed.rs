//! Change feed over the item table, built on SurrealDB live queries.

use chrono::{DateTime, Utc};
use futures_util::StreamExt;
use list_core::{ChangeFeed, ChangeOperation, ChangeRecord, FeedError, FeedFuture, ItemDocument};
use serde::Deserialize;
use surrealdb::method::Stream;
use surrealdb::sql::Thing;
use surrealdb::{Action, Notification};

use crate::Database;

/// Record shape delivered by live notifications. Every field is optional so
/// partial documents reach the adapter instead of failing deserialization.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LiveItem {
    id: Option<Thing>,
    text: Option<String>,
    created_at: Option<DateTime<Utc>>,
}

fn operation_for(action: Action) -> ChangeOperation {
    match action {
        Action::Create => ChangeOperation::Insert,
        Action::Update => ChangeOperation::Update,
        Action::Delete => ChangeOperation::Delete,
        other => ChangeOperation::Other(format!("{other:?}").to_lowercase()),
    }
}

fn to_change_record(notification: Notification<LiveItem>) -> ChangeRecord {
    let LiveItem {
        id,
        text,
        created_at,
    } = notification.data;

    ChangeRecord::new(
        operation_for(notification.action),
        Some(ItemDocument {
            id: id.map(|t| t.id.to_raw()),
            text,
            created_at,
        }),
    )
}

/// Live subscription to inserts, updates, and deletes on `item`.
#[derive(Clone)]
pub struct LiveItemFeed {
    db: Database,
}

impl LiveItemFeed {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

impl ChangeFeed for LiveItemFeed {
    fn subscribe(&self) -> FeedFuture<'_> {
        Box::pin(async move {
            let stream: Stream<Vec<LiveItem>> = self
                .db
                .select("item")
                .live()
                .await
                .map_err(|e| FeedError::Subscribe(e.to_string()))?;

            tracing::debug!("Live query on item table started");

            Ok(stream
                .map(|result| {
                    result
                        .map(to_change_record)
                        .map_err(|e| FeedError::Stream(e.to_string()))
                })
                .boxed())
        })
    }
}
