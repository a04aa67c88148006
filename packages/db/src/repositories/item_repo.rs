//! Item repository: the persistent store behind the list.

use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use list_core::{Item, ItemId, ItemStore, ItemText, StoreError, StoreFuture};
use serde::{Deserialize, Serialize};
use surrealdb::sql::Thing;
use ulid::Generator;

use crate::{Database, DbError};

/// Internal record type for SurrealDB reads.
#[derive(Debug, Deserialize)]
struct ItemRecord {
    id: Option<Thing>,
    text: String,
    created_at: DateTime<Utc>,
}

impl ItemRecord {
    fn into_item(self) -> Result<Item, DbError> {
        let raw = self
            .id
            .as_ref()
            .map(|t| t.id.to_raw())
            .ok_or_else(|| DbError::InvalidId("record without id".into()))?;
        let id = ItemId::parse(&raw).map_err(|_| DbError::InvalidId(raw))?;

        Ok(Item {
            id,
            text: self.text,
            created_at: self.created_at,
        })
    }
}

/// Struct for creating items - omits created_at to use the SurrealDB default.
#[derive(Debug, Serialize)]
struct ItemCreate {
    text: String,
}

/// Repository for item persistence operations.
///
/// IDs come from a monotonic ULID generator so that two items stored in the
/// same millisecond still sort in insertion order.
pub struct ItemRepository {
    db: Database,
    ids: Mutex<Generator>,
}

impl ItemRepository {
    pub fn new(db: Database) -> Self {
        Self {
            db,
            ids: Mutex::new(Generator::new()),
        }
    }

    fn next_id(&self) -> ItemId {
        let mut ids = self.ids.lock().unwrap_or_else(PoisonError::into_inner);
        // Overflow only happens after 2^80 ids in one millisecond.
        ItemId(ids.generate().unwrap_or_else(|_| ulid::Ulid::new()))
    }

    /// Validate and store a new item.
    pub async fn create(&self, raw_text: &str) -> Result<Item, DbError> {
        let text = ItemText::parse(raw_text)?;
        let id = self.next_id();

        let record: Option<ItemRecord> = self
            .db
            .create(("item", id.to_string()))
            .content(ItemCreate {
                text: text.into_inner(),
            })
            .await?;

        let item = record
            .ok_or_else(|| DbError::Query("Failed to create item".into()))?
            .into_item()?;

        tracing::debug!(item_id = %item.id, "Stored item");
        Ok(item)
    }

    /// The newest `limit` items, oldest first.
    pub async fn list_recent(&self, limit: usize) -> Result<Vec<Item>, DbError> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let mut result = self
            .db
            .query("SELECT * FROM item ORDER BY created_at DESC, id DESC LIMIT $limit")
            .bind(("limit", limit as i64))
            .await?;

        let records: Vec<ItemRecord> = result.take(0)?;

        let mut items = records
            .into_iter()
            .map(ItemRecord::into_item)
            .collect::<Result<Vec<_>, _>>()?;
        items.reverse();
        Ok(items)
    }

    /// Number of stored items.
    pub async fn count(&self) -> Result<u64, DbError> {
        let mut result = self
            .db
            .query("SELECT count() FROM item GROUP ALL")
            .await?;

        #[derive(Deserialize)]
        struct CountResult {
            count: i64,
        }

        let counts: Vec<CountResult> = result.take(0)?;

        Ok(counts.first().map_or(0, |c| c.count.max(0) as u64))
    }
}

impl ItemStore for ItemRepository {
    fn append(&self, text: &str) -> StoreFuture<'_, Item> {
        let text = text.to_string();
        Box::pin(async move { self.create(&text).await.map_err(StoreError::from) })
    }

    fn list_recent(&self, limit: usize) -> StoreFuture<'_, Vec<Item>> {
        Box::pin(async move {
            ItemRepository::list_recent(self, limit)
                .await
                .map_err(StoreError::from)
        })
    }
}
