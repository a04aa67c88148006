//! Database schema definitions using SurrealQL.

use crate::{Database, DbError};

/// Initialize the database schema.
///
/// This creates the item table, its fields, and indexes. Safe to run on
/// every startup.
pub async fn init_schema(db: &Database) -> Result<(), DbError> {
    tracing::info!("Initializing database schema...");

    db.query(ITEM_SCHEMA).await?.check()?;

    tracing::info!("Database schema initialized");

    Ok(())
}

/// Item table schema.
const ITEM_SCHEMA: &str = r#"
-- Item table for list entries
DEFINE TABLE IF NOT EXISTS item SCHEMAFULL;

DEFINE FIELD IF NOT EXISTS text ON item TYPE string
    ASSERT string::len($value) >= 1 AND string::len($value) <= 100;
DEFINE FIELD IF NOT EXISTS created_at ON item TYPE datetime DEFAULT time::now();

-- Listing reads newest-first by creation time
DEFINE INDEX IF NOT EXISTS item_created ON item FIELDS created_at;
"#;
