//! Database connection management.

use std::path::PathBuf;

use surrealdb::Surreal;
use surrealdb::engine::any::{Any, connect as connect_any};
use surrealdb::opt::auth::Root;
use thiserror::Error;

use list_core::{StoreError, ValidationError};

/// Database connection handle. Cheap to clone; clones share one connection.
pub type Database = Surreal<Any>;

/// Where item data lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Storage {
    /// Process-local datastore, gone on exit. Each connect gets a fresh one.
    Memory,
    /// RocksDB directory (needs the `rocksdb` feature).
    RocksDb(PathBuf),
}

/// Root login used right after connecting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Database configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbConfig {
    pub storage: Storage,
    pub namespace: String,
    pub database: String,
    pub credentials: Option<Credentials>,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            storage: Storage::Memory,
            namespace: "realtime".to_string(),
            database: "items".to_string(),
            credentials: None,
        }
    }
}

impl DbConfig {
    pub fn memory() -> Self {
        Self::default()
    }

    pub fn rocksdb(path: impl Into<PathBuf>) -> Self {
        Self {
            storage: Storage::RocksDb(path.into()),
            ..Self::default()
        }
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.credentials = Some(Credentials {
            username: username.into(),
            password: password.into(),
        });
        self
    }

    /// Engine address understood by `surrealdb::engine::any`.
    pub fn endpoint(&self) -> String {
        match &self.storage {
            Storage::Memory => "mem://".to_string(),
            Storage::RocksDb(path) => format!("rocksdb://{}", path.display()),
        }
    }
}

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("Connection error: {0}")]
    Connection(#[from] surrealdb::Error),
    #[error("Query error: {0}")]
    Query(String),
    #[error("Invalid record id: {0}")]
    InvalidId(String),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl From<DbError> for StoreError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Validation(e) => StoreError::Validation(e),
            other => StoreError::Backend(other.to_string()),
        }
    }
}

/// Open a database connection and select the configured namespace.
pub async fn connect(config: &DbConfig) -> Result<Database, DbError> {
    let endpoint = config.endpoint();
    tracing::info!(%endpoint, "Connecting to database");

    let db = connect_any(endpoint).await?;

    if let Some(credentials) = &config.credentials {
        db.signin(Root {
            username: &credentials.username,
            password: &credentials.password,
        })
        .await?;
    }

    db.use_ns(&config.namespace).use_db(&config.database).await?;

    tracing::info!(
        namespace = %config.namespace,
        database = %config.database,
        "Connected to database"
    );

    Ok(db)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints() {
        assert_eq!(DbConfig::memory().endpoint(), "mem://");
        assert_eq!(
            DbConfig::rocksdb("/var/lib/items").endpoint(),
            "rocksdb:///var/lib/items"
        );
    }
}
