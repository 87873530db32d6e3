//! Store handle construction.
//!
//! Opening a store applies the SQLite pragmas the agent relies on and
//! brings the schema up to date before the handle is handed out. Foreign
//! keys must be enforced here: deleting a namespace is expected to take
//! its entries with it via the cascade.

use super::migrations;
use crate::Error;
use std::path::Path;
use tokio_rusqlite::Connection;

const PRAGMAS: &str = "PRAGMA journal_mode=WAL;
     PRAGMA synchronous=NORMAL;
     PRAGMA temp_store=MEMORY;
     PRAGMA foreign_keys=ON;";

/// Cache store handle.
///
/// Wraps a tokio-rusqlite Connection that runs database operations
/// on a background thread. Cloning is cheap; all clones share the
/// same underlying store, which serializes individual key operations.
#[derive(Clone, Debug)]
pub struct CacheStore {
    pub(crate) conn: Connection,
}

impl CacheStore {
    /// Open a store at the specified path, creating the file if absent.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let conn = Connection::open(path).await.map_err(|e| Error::Database(e.into()))?;
        Self::bootstrap(conn).await
    }

    /// Open an in-memory store for testing.
    pub async fn open_in_memory() -> Result<Self, Error> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| Error::Database(e.into()))?;
        Self::bootstrap(conn).await
    }

    /// Apply pragmas and migrations to a freshly opened connection.
    async fn bootstrap(conn: Connection) -> Result<Self, Error> {
        conn.call(|conn| {
            conn.execute_batch(PRAGMAS)?;
            Ok(())
        })
        .await
        .map_err(Error::Database)?;

        let schema_version = migrations::run(&conn).await?;
        tracing::debug!(schema_version, "cache store ready");

        Ok(Self { conn })
    }
}
