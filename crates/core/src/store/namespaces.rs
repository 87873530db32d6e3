//! Versioned namespace operations.
//!
//! Each app version owns one namespace; superseded namespaces are deleted
//! wholesale during activation, taking their entries with them.

use super::connection::CacheStore;
use crate::Error;
use tokio_rusqlite::params;

impl CacheStore {
    /// Open a namespace, creating it if absent.
    ///
    /// Opening an existing namespace is a no-op; its entries are untouched.
    pub async fn open_namespace(&self, name: &str) -> Result<(), Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<(), tokio_rusqlite::rusqlite::Error> {
                conn.execute(
                    "INSERT INTO namespaces (name, created_at) VALUES (?1, ?2)
                     ON CONFLICT(name) DO NOTHING",
                    params![name, chrono::Utc::now().to_rfc3339()],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Enumerate all namespaces, oldest first.
    pub async fn list_namespaces(&self) -> Result<Vec<String>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<String>, tokio_rusqlite::rusqlite::Error> {
                let mut stmt = conn.prepare("SELECT name FROM namespaces ORDER BY created_at, name")?;
                let names = stmt
                    .query_map([], |row| row.get::<_, String>(0))?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(names)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete a namespace and all of its entries.
    ///
    /// Returns true if the namespace existed. Entries go with it via the
    /// foreign key cascade.
    pub async fn delete_namespace(&self, name: &str) -> Result<bool, Error> {
        let name = name.to_string();
        let deleted = self
            .conn
            .call(move |conn| -> Result<usize, tokio_rusqlite::rusqlite::Error> {
                let n = conn.execute("DELETE FROM namespaces WHERE name = ?1", params![name])?;
                Ok(n)
            })
            .await
            .map_err(Error::from)?;
        Ok(deleted > 0)
    }
}
