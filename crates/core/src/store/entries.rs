//! Cache entry operations.
//!
//! Provides keyed storage of HTTP response snapshots inside a namespace:
//! UPSERT put, method+URL match, and entry counting.

use super::connection::CacheStore;
use super::key::entry_key;
use crate::Error;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite::{self, types::Type};

/// A stored HTTP response snapshot.
///
/// Status, headers, and a body copy taken at store time. The body is an
/// owned byte buffer, so a stored entry is always independent from the
/// live response it was duplicated from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredResponse {
    pub key: String,
    pub method: String,
    pub url: String,
    pub status: u16,
    pub content_type: Option<String>,
    pub headers: BTreeMap<String, String>,
    pub body: Vec<u8>,
    pub fetched_at: String,
}

impl StoredResponse {
    /// Build a snapshot for the given request identity, stamped with the
    /// current time.
    pub fn new(
        method: &str, url: &str, status: u16, content_type: Option<String>, headers: BTreeMap<String, String>,
        body: Vec<u8>,
    ) -> Self {
        Self {
            key: entry_key(method, url),
            method: method.to_string(),
            url: url.to_string(),
            status,
            content_type,
            headers,
            body,
            fetched_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

impl CacheStore {
    /// Insert or update an entry in a namespace.
    ///
    /// Uses UPSERT semantics: inserts if the key doesn't exist in the
    /// namespace, replaces the snapshot if it does. Re-installing over an
    /// already-populated namespace therefore never corrupts entries.
    ///
    /// # Errors
    ///
    /// Fails if the namespace does not exist (foreign key violation) or
    /// the database operation fails.
    pub async fn put_entry(&self, namespace: &str, entry: &StoredResponse) -> Result<(), Error> {
        let namespace = namespace.to_string();
        let entry = entry.clone();
        self.conn
            .call(move |conn| -> Result<(), rusqlite::Error> {
                let headers_json = serde_json::to_string(&entry.headers)
                    .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;
                conn.execute(
                    "INSERT INTO entries (
                        namespace, key, method, url, status, content_type, headers_json, body, fetched_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                    ON CONFLICT(namespace, key) DO UPDATE SET
                        method = excluded.method,
                        url = excluded.url,
                        status = excluded.status,
                        content_type = excluded.content_type,
                        headers_json = excluded.headers_json,
                        body = excluded.body,
                        fetched_at = excluded.fetched_at",
                    params![
                        &namespace,
                        &entry.key,
                        &entry.method,
                        &entry.url,
                        entry.status,
                        &entry.content_type,
                        &headers_json,
                        &entry.body,
                        &entry.fetched_at,
                    ],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Look up an entry by request identity (method + URL).
    ///
    /// Returns None if the namespace holds no entry for that key.
    pub async fn match_entry(&self, namespace: &str, method: &str, url: &str) -> Result<Option<StoredResponse>, Error> {
        let namespace = namespace.to_string();
        let key = entry_key(method, url);
        self.conn
            .call(move |conn| -> Result<Option<StoredResponse>, rusqlite::Error> {
                let mut stmt = conn.prepare(
                    "SELECT key, method, url, status, content_type, headers_json, body, fetched_at
                     FROM entries WHERE namespace = ?1 AND key = ?2",
                )?;

                let result = stmt.query_row(params![namespace, key], |row| {
                    let headers_json: String = row.get(5)?;
                    let headers = serde_json::from_str(&headers_json)
                        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(5, Type::Text, Box::new(e)))?;
                    Ok(StoredResponse {
                        key: row.get(0)?,
                        method: row.get(1)?,
                        url: row.get(2)?,
                        status: row.get(3)?,
                        content_type: row.get(4)?,
                        headers,
                        body: row.get(6)?,
                        fetched_at: row.get(7)?,
                    })
                });

                match result {
                    Ok(entry) => Ok(Some(entry)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// Count the entries in a namespace.
    pub async fn count_entries(&self, namespace: &str) -> Result<u64, Error> {
        let namespace = namespace.to_string();
        let count: i64 = self
            .conn
            .call(move |conn| {
                conn.query_row(
                    "SELECT COUNT(*) FROM entries WHERE namespace = ?1",
                    params![namespace],
                    |row| row.get(0),
                )
            })
            .await
            .map_err(Error::from)?;
        Ok(count as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_entry(url: &str) -> StoredResponse {
        let mut headers = BTreeMap::new();
        headers.insert("content-type".to_string(), "text/html".to_string());
        StoredResponse::new("GET", url, 200, Some("text/html".to_string()), headers, b"<html></html>".to_vec())
    }

    #[tokio::test]
    async fn test_put_and_match() {
        let store = CacheStore::open_in_memory().await.unwrap();
        store.open_namespace("app-cache-v1").await.unwrap();

        let entry = make_entry("https://example.com/index.html");
        store.put_entry("app-cache-v1", &entry).await.unwrap();

        let found = store
            .match_entry("app-cache-v1", "GET", "https://example.com/index.html")
            .await
            .unwrap()
            .expect("entry should be present");
        assert_eq!(found, entry);
    }

    #[tokio::test]
    async fn test_match_miss() {
        let store = CacheStore::open_in_memory().await.unwrap();
        store.open_namespace("app-cache-v1").await.unwrap();

        let found = store
            .match_entry("app-cache-v1", "GET", "https://example.com/missing.js")
            .await
            .unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_put_is_upsert() {
        let store = CacheStore::open_in_memory().await.unwrap();
        store.open_namespace("app-cache-v1").await.unwrap();

        let first = make_entry("https://example.com/");
        store.put_entry("app-cache-v1", &first).await.unwrap();

        let mut second = make_entry("https://example.com/");
        second.body = b"<html>v2</html>".to_vec();
        store.put_entry("app-cache-v1", &second).await.unwrap();

        let found = store
            .match_entry("app-cache-v1", "GET", "https://example.com/")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.body, b"<html>v2</html>");
        assert_eq!(store.count_entries("app-cache-v1").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_entries_isolated_per_namespace() {
        let store = CacheStore::open_in_memory().await.unwrap();
        store.open_namespace("app-cache-v1").await.unwrap();
        store.open_namespace("app-cache-v2").await.unwrap();

        store
            .put_entry("app-cache-v1", &make_entry("https://example.com/"))
            .await
            .unwrap();

        let other = store
            .match_entry("app-cache-v2", "GET", "https://example.com/")
            .await
            .unwrap();
        assert!(other.is_none());
    }

    #[tokio::test]
    async fn test_put_requires_namespace() {
        let store = CacheStore::open_in_memory().await.unwrap();
        let result = store.put_entry("never-opened", &make_entry("https://example.com/")).await;
        assert!(result.is_err());
    }
}
