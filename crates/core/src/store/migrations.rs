//! Cache schema migrations.
//!
//! The schema carries an incrementing version tracked in a `_migrations`
//! table; each entry in [`MIGRATIONS`] is a SQL batch applied at most
//! once, in order, when the store is opened.

use super::Error;
use tokio_rusqlite::{Connection, params};

const MIGRATIONS: &[(i64, &str)] = &[(1, include_str!("../../migrations/001_cache.sql"))];

/// Apply pending migrations, returning the resulting schema version.
///
/// # Errors
///
/// Returns `Error::MigrationFailed` if a migration batch fails to
/// execute; the schema version is only advanced past batches that
/// applied cleanly.
pub async fn run(conn: &Connection) -> Result<i64, Error> {
    conn.call(|conn| -> Result<i64, Error> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS _migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            )",
            [],
        )?;

        let mut version: i64 =
            conn.query_row("SELECT COALESCE(MAX(version), 0) FROM _migrations", [], |row| row.get(0))?;

        for (target, sql) in MIGRATIONS {
            if *target <= version {
                continue;
            }
            conn.execute_batch(sql)
                .map_err(|e| Error::MigrationFailed(format!("version {target}: {e}")))?;
            conn.execute(
                "INSERT INTO _migrations (version, applied_at) VALUES (?1, ?2)",
                params![target, chrono::Utc::now().to_rfc3339()],
            )?;
            tracing::debug!(version = target, "applied migration");
            version = *target;
        }

        Ok(version)
    })
    .await
    .map_err(Error::from)
}
