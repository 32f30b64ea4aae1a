//! Database connection pool

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use tracing::info;

use crate::Result;

/// How long a writer waits for the database lock before failing with `SQLITE_BUSY`.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Database connection pool wrapper
#[derive(Debug, Clone)]
pub struct DbPool(SqlitePool);

impl DbPool {
    /// Connect to the database at `url`, creating the file if it does not exist.
    ///
    /// File databases run in WAL mode; writers wait up to [`BUSY_TIMEOUT`]
    /// for the lock.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        info!(url, max_connections, "connecting to database");

        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(BUSY_TIMEOUT);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect_with(options)
            .await?;

        Ok(Self(pool))
    }

    /// Create an in-memory database for testing.
    ///
    /// Every SQLite `:memory:` connection is its own database, so the pool is
    /// pinned to a single connection that never expires.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;

        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        Ok(Self(pool))
    }

    /// Get the inner pool
    pub fn inner(&self) -> &SqlitePool {
        &self.0
    }

    /// Close the pool
    pub async fn close(&self) {
        self.0.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_connection() {
        let pool = DbPool::in_memory().await.unwrap();
        assert!(!pool.inner().is_closed());
    }

    #[tokio::test]
    async fn test_file_connection_creates_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("books.db");
        let url = format!("sqlite://{}", path.display());

        let pool = DbPool::connect(&url, 2).await.unwrap();
        sqlx::query("SELECT 1").execute(pool.inner()).await.unwrap();
        pool.close().await;

        assert!(path.exists());
    }
}
