//! Revocation Store
//! Mission: Remember logged-out tokens until they would have expired anyway
//!
//! SQLite has no TTL index, so expiry is enforced by `spawn_revocation_sweeper`,
//! which purges records on a fixed interval.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use rusqlite::{params, Connection, OptionalExtension};
use std::{collections::HashMap, sync::Arc, time::Duration};
use tokio::{sync::Mutex, task::JoinHandle, time::interval};
use tracing::{debug, info, warn};

/// Deny-list of tokens invalidated before natural expiry
#[async_trait]
pub trait RevocationStore: Send + Sync {
    /// Record `token` as revoked. Inserting the same token twice is a no-op.
    async fn insert(&self, token: &str, expires_at: i64) -> Result<()>;

    /// Whether `token` has been revoked and not yet purged
    async fn exists(&self, token: &str) -> Result<bool>;

    /// Drop records older than the retention window or strictly past their
    /// expiry. A token is still valid in its `exp` second, so its record is too.
    /// Returns the number of records removed.
    async fn purge_expired(&self, now: i64) -> Result<usize>;
}

/// SQLite-backed revocation list sharing the application database
#[derive(Clone)]
pub struct SqliteRevocationStore {
    conn: Arc<Mutex<Connection>>,
    retention_secs: i64,
}

impl SqliteRevocationStore {
    pub fn new(db_path: &str, retention_secs: i64) -> Result<Self> {
        let conn = Connection::open(db_path).context("open revocation db")?;
        conn.pragma_update(None, "journal_mode", "WAL").ok();
        conn.pragma_update(None, "synchronous", "NORMAL").ok();

        conn.execute(
            "CREATE TABLE IF NOT EXISTS revoked_tokens (
                token TEXT PRIMARY KEY,
                created_at INTEGER NOT NULL,
                expires_at INTEGER NOT NULL
            )",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_revoked_tokens_created_at ON revoked_tokens(created_at)",
            [],
        )?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            retention_secs,
        })
    }

    pub async fn len(&self) -> Result<usize> {
        let conn = self.conn.lock().await;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM revoked_tokens", [], |row| {
            row.get(0)
        })?;
        Ok(count as usize)
    }

    /// Backdate a record; lets tests exercise the retention window.
    #[cfg(test)]
    async fn set_created_at(&self, token: &str, created_at: i64) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute(
            "UPDATE revoked_tokens SET created_at = ?1 WHERE token = ?2",
            params![created_at, token],
        )?;
        Ok(())
    }
}

#[async_trait]
impl RevocationStore for SqliteRevocationStore {
    async fn insert(&self, token: &str, expires_at: i64) -> Result<()> {
        let conn = self.conn.lock().await;
        let inserted = conn
            .execute(
                "INSERT OR IGNORE INTO revoked_tokens (token, created_at, expires_at)
                 VALUES (?1, ?2, ?3)",
                params![token, Utc::now().timestamp(), expires_at],
            )
            .context("Failed to insert revoked token")?;

        if inserted == 0 {
            debug!("Token already revoked");
        }
        Ok(())
    }

    async fn exists(&self, token: &str) -> Result<bool> {
        let conn = self.conn.lock().await;
        let found: Option<i64> = conn
            .query_row(
                "SELECT 1 FROM revoked_tokens WHERE token = ?1",
                params![token],
                |row| row.get(0),
            )
            .optional()
            .context("Failed to query revoked tokens")?;
        Ok(found.is_some())
    }

    async fn purge_expired(&self, now: i64) -> Result<usize> {
        let cutoff = now - self.retention_secs;
        let conn = self.conn.lock().await;
        let deleted = conn
            .execute(
                "DELETE FROM revoked_tokens WHERE created_at < ?1 OR expires_at < ?2",
                params![cutoff, now],
            )
            .context("Failed to purge revoked tokens")?;
        Ok(deleted)
    }
}

#[derive(Debug, Clone, Copy)]
struct MemoryRecord {
    created_at: i64,
    expires_at: i64,
}

/// Process-local revocation list; contents are lost on restart
pub struct MemoryRevocationStore {
    records: RwLock<HashMap<String, MemoryRecord>>,
    retention_secs: i64,
}

impl MemoryRevocationStore {
    pub fn new(retention_secs: i64) -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            retention_secs,
        }
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    /// Insert with an explicit creation time (tests and replays)
    pub fn insert_at(&self, token: &str, created_at: i64, expires_at: i64) {
        self.records
            .write()
            .entry(token.to_string())
            .or_insert(MemoryRecord {
                created_at,
                expires_at,
            });
    }
}

#[async_trait]
impl RevocationStore for MemoryRevocationStore {
    async fn insert(&self, token: &str, expires_at: i64) -> Result<()> {
        self.insert_at(token, Utc::now().timestamp(), expires_at);
        Ok(())
    }

    async fn exists(&self, token: &str) -> Result<bool> {
        Ok(self.records.read().contains_key(token))
    }

    async fn purge_expired(&self, now: i64) -> Result<usize> {
        let cutoff = now - self.retention_secs;
        let mut records = self.records.write();
        let before = records.len();
        records.retain(|_, r| r.created_at >= cutoff && r.expires_at >= now);
        Ok(before - records.len())
    }
}

/// Periodically purge expired revocation records.
pub fn spawn_revocation_sweeper(
    store: Arc<dyn RevocationStore>,
    every: Duration,
) -> JoinHandle<()> {
    info!(
        "🧹 Revocation sweeper running every {}s",
        every.as_secs().max(1)
    );

    tokio::spawn(async move {
        let mut ticker = interval(every);
        loop {
            ticker.tick().await;
            match store.purge_expired(Utc::now().timestamp()).await {
                Ok(0) => {}
                Ok(deleted) => info!("🧹 Purged {} expired revoked tokens", deleted),
                Err(e) => warn!("revocation purge failed: {:#}", e),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    const RETENTION: i64 = 3600;

    fn create_test_store() -> (SqliteRevocationStore, NamedTempFile) {
        let temp_file = NamedTempFile::new().unwrap();
        let store = SqliteRevocationStore::new(temp_file.path().to_str().unwrap(), RETENTION)
            .unwrap();
        (store, temp_file)
    }

    #[tokio::test]
    async fn test_sqlite_insert_and_exists() {
        let (store, _temp) = create_test_store();
        let exp = Utc::now().timestamp() + RETENTION;

        assert!(!store.exists("tok-a").await.unwrap());
        store.insert("tok-a", exp).await.unwrap();
        assert!(store.exists("tok-a").await.unwrap());
        assert!(!store.exists("tok-b").await.unwrap());
    }

    #[tokio::test]
    async fn test_sqlite_insert_is_idempotent() {
        let (store, _temp) = create_test_store();
        let exp = Utc::now().timestamp() + RETENTION;

        store.insert("tok-a", exp).await.unwrap();
        store.insert("tok-a", exp).await.unwrap();
        assert_eq!(store.len().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_sqlite_purge_by_age_and_expiry() {
        let (store, _temp) = create_test_store();
        let now = Utc::now().timestamp();

        store.insert("fresh", now + RETENTION).await.unwrap();
        store.insert("old", now + RETENTION).await.unwrap();
        store.insert("expired", now - 1).await.unwrap();
        store.set_created_at("old", now - RETENTION - 1).await.unwrap();

        let deleted = store.purge_expired(now).await.unwrap();
        assert_eq!(deleted, 2);
        assert!(store.exists("fresh").await.unwrap());
        assert!(!store.exists("old").await.unwrap());
        assert!(!store.exists("expired").await.unwrap());
    }

    #[tokio::test]
    async fn test_sqlite_purge_keeps_record_through_exp_second() {
        let (store, _temp) = create_test_store();
        let now = Utc::now().timestamp();

        store.insert("edge", now).await.unwrap();
        assert_eq!(store.purge_expired(now).await.unwrap(), 0);
        assert!(store.exists("edge").await.unwrap());

        assert_eq!(store.purge_expired(now + 1).await.unwrap(), 1);
        assert!(!store.exists("edge").await.unwrap());
    }

    #[tokio::test]
    async fn test_memory_purge_boundaries() {
        let store = MemoryRevocationStore::new(RETENTION);
        let now = Utc::now().timestamp();

        store.insert_at("at-exp", now - 10, now);
        store.insert_at("at-cutoff", now - RETENTION, now + 10);
        assert_eq!(store.purge_expired(now).await.unwrap(), 0);

        assert_eq!(store.purge_expired(now + 1).await.unwrap(), 2);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_sqlite_store_survives_reopen() {
        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path().to_str().unwrap();
        let exp = Utc::now().timestamp() + RETENTION;

        {
            let store = SqliteRevocationStore::new(path, RETENTION).unwrap();
            store.insert("persisted", exp).await.unwrap();
        }

        let reopened = SqliteRevocationStore::new(path, RETENTION).unwrap();
        assert!(reopened.exists("persisted").await.unwrap());
    }

    #[tokio::test]
    async fn test_memory_store_behaviour() {
        let store = MemoryRevocationStore::new(RETENTION);
        let now = Utc::now().timestamp();

        store.insert("a", now + RETENTION).await.unwrap();
        store.insert("a", now + RETENTION).await.unwrap();
        assert_eq!(store.len(), 1);
        assert!(store.exists("a").await.unwrap());

        store.insert_at("stale", now - RETENTION - 5, now + 10);
        assert_eq!(store.purge_expired(now).await.unwrap(), 1);
        assert!(store.exists("a").await.unwrap());
        assert!(!store.exists("stale").await.unwrap());
    }

    #[tokio::test]
    async fn test_concurrent_inserts() {
        let store = Arc::new(MemoryRevocationStore::new(RETENTION));
        let exp = Utc::now().timestamp() + RETENTION;

        let handles: Vec<_> = (0..32)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    store.insert(&format!("tok-{}", i % 8), exp).await.unwrap();
                })
            })
            .collect();
        for h in handles {
            h.await.unwrap();
        }

        assert_eq!(store.len(), 8);
    }

    #[tokio::test]
    async fn test_sweeper_purges_on_tick() {
        let store = Arc::new(MemoryRevocationStore::new(RETENTION));
        let now = Utc::now().timestamp();
        store.insert_at("stale", now - RETENTION - 5, now + 10);

        let handle = spawn_revocation_sweeper(store.clone(), Duration::from_secs(60));
        // First tick fires immediately
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(store.is_empty());
        handle.abort();
    }
}
