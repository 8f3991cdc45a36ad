//! SQLite-backed key/value store with per-entry expiry.
//!
//! Expiry is enforced on read: an expired row is treated as absent and
//! deleted lazily, so no background sweeper is needed.

use crate::traits::KvStore;
use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// SQLite key/value backend.
pub struct SqliteStore {
    db_path: PathBuf,
}

impl SqliteStore {
    /// Create a new store at the given database path.
    ///
    /// Parent directories are created as needed and the schema is
    /// initialized on first use.
    pub fn new(db_path: &Path) -> anyhow::Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(db_path)?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                expires_at INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS kv_expires_at ON kv(expires_at);
            "#,
        )?;

        Ok(Self {
            db_path: db_path.to_path_buf(),
        })
    }

    fn now_secs() -> i64 {
        chrono::Utc::now().timestamp()
    }
}

#[async_trait]
impl KvStore for SqliteStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        let db_path = self.db_path.clone();
        let key = key.to_string();

        tokio::task::spawn_blocking(move || -> anyhow::Result<Option<String>> {
            let conn = Connection::open(&db_path)?;
            let mut stmt = conn.prepare("SELECT value, expires_at FROM kv WHERE key = ?1")?;
            let row: Option<(String, i64)> = stmt
                .query_row(params![key], |row| Ok((row.get(0)?, row.get(1)?)))
                .ok();

            match row {
                Some((value, expires_at)) if expires_at > Self::now_secs() => Ok(Some(value)),
                Some(_) => {
                    // Expired; purge lazily
                    conn.execute("DELETE FROM kv WHERE key = ?1", params![key])?;
                    Ok(None)
                }
                None => Ok(None),
            }
        })
        .await?
    }

    async fn put(&self, key: &str, value: &str, ttl: Duration) -> anyhow::Result<()> {
        let db_path = self.db_path.clone();
        let key = key.to_string();
        let value = value.to_string();
        let expires_at = Self::now_secs() + ttl.as_secs() as i64;

        tokio::task::spawn_blocking(move || -> anyhow::Result<()> {
            let conn = Connection::open(&db_path)?;
            conn.execute(
                "INSERT OR REPLACE INTO kv (key, value, expires_at) VALUES (?1, ?2, ?3)",
                params![key, value, expires_at],
            )?;
            Ok(())
        })
        .await?
    }

    async fn delete(&self, key: &str) -> anyhow::Result<()> {
        let db_path = self.db_path.clone();
        let key = key.to_string();

        tokio::task::spawn_blocking(move || -> anyhow::Result<()> {
            let conn = Connection::open(&db_path)?;
            conn.execute("DELETE FROM kv WHERE key = ?1", params![key])?;
            Ok(())
        })
        .await?
    }

    async fn list_keys(&self, prefix: &str) -> anyhow::Result<Vec<String>> {
        let db_path = self.db_path.clone();
        // LIKE wildcards in the prefix would widen the match; escape them
        let pattern = format!(
            "{}%",
            prefix.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
        );

        tokio::task::spawn_blocking(move || -> anyhow::Result<Vec<String>> {
            let conn = Connection::open(&db_path)?;
            let mut stmt = conn.prepare(
                "SELECT key FROM kv WHERE key LIKE ?1 ESCAPE '\\' AND expires_at > ?2 ORDER BY key",
            )?;
            let rows = stmt.query_map(params![pattern, Self::now_secs()], |row| row.get(0))?;
            Ok(rows.flatten().collect())
        })
        .await?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup() -> (TempDir, SqliteStore) {
        let tmp = TempDir::new().unwrap();
        let store = SqliteStore::new(&tmp.path().join("test.db")).unwrap();
        (tmp, store)
    }

    const TTL: Duration = Duration::from_secs(3600);

    #[tokio::test]
    async fn put_and_get() {
        let (_tmp, store) = setup();

        store.put("key1", "value1", TTL).await.unwrap();
        assert_eq!(store.get("key1").await.unwrap().as_deref(), Some("value1"));
    }

    #[tokio::test]
    async fn get_missing_returns_none() {
        let (_tmp, store) = setup();
        assert!(store.get("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn put_replaces_existing() {
        let (_tmp, store) = setup();

        store.put("key1", "original", TTL).await.unwrap();
        store.put("key1", "updated", TTL).await.unwrap();
        assert_eq!(store.get("key1").await.unwrap().as_deref(), Some("updated"));
    }

    #[tokio::test]
    async fn expired_entry_is_absent() {
        let (_tmp, store) = setup();

        store
            .put("key1", "value1", Duration::from_secs(0))
            .await
            .unwrap();
        assert!(store.get("key1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_removes_entry() {
        let (_tmp, store) = setup();

        store.put("key1", "value1", TTL).await.unwrap();
        store.delete("key1").await.unwrap();
        assert!(store.get("key1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_missing_is_ok() {
        let (_tmp, store) = setup();
        store.delete("nope").await.unwrap();
    }

    #[tokio::test]
    async fn list_keys_filters_by_prefix() {
        let (_tmp, store) = setup();

        store.put("conversation:a", "[]", TTL).await.unwrap();
        store.put("conversation:b", "[]", TTL).await.unwrap();
        store.put("other:c", "[]", TTL).await.unwrap();

        let keys = store.list_keys("conversation:").await.unwrap();
        assert_eq!(keys, vec!["conversation:a", "conversation:b"]);
    }

    #[tokio::test]
    async fn list_keys_skips_expired() {
        let (_tmp, store) = setup();

        store.put("conversation:live", "[]", TTL).await.unwrap();
        store
            .put("conversation:dead", "[]", Duration::from_secs(0))
            .await
            .unwrap();

        let keys = store.list_keys("conversation:").await.unwrap();
        assert_eq!(keys, vec!["conversation:live"]);
    }

    #[tokio::test]
    async fn name_returns_sqlite() {
        let (_tmp, store) = setup();
        assert_eq!(store.name(), "sqlite");
    }
}
