//! Embedded key-value store
//!
//! A small ordered key-value API on top of a SQLite file in WAL mode.
//! The handle is constructed once at startup and passed to every
//! component that needs persistence.

use crate::config::StoreConfig;
use crate::error::{AppError, AppResult};
use crate::metrics::MetricsState;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Type alias for the SQLite connection pool
pub type DbPool = Pool<Sqlite>;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS kv (
    key TEXT PRIMARY KEY NOT NULL,
    value BLOB NOT NULL
)
"#;

/// Handle to the key-value store
#[derive(Clone)]
pub struct Store {
    pool: DbPool,
    metrics: Option<Arc<MetricsState>>,
}

impl Store {
    /// Open (creating if needed) the store described by `config`
    pub async fn open(config: &StoreConfig) -> AppResult<Self> {
        if let Some(parent) = config.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    AppError::Internal(format!("Failed to create store directory: {}", e))
                })?;
                info!("Created store directory: {:?}", parent);
            }
        }

        let db_url = format!("sqlite:{}?mode=rwc", config.path.display());

        let connect_options = SqliteConnectOptions::from_str(&db_url)?
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5))
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(30))
            .connect_with(connect_options)
            .await?;

        sqlx::query(SCHEMA).execute(&pool).await?;

        info!(
            "Store opened: {:?} (max {} connections)",
            config.path, config.max_connections
        );

        Ok(Self {
            pool,
            metrics: None,
        })
    }

    /// Open an existing store without writing to it
    ///
    /// The journal mode is left as found and no schema is created, so a
    /// missing file or table is an error.
    pub async fn open_read_only(path: &Path) -> AppResult<Self> {
        let connect_options = SqliteConnectOptions::new()
            .filename(path)
            .read_only(true)
            .create_if_missing(false)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(connect_options)
            .await?;

        info!("Store opened read-only: {:?}", path);

        Ok(Self {
            pool,
            metrics: None,
        })
    }

    /// Record operation counters into `metrics`
    pub fn with_metrics(mut self, metrics: Arc<MetricsState>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    fn record<T>(&self, operation: &str, result: &Result<T, sqlx::Error>) {
        if let Some(metrics) = &self.metrics {
            let status = if result.is_ok() { "success" } else { "error" };
            metrics
                .store_operations
                .with_label_values(&[operation, status])
                .inc();
        }
    }

    /// Insert or replace a value
    pub async fn put(&self, key: &str, value: &[u8]) -> AppResult<()> {
        let result = sqlx::query(
            "INSERT INTO kv (key, value) VALUES (?, ?) \
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await;
        self.record("put", &result);
        result?;
        Ok(())
    }

    /// Fetch a value, `None` when the key is absent
    pub async fn get(&self, key: &str) -> AppResult<Option<Vec<u8>>> {
        let result = sqlx::query_scalar::<_, Vec<u8>>("SELECT value FROM kv WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await;
        self.record("get", &result);
        Ok(result?)
    }

    pub async fn has(&self, key: &str) -> AppResult<bool> {
        let result = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM kv WHERE key = ?")
            .bind(key)
            .fetch_one(&self.pool)
            .await;
        self.record("has", &result);
        Ok(result? > 0)
    }

    /// Delete a key. Deleting a missing key is not an error.
    pub async fn delete(&self, key: &str) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM kv WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await;
        self.record("delete", &result);
        result?;
        Ok(())
    }

    /// All entries whose key starts with `prefix`, in key order
    pub async fn scan_prefix(&self, prefix: &str) -> AppResult<Vec<(String, Vec<u8>)>> {
        let result = sqlx::query_as::<_, (String, Vec<u8>)>(
            "SELECT key, value FROM kv WHERE substr(key, 1, ?) = ? ORDER BY key",
        )
        .bind(prefix.chars().count() as i64)
        .bind(prefix)
        .fetch_all(&self.pool)
        .await;
        self.record("scan", &result);
        Ok(result?)
    }

    /// Every entry in key order
    pub async fn scan_all(&self) -> AppResult<Vec<(String, Vec<u8>)>> {
        self.scan_prefix("").await
    }

    pub async fn len(&self) -> AppResult<usize> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM kv")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as usize)
    }

    pub async fn is_empty(&self) -> AppResult<bool> {
        Ok(self.len().await? == 0)
    }

    /// Serialize `value` as JSON and store it under `key`
    pub async fn put_json<T: Serialize>(&self, key: &str, value: &T) -> AppResult<()> {
        let bytes = serde_json::to_vec(value)?;
        self.put(key, &bytes).await
    }

    /// Load and deserialize a JSON value
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> AppResult<Option<T>> {
        match self.get(key).await? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Close the underlying pool
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
