//! SQLite key/value layer for the local item snapshot
//!
//! A single `kv_store` table, one row per key. The item snapshot lives under
//! `SNAPSHOT_KEY` as a JSON array of records. Uses r2d2 connection pooling so
//! reads never wait on a mutex.

use chrono::Utc;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, OptionalExtension};
use std::path::Path;
use thiserror::Error;

use crate::interface::{ItemCache, QuickClipError};
use crate::models::ItemRecord;

/// Fixed key the item snapshot is stored under
pub const SNAPSHOT_KEY: &str = "quick-clipboard.items";

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Connection pool error: {0}")]
    Pool(#[from] r2d2::Error),
}

pub type DatabaseResult<T> = Result<T, DatabaseError>;

/// Thread-safe key/value store using connection pooling
pub struct Database {
    pool: Pool<SqliteConnectionManager>,
}

impl Database {
    /// Open or create a database at the given path. Missing parent
    /// directories are created.
    pub fn open<P: AsRef<Path>>(path: P) -> DatabaseResult<Self> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let manager = SqliteConnectionManager::file(path)
            .with_init(|conn| {
                conn.execute_batch("
                    PRAGMA journal_mode=WAL;
                    PRAGMA synchronous=NORMAL;
                ")?;
                Ok(())
            });

        let pool = Pool::builder()
            .max_size(4)
            .build(manager)?;

        let db = Self { pool };
        db.setup_schema()?;
        Ok(db)
    }

    /// Open an in-memory database (tests and throwaway sessions)
    pub fn open_in_memory() -> DatabaseResult<Self> {
        let manager = SqliteConnectionManager::memory();

        // In-memory needs single connection to maintain state
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)?;

        let db = Self { pool };
        db.setup_schema()?;
        Ok(db)
    }

    fn get_conn(&self) -> DatabaseResult<PooledConnection<SqliteConnectionManager>> {
        Ok(self.pool.get()?)
    }

    fn setup_schema(&self) -> DatabaseResult<()> {
        let conn = self.get_conn()?;
        conn.execute_batch(r#"
            CREATE TABLE IF NOT EXISTS kv_store (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updatedAt TEXT NOT NULL
            );
        "#)?;
        Ok(())
    }

    pub fn read_value(&self, key: &str) -> DatabaseResult<Option<String>> {
        let conn = self.get_conn()?;
        let value = conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    /// Insert or overwrite a value
    pub fn write_value(&self, key: &str, value: &str) -> DatabaseResult<()> {
        let conn = self.get_conn()?;
        let now = Utc::now().format("%Y-%m-%d %H:%M:%S%.f").to_string();
        conn.execute(
            "INSERT INTO kv_store (key, value, updatedAt) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updatedAt = excluded.updatedAt",
            params![key, value, now],
        )?;
        Ok(())
    }

    /// Returns whether a row was removed
    pub fn delete_value(&self, key: &str) -> DatabaseResult<bool> {
        let conn = self.get_conn()?;
        let removed = conn.execute("DELETE FROM kv_store WHERE key = ?1", params![key])?;
        Ok(removed > 0)
    }
}

impl ItemCache for Database {
    fn load_items(&self) -> Result<Option<Vec<ItemRecord>>, QuickClipError> {
        match self.read_value(SNAPSHOT_KEY)? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    fn save_items(&self, items: &[ItemRecord]) -> Result<(), QuickClipError> {
        let json = serde_json::to_string(items)?;
        self.write_value(SNAPSHOT_KEY, &json)?;
        log::debug!("Saved snapshot of {} items", items.len());
        Ok(())
    }

    fn clear_items(&self) -> Result<bool, QuickClipError> {
        Ok(self.delete_value(SNAPSHOT_KEY)?)
    }
}
