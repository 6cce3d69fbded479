//! Key-value snapshot backends.
//!
//! A snapshot is the whole serialized collection. Backends only ever see
//! opaque keys and blobs; every save replaces the previous value.

use std::{
    collections::HashMap,
    io,
    path::{Path, PathBuf},
    sync::Mutex,
};

use async_trait::async_trait;
use derive_more::{Display, Error, From};
use log::{debug, info};
use sqlx::{postgres::PgPoolOptions, PgPool, Row};

#[derive(Debug, Display, Error, From)]
pub enum StorageError {
    #[display(fmt = "io error: {}", _0)]
    Io(io::Error),

    #[display(fmt = "database error: {}", _0)]
    Database(sqlx::Error),

    #[display(fmt = "malformed snapshot under '{}': {}", key, source)]
    #[from(ignore)]
    Malformed {
        key: String,
        source: serde_json::Error,
    },

    #[display(fmt = "storage lock poisoned")]
    #[from(ignore)]
    Poisoned,
}

#[async_trait]
pub trait SnapshotStorage: Send + Sync {
    /// Returns `None` when nothing was ever saved under `key`.
    async fn load(&self, key: &str) -> Result<Option<String>, StorageError>;

    async fn save(&self, key: &str, blob: &str) -> Result<(), StorageError>;
}

#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SnapshotStorage for MemoryStorage {
    async fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    async fn save(&self, key: &str, blob: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        entries.insert(key.to_string(), blob.to_string());
        Ok(())
    }
}

/// One `<key>.json` file per collection inside `dir`.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub async fn open(dir: impl AsRef<Path>) -> Result<Self, StorageError> {
        let dir = dir.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&dir).await?;
        info!("file snapshots in {}", dir.display());
        Ok(FileStorage { dir })
    }

    /// Keys are `<namespace>:<collection>` with both parts limited to
    /// ASCII alphanumerics and `-`, so mapping `:` to `_` stays unique.
    fn path_for(&self, key: &str) -> PathBuf {
        let file_name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
            .collect();
        self.dir.join(format!("{file_name}.json"))
    }
}

#[async_trait]
impl SnapshotStorage for FileStorage {
    async fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        match tokio::fs::read_to_string(self.path_for(key)).await {
            Ok(blob) => Ok(Some(blob)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn save(&self, key: &str, blob: &str) -> Result<(), StorageError> {
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, blob).await?;
        tokio::fs::rename(&tmp, &path).await?;
        debug!("wrote snapshot {}", path.display());
        Ok(())
    }
}

/// Snapshots kept in a single `condo_snapshots` table.
#[derive(Debug, Clone)]
pub struct PgStorage {
    pool: PgPool,
}

impl PgStorage {
    pub async fn connect(db_url: &str) -> Result<Self, StorageError> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(db_url)
            .await?;
        info!("connected to postgresql");
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS condo_snapshots (
                key TEXT PRIMARY KEY,
                body TEXT NOT NULL
            )",
        )
        .execute(&pool)
        .await?;
        Ok(PgStorage { pool })
    }
}

#[async_trait]
impl SnapshotStorage for PgStorage {
    async fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        let row = sqlx::query("SELECT body FROM condo_snapshots WHERE key = $1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        match row {
            Some(row) => Ok(Some(row.try_get("body")?)),
            None => Ok(None),
        }
    }

    async fn save(&self, key: &str, blob: &str) -> Result<(), StorageError> {
        sqlx::query(
            "INSERT INTO condo_snapshots (key, body) VALUES ($1, $2)
            ON CONFLICT (key) DO UPDATE SET body = EXCLUDED.body",
        )
        .bind(key)
        .bind(blob)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_storage_returns_last_save() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.load("condo:events").await.unwrap(), None);
        storage.save("condo:events", "[1]").await.unwrap();
        storage.save("condo:events", "[2]").await.unwrap();
        assert_eq!(
            storage.load("condo:events").await.unwrap().as_deref(),
            Some("[2]")
        );
    }

    #[tokio::test]
    async fn file_storage_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(dir.path()).await.unwrap();
        storage.save("condo:bills", "[]").await.unwrap();
        assert!(dir.path().join("condo_bills.json").exists());

        let reopened = FileStorage::open(dir.path()).await.unwrap();
        assert_eq!(
            reopened.load("condo:bills").await.unwrap().as_deref(),
            Some("[]")
        );
        assert_eq!(reopened.load("condo:polls").await.unwrap(), None);
    }
}
