// SPDX-FileCopyrightText: 2026 Qadesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of [`RecordStore`].

use async_trait::async_trait;
use qadesk_core::{QadeskError, RecordStore};
use rusqlite::{params, OptionalExtension};
use tracing::trace;

use crate::database::{map_tr_err, Database};

/// Record store backed by the `records` table.
#[derive(Clone)]
pub struct SqliteRecordStore {
    db: Database,
}

impl SqliteRecordStore {
    /// Wraps an opened database.
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Opens the database at `path` and wraps it.
    pub async fn open(path: &str) -> Result<Self, QadeskError> {
        Ok(Self::new(Database::open(path).await?))
    }

    /// The wrapped database handle.
    pub fn database(&self) -> &Database {
        &self.db
    }
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    async fn read(&self, key: &str) -> Result<Option<String>, QadeskError> {
        let key = key.to_string();
        self.db
            .connection()
            .call(move |conn| -> Result<Option<String>, rusqlite::Error> {
                conn.query_row(
                    "SELECT value FROM records WHERE key = ?1",
                    params![key],
                    |row| row.get(0),
                )
                .optional()
            })
            .await
            .map_err(map_tr_err)
    }

    async fn write(&self, key: &str, value: String) -> Result<(), QadeskError> {
        let key = key.to_string();
        let now = chrono::Utc::now().to_rfc3339();
        trace!(key, bytes = value.len(), "writing record");
        self.db
            .connection()
            .call(move |conn| -> Result<(), rusqlite::Error> {
                conn.execute(
                    "INSERT INTO records (key, value, updated_at) VALUES (?1, ?2, ?3)
                     ON CONFLICT(key) DO UPDATE SET value = excluded.value,
                                                    updated_at = excluded.updated_at",
                    params![key, value, now],
                )?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }

    async fn remove(&self, key: &str) -> Result<(), QadeskError> {
        let key = key.to_string();
        self.db
            .connection()
            .call(move |conn| -> Result<(), rusqlite::Error> {
                conn.execute("DELETE FROM records WHERE key = ?1", params![key])?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn missing_key_reads_none() {
        let store = SqliteRecordStore::new(Database::open_in_memory().await.unwrap());
        assert_eq!(store.read("qa_local_drafts").await.unwrap(), None);
    }

    #[tokio::test]
    async fn write_overwrites_whole_record() {
        let store = SqliteRecordStore::new(Database::open_in_memory().await.unwrap());
        store.write("k", "[1]".to_string()).await.unwrap();
        store.write("k", "[1,2]".to_string()).await.unwrap();
        assert_eq!(store.read("k").await.unwrap().as_deref(), Some("[1,2]"));

        store.remove("k").await.unwrap();
        store.remove("k").await.unwrap();
        assert_eq!(store.read("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn records_survive_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("qadesk.db");
        let path = path.to_str().unwrap();

        {
            let store = SqliteRecordStore::open(path).await.unwrap();
            store.write("qa_chat_history", "[]".to_string()).await.unwrap();
            store.database().checkpoint().await.unwrap();
        }

        let store = SqliteRecordStore::open(path).await.unwrap();
        assert_eq!(
            store.read("qa_chat_history").await.unwrap().as_deref(),
            Some("[]")
        );
    }
}
