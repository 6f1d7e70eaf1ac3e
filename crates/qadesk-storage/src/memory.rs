// SPDX-FileCopyrightText: 2026 Qadesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory [`RecordStore`] for tests and `--ephemeral` sessions.

use std::collections::HashMap;

use async_trait::async_trait;
use qadesk_core::{QadeskError, RecordStore};
use tokio::sync::Mutex;

/// Record store that keeps everything in a process-local map.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    records: Mutex<HashMap<String, String>>,
    writes: Mutex<usize>,
}

impl MemoryRecordStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-seeded with raw records.
    pub fn with_records<I, K, V>(records: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            records: Mutex::new(
                records
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
            writes: Mutex::new(0),
        }
    }

    /// Raw value of a record, bypassing the trait.
    pub async fn raw(&self, key: &str) -> Option<String> {
        self.records.lock().await.get(key).cloned()
    }

    /// Number of successful writes so far.
    pub async fn write_count(&self) -> usize {
        *self.writes.lock().await
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn read(&self, key: &str) -> Result<Option<String>, QadeskError> {
        Ok(self.records.lock().await.get(key).cloned())
    }

    async fn write(&self, key: &str, value: String) -> Result<(), QadeskError> {
        self.records.lock().await.insert(key.to_string(), value);
        *self.writes.lock().await += 1;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), QadeskError> {
        self.records.lock().await.remove(key);
        Ok(())
    }
}
