// SPDX-FileCopyrightText: 2026 Qadesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Named-record persistence trait.

use async_trait::async_trait;

use crate::error::QadeskError;

/// Durable key/value storage holding whole serialized collections.
///
/// Records are always read and written in full; there are no partial
/// updates.
#[async_trait]
pub trait RecordStore: Send + Sync + 'static {
    /// Reads the record stored under `key`, or `None` if absent.
    async fn read(&self, key: &str) -> Result<Option<String>, QadeskError>;

    /// Replaces the record stored under `key`.
    async fn write(&self, key: &str, value: String) -> Result<(), QadeskError>;

    /// Deletes the record stored under `key`. Missing keys are not an error.
    async fn remove(&self, key: &str) -> Result<(), QadeskError>;
}
