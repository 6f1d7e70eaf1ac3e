// SPDX-FileCopyrightText: 2026 Qadesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Durable storage for qadesk.
//!
//! A small named-record store (SQLite through tokio-rusqlite, or in memory)
//! underneath the [`DraftStore`], which owns offline drafts and the
//! generated-report history.

pub mod database;
pub mod drafts;
pub mod memory;
pub mod migrations;
pub mod sqlite;

pub use database::Database;
pub use drafts::{DRAFTS_KEY, DraftStore, HISTORY_KEY};
pub use memory::MemoryRecordStore;
pub use sqlite::SqliteRecordStore;
