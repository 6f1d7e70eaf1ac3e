// SPDX-FileCopyrightText: 2026 Qadesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup and migrations.
//!
//! All statements run on tokio-rusqlite's single background thread, which
//! serializes writes. Do not open a second connection for writes.

use std::path::Path;
use std::time::Duration;

use qadesk_core::QadeskError;
use tokio_rusqlite::Connection;
use tracing::debug;

use crate::migrations;

/// Handle to the qadesk SQLite database.
#[derive(Clone)]
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens (or creates) the database at `path`, enables WAL mode and runs
    /// pending migrations. Missing parent directories are created.
    pub async fn open(path: &str) -> Result<Self, QadeskError> {
        if let Some(parent) = Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(QadeskError::storage)?;
        }

        let conn = Connection::open(path).await.map_err(QadeskError::storage)?;
        let db = Self { conn };
        db.prepare(true).await?;
        debug!(path, "database opened");
        Ok(db)
    }

    /// Opens a private in-memory database with the schema applied.
    pub async fn open_in_memory() -> Result<Self, QadeskError> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(QadeskError::storage)?;
        let db = Self { conn };
        db.prepare(false).await?;
        Ok(db)
    }

    /// The underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    async fn prepare(&self, wal: bool) -> Result<(), QadeskError> {
        self.conn
            .call(move |conn| -> Result<(), rusqlite::Error> {
                if wal {
                    let mode: String = conn.pragma_update_and_check(
                        None,
                        "journal_mode",
                        "WAL",
                        |row| row.get(0),
                    )?;
                    debug!(mode, "journal mode set");
                    conn.pragma_update(None, "synchronous", "NORMAL")?;
                }
                conn.busy_timeout(Duration::from_secs(5))?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;

        self.conn
            .call(|conn| -> Result<(), refinery::Error> { migrations::run_migrations(conn) })
            .await
            .map_err(map_tr_err)
    }

    /// Checkpoints the WAL so the main database file is self-contained.
    pub async fn checkpoint(&self) -> Result<(), QadeskError> {
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.query_row("PRAGMA wal_checkpoint(TRUNCATE)", [], |_| Ok(()))
            })
            .await
            .map_err(map_tr_err)
    }
}

/// Converts a tokio-rusqlite error into [`QadeskError::Storage`].
pub(crate) fn map_tr_err<E: std::fmt::Display>(err: tokio_rusqlite::Error<E>) -> QadeskError {
    QadeskError::Storage {
        source: err.to_string().into(),
    }
}
