// SPDX-FileCopyrightText: 2026 Qadesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wiring shared by the subcommands.

use std::sync::Arc;

use qadesk_config::QadeskConfig;
use qadesk_core::{QadeskError, RecordStore};
use qadesk_flow::{ConnectivityMonitor, FlowController};
use qadesk_gemini::GeminiGenerator;
use qadesk_storage::{DraftStore, MemoryRecordStore, SqliteRecordStore};
use tracing::{debug, info};

/// Flags that change how the app is assembled.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Keep records in memory only.
    pub ephemeral: bool,
    /// Start offline with the probe disabled.
    pub offline: bool,
}

/// Opens the record store selected by the options.
pub async fn open_records(
    config: &QadeskConfig,
    options: RunOptions,
) -> Result<Arc<dyn RecordStore>, QadeskError> {
    if options.ephemeral {
        debug!("using in-memory record store");
        return Ok(Arc::new(MemoryRecordStore::new()));
    }
    let store = SqliteRecordStore::open(&config.storage.database_path).await?;
    info!(path = %config.storage.database_path, "record store opened");
    Ok(Arc::new(store))
}

/// Loads drafts and history from the configured store.
pub async fn open_drafts(
    config: &QadeskConfig,
    options: RunOptions,
) -> Result<DraftStore, QadeskError> {
    DraftStore::open(open_records(config, options).await?).await
}

/// Assembles the flow controller with the Gemini generator.
pub async fn build_flow(
    config: &QadeskConfig,
    options: RunOptions,
    connectivity: ConnectivityMonitor,
) -> Result<FlowController, QadeskError> {
    let generator = GeminiGenerator::new(&config.generator)?;
    let drafts = open_drafts(config, options).await?;
    Ok(FlowController::new(
        Arc::new(config.catalog.clone()),
        drafts,
        Arc::new(generator),
        connectivity,
    ))
}
