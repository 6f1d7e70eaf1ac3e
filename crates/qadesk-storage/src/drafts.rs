// SPDX-FileCopyrightText: 2026 Qadesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Offline drafts and generated-report history.
//!
//! Both collections live in memory and are written back to the record store
//! as whole JSON arrays after every mutation. The in-memory copy only changes
//! once the write succeeded. A record that is missing or fails to parse is
//! treated as an empty collection; single unreadable entries are skipped.

use std::sync::Arc;

use chrono::Utc;
use qadesk_core::{Action, ChatMessage, LocalDraft, Project, QadeskError, RecordStore, ReportData};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

/// Record holding the generated-report history.
pub const HISTORY_KEY: &str = "qa_chat_history";

/// Record holding drafts captured while offline.
pub const DRAFTS_KEY: &str = "qa_local_drafts";

/// Owner of drafts and message history.
pub struct DraftStore {
    records: Arc<dyn RecordStore>,
    drafts: Vec<LocalDraft>,
    history: Vec<ChatMessage>,
}

impl DraftStore {
    /// Loads both collections from `records`.
    ///
    /// Only a failing store read is an error; unreadable contents are not.
    pub async fn open(records: Arc<dyn RecordStore>) -> Result<Self, QadeskError> {
        let drafts: Vec<LocalDraft> = read_collection(records.as_ref(), DRAFTS_KEY).await?;
        let history: Vec<ChatMessage> = read_collection(records.as_ref(), HISTORY_KEY).await?;
        debug!(
            drafts = drafts.len(),
            messages = history.len(),
            "draft store loaded"
        );
        Ok(Self {
            records,
            drafts,
            history,
        })
    }

    /// Captures a submission made while offline, timestamped now.
    pub async fn save(
        &mut self,
        project: Project,
        action: Action,
        data: ReportData,
    ) -> Result<LocalDraft, QadeskError> {
        self.save_at(project, action, data, Utc::now().timestamp_millis())
            .await
    }

    /// Captures a submission with an explicit epoch-millis timestamp.
    ///
    /// The timestamp doubles as the draft id; a colliding id is bumped until
    /// it is unique.
    pub async fn save_at(
        &mut self,
        project: Project,
        action: Action,
        data: ReportData,
        timestamp: i64,
    ) -> Result<LocalDraft, QadeskError> {
        let mut stamp = timestamp;
        while self.drafts.iter().any(|d| d.id == stamp.to_string()) {
            stamp += 1;
        }

        let draft = LocalDraft {
            id: stamp.to_string(),
            project,
            action,
            data,
            timestamp: stamp,
        };
        let mut drafts = self.drafts.clone();
        drafts.push(draft.clone());
        self.commit_drafts(drafts).await?;
        info!(id = %draft.id, %project, %action, "draft saved");
        Ok(draft)
    }

    /// Drafts in creation order.
    pub fn list(&self) -> &[LocalDraft] {
        &self.drafts
    }

    /// Looks up a draft without consuming it.
    pub fn get(&self, id: &str) -> Option<&LocalDraft> {
        self.drafts.iter().find(|d| d.id == id)
    }

    /// Deletes a draft. Returns whether it existed.
    pub async fn remove(&mut self, id: &str) -> Result<bool, QadeskError> {
        let Some(index) = self.drafts.iter().position(|d| d.id == id) else {
            return Ok(false);
        };
        let mut drafts = self.drafts.clone();
        drafts.remove(index);
        self.commit_drafts(drafts).await?;
        debug!(id, "draft removed");
        Ok(true)
    }

    /// Takes a draft out of the store so it can be edited and resent.
    pub async fn load(&mut self, id: &str) -> Result<Option<LocalDraft>, QadeskError> {
        let Some(index) = self.drafts.iter().position(|d| d.id == id) else {
            return Ok(None);
        };
        let mut drafts = self.drafts.clone();
        let draft = drafts.remove(index);
        self.commit_drafts(drafts).await?;
        debug!(id, "draft loaded");
        Ok(Some(draft))
    }

    /// Message history in append order.
    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    /// Appends one message and persists the history.
    pub async fn append_message(&mut self, message: ChatMessage) -> Result<(), QadeskError> {
        let mut history = self.history.clone();
        history.push(message);
        write_collection(self.records.as_ref(), HISTORY_KEY, &history).await?;
        self.history = history;
        Ok(())
    }

    /// Drops every message.
    pub async fn clear_history(&mut self) -> Result<(), QadeskError> {
        self.records.remove(HISTORY_KEY).await?;
        self.history.clear();
        debug!("history cleared");
        Ok(())
    }

    async fn commit_drafts(&mut self, drafts: Vec<LocalDraft>) -> Result<(), QadeskError> {
        write_collection(self.records.as_ref(), DRAFTS_KEY, &drafts).await?;
        self.drafts = drafts;
        Ok(())
    }
}

async fn read_collection<T: DeserializeOwned>(
    records: &dyn RecordStore,
    key: &str,
) -> Result<Vec<T>, QadeskError> {
    let Some(raw) = records.read(key).await? else {
        return Ok(Vec::new());
    };
    let entries: Vec<serde_json::Value> = match serde_json::from_str(&raw) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(key, error = %e, "ignoring unreadable record");
            return Ok(Vec::new());
        }
    };

    let mut items = Vec::with_capacity(entries.len());
    for (index, entry) in entries.into_iter().enumerate() {
        match serde_json::from_value(entry) {
            Ok(item) => items.push(item),
            Err(e) => warn!(key, index, error = %e, "skipping unreadable entry"),
        }
    }
    Ok(items)
}

async fn write_collection<T: Serialize>(
    records: &dyn RecordStore,
    key: &str,
    items: &[T],
) -> Result<(), QadeskError> {
    let raw = serde_json::to_string(items).map_err(QadeskError::storage)?;
    records.write(key, raw).await
}
