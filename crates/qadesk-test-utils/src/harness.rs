// SPDX-FileCopyrightText: 2026 Qadesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end flow tests.
//!
//! `TestHarness` wires a [`FlowController`] to a [`MockGenerator`], a manual
//! connectivity monitor and either an in-memory or a temp-file SQLite record
//! store.

use std::sync::Arc;

use qadesk_core::{Action, Catalog, Project, QadeskError, RecordStore};
use qadesk_flow::{ConnectivityMonitor, FlowController, FormState};
use qadesk_storage::{DraftStore, MemoryRecordStore, SqliteRecordStore};

use crate::mock_generator::{MockGenerator, MockReply};

/// Builder for [`TestHarness`].
pub struct TestHarnessBuilder {
    replies: Vec<MockReply>,
    online: bool,
    sqlite: bool,
    catalog: Catalog,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            replies: Vec::new(),
            online: true,
            sqlite: false,
            catalog: Catalog::builtin(),
        }
    }

    /// Queue generator replies.
    pub fn with_replies(mut self, replies: Vec<MockReply>) -> Self {
        self.replies = replies;
        self
    }

    /// Start disconnected.
    pub fn offline(mut self) -> Self {
        self.online = false;
        self
    }

    /// Persist records in a temporary SQLite file instead of memory.
    pub fn with_sqlite(mut self) -> Self {
        self.sqlite = true;
        self
    }

    pub fn with_catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub async fn build(self) -> Result<TestHarness, QadeskError> {
        let (records, temp_dir): (Arc<dyn RecordStore>, _) = if self.sqlite {
            let dir = tempfile::TempDir::new().map_err(QadeskError::storage)?;
            let path = dir.path().join("qadesk.db");
            let store = SqliteRecordStore::open(&path.to_string_lossy()).await?;
            (Arc::new(store), Some(dir))
        } else {
            (Arc::new(MemoryRecordStore::new()), None)
        };

        let generator = Arc::new(MockGenerator::with_replies(self.replies));
        let connectivity = ConnectivityMonitor::new(self.online);
        let catalog = Arc::new(self.catalog);
        let drafts = DraftStore::open(records.clone()).await?;
        let flow = FlowController::new(
            catalog.clone(),
            drafts,
            generator.clone(),
            connectivity.clone(),
        );

        Ok(TestHarness {
            flow,
            generator,
            connectivity,
            records,
            catalog,
            _temp_dir: temp_dir,
        })
    }
}

/// A flow controller with mock collaborators.
pub struct TestHarness {
    pub flow: FlowController,
    pub generator: Arc<MockGenerator>,
    pub connectivity: ConnectivityMonitor,
    pub records: Arc<dyn RecordStore>,
    catalog: Arc<Catalog>,
    _temp_dir: Option<tempfile::TempDir>,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Simulates a restart: a new controller over the same records.
    pub async fn restart(&mut self) -> Result<(), QadeskError> {
        let drafts = DraftStore::open(self.records.clone()).await?;
        self.flow = FlowController::new(
            self.catalog.clone(),
            drafts,
            self.generator.clone(),
            self.connectivity.clone(),
        );
        Ok(())
    }

    /// Selects project and action, leaving the flow in GatheringData.
    pub fn start(&mut self, project: Project, action: Action) -> Result<(), QadeskError> {
        self.flow.select_project(project)?;
        self.flow.select_action(action)
    }

    /// Fills every field of the active form with catalog-valid values.
    pub fn fill_form(&mut self) -> Result<(), QadeskError> {
        let form = self.flow.form_mut()?;
        fill(form)
    }
}

/// Fills every field of `form` with values valid for its project.
pub fn fill(form: &mut FormState) -> Result<(), QadeskError> {
    let browser = form
        .catalog()
        .browsers()
        .first()
        .cloned()
        .ok_or_else(|| QadeskError::Internal("catalog has no browsers".into()))?;
    let environment = form
        .catalog()
        .environments(form.project())
        .first()
        .cloned()
        .ok_or_else(|| QadeskError::Internal("catalog has no environments".into()))?;

    for field in form.fields() {
        match field {
            qadesk_flow::Field::Browser => form.select_browser(&browser)?,
            qadesk_flow::Field::Environment => form.select_environment(&environment)?,
            qadesk_flow::Field::Database | qadesk_flow::Field::Solved => {}
            other => form.set(*other, &format!("valor de {other}"))?,
        }
    }
    Ok(())
}
