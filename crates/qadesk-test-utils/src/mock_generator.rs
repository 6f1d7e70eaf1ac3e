// SPDX-FileCopyrightText: 2026 Qadesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scripted report generator for deterministic tests.

use std::collections::VecDeque;

use async_trait::async_trait;
use qadesk_core::{QadeskError, ReportGenerator, ReportRequest};
use tokio::sync::Mutex;

/// One scripted generator outcome.
#[derive(Debug, Clone)]
pub enum MockReply {
    Text(String),
    /// A generator error carrying this message.
    Fail(String),
    Empty,
}

impl MockReply {
    pub fn text(text: impl Into<String>) -> Self {
        MockReply::Text(text.into())
    }

    fn into_result(self) -> Result<String, QadeskError> {
        match self {
            MockReply::Text(text) => Ok(text),
            MockReply::Fail(message) => Err(QadeskError::Generator {
                message,
                source: None,
            }),
            MockReply::Empty => Err(QadeskError::EmptyResponse),
        }
    }
}

/// A [`ReportGenerator`] that replays queued replies and records requests.
///
/// With an empty queue it answers with a minimal bug report.
#[derive(Debug, Default)]
pub struct MockGenerator {
    replies: Mutex<VecDeque<MockReply>>,
    requests: Mutex<Vec<ReportRequest>>,
}

impl MockGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_replies(replies: Vec<MockReply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub async fn push_reply(&self, reply: MockReply) {
        self.replies.lock().await.push_back(reply);
    }

    /// Every request received so far.
    pub async fn requests(&self) -> Vec<ReportRequest> {
        self.requests.lock().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.requests.lock().await.len()
    }
}

#[async_trait]
impl ReportGenerator for MockGenerator {
    fn name(&self) -> &str {
        "mock-generator"
    }

    async fn generate(&self, request: &ReportRequest) -> Result<String, QadeskError> {
        self.requests.lock().await.push(request.clone());
        self.replies
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| MockReply::text("Versión: mock"))
            .into_result()
    }
}
