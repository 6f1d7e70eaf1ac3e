// SPDX-FileCopyrightText: 2026 Qadesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Remote report generator trait.

use async_trait::async_trait;

use crate::error::QadeskError;
use crate::types::ReportRequest;

/// Turns a validated report record into a formatted free-text report.
///
/// Implementations make exactly one attempt per call. Callers treat every
/// `Err` the same way, so implementations should not retry on their own.
#[async_trait]
pub trait ReportGenerator: Send + Sync + 'static {
    /// Human-readable name of the backend, used in logs.
    fn name(&self) -> &str;

    /// Generates the report text for `request`.
    ///
    /// An empty answer must be reported as [`QadeskError::EmptyResponse`].
    async fn generate(&self, request: &ReportRequest) -> Result<String, QadeskError>;
}
