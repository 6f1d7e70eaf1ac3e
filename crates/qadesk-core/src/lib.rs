// SPDX-FileCopyrightText: 2026 Qadesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for qadesk.
//!
//! Holds the report data model, the selection catalogs, the shared error
//! type, and the traits that the flow controller uses to reach the remote
//! report generator and durable storage.

pub mod catalog;
pub mod error;
pub mod traits;
pub mod types;

pub use catalog::Catalog;
pub use error::QadeskError;
pub use traits::{RecordStore, ReportGenerator};
pub use types::{
    Action, BugReport, ChatMessage, FlowStep, LocalDraft, MessageKind, MessageMetadata, Project,
    ReportData, ReportRequest, RetestReport, Role, Solved,
};
