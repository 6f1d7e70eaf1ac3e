// SPDX-FileCopyrightText: 2026 Qadesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Submission flow for qadesk.
//!
//! The [`FlowController`] owns the session context and the active
//! [`FormState`], asks the [`ConnectivityMonitor`] where a submission goes,
//! and hands it either to the report generator or to the draft store.

pub mod connectivity;
pub mod flow;
pub mod form;

pub use connectivity::ConnectivityMonitor;
pub use flow::{
    FAILURE_MESSAGE, FlowController, MenuChoice, SessionContext, SubmitOutcome, Submission,
};
pub use form::{Field, FormState};
