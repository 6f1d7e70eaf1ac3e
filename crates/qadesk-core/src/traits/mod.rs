// SPDX-FileCopyrightText: 2026 Qadesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Seams between the flow controller and its external collaborators.
//!
//! Both traits use `#[async_trait]` so implementations can be shared as
//! `Arc<dyn Trait>` and swapped for in-memory fakes in tests.

pub mod generator;
pub mod store;

pub use generator::ReportGenerator;
pub use store::RecordStore;
