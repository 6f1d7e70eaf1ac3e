// SPDX-FileCopyrightText: 2026 Qadesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for qadesk integration tests.

pub mod harness;
pub mod mock_generator;

pub use harness::{TestHarness, TestHarnessBuilder, fill};
pub use mock_generator::{MockGenerator, MockReply};
