// SPDX-FileCopyrightText: 2026 Qadesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for qadesk.

use thiserror::Error;

use crate::types::FlowStep;

/// The primary error type shared by every qadesk crate.
#[derive(Debug, Error)]
pub enum QadeskError {
    /// Configuration errors (invalid TOML, bad values, missing API key).
    #[error("configuration error: {0}")]
    Config(String),

    /// Durable storage errors (SQLite, serialization of records).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Remote report generator errors (network, HTTP status, malformed body).
    #[error("generator error: {message}")]
    Generator {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The generator answered but produced no usable text.
    #[error("generator returned an empty report")]
    EmptyResponse,

    /// An operation was attempted in a step that does not allow it.
    #[error("cannot {operation} during the {from} step")]
    InvalidTransition {
        from: FlowStep,
        operation: &'static str,
    },

    /// Required form fields are empty.
    #[error("required fields are empty: {}", missing.join(", "))]
    Validation { missing: Vec<String> },

    /// A selection is not part of the configured catalog.
    #[error("`{value}` is not a valid {field} for this project")]
    NotInCatalog { field: String, value: String },

    /// The field is derived from another one and cannot be edited directly.
    #[error("field `{0}` is derived and cannot be edited")]
    ReadOnlyField(String),

    /// The field name does not belong to the active report shape.
    #[error("unknown form field `{0}`")]
    UnknownField(String),

    /// No stored draft matches the given id.
    #[error("draft `{0}` not found")]
    DraftNotFound(String),

    /// No history entry matches the given id.
    #[error("message `{0}` not found")]
    MessageNotFound(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl QadeskError {
    /// Wraps any error as a storage error.
    pub fn storage<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        QadeskError::Storage {
            source: Box::new(err),
        }
    }
}
