// SPDX-License-Identifier: MIT

//! Store error type.

use qc_core::JobId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to open database at {path}: {source}")]
    Open {
        path: String,
        source: sqlx::Error,
    },

    #[error("{command} query failed: {source}")]
    Query {
        command: &'static str,
        source: sqlx::Error,
    },

    #[error("duplicate job id: {0}")]
    DuplicateId(JobId),

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("corrupt {table} row: {reason}")]
    Corrupt {
        table: &'static str,
        reason: String,
    },
}

impl StoreError {
    /// Whether this error should surface as "not found" rather than an
    /// internal failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}
