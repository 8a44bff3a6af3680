// SPDX-License-Identifier: MIT

//! CLI command implementations

pub mod config;
pub mod dlq;
pub mod enqueue;
pub mod list;
pub mod status;
pub mod worker;

use crate::exit_error::{ExitError, EXIT_INTERNAL, EXIT_VALIDATION};

/// Map an engine error to the documented exit codes: 2 for validation,
/// duplicate ids, unknown keys, and missing entities; 1 for store failures.
pub(crate) fn engine_exit(err: qc_engine::EngineError) -> anyhow::Error {
    let code = if err.is_validation() {
        EXIT_VALIDATION
    } else {
        EXIT_INTERNAL
    };
    ExitError::new(code, err.to_string()).into()
}
