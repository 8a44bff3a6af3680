// SPDX-License-Identifier: MIT

//! Process environment: database path resolution and engine construction.
//!
//! The store location must be known before the config table can be read,
//! so it resolves from the `QUEUECTL_DB` environment variable, falling
//! back to the declared default.

use std::path::PathBuf;

use anyhow::Result;
use qc_core::SystemClock;
use qc_engine::Engine;
use qc_storage::Store;

use crate::exit_error::{ExitError, EXIT_INTERNAL};

pub fn db_path() -> PathBuf {
    std::env::var_os("QUEUECTL_DB")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(qc_core::DEFAULT_DB_PATH))
}

/// Open the store at the resolved path and load an engine over it.
pub async fn open_engine() -> Result<Engine<SystemClock>> {
    let path = db_path();
    let store = Store::open(&path)
        .await
        .map_err(|err| ExitError::new(EXIT_INTERNAL, err.to_string()))?;
    let engine = Engine::load(store, SystemClock)
        .await
        .map_err(|err| ExitError::new(EXIT_INTERNAL, err.to_string()))?;
    Ok(engine)
}
