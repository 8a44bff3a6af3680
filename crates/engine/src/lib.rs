// SPDX-License-Identifier: MIT

//! Queue service: the stateless facade every front-end goes through.
//!
//! Owns validation, default-filling, the centralized retry-or-dead-letter
//! decision, status aggregation, and guarded config writes. All state lives
//! in the store; the engine is constructed per process and passed around
//! explicitly.

mod dlq;
mod error;
mod failure;
mod queue;
mod settings;
mod status;

pub use error::EngineError;
pub use failure::{backoff_delay_seconds, FailureResolution};
pub use settings::ConfigEntry;
pub use status::{StateCount, StatusReport};

use qc_core::{Clock, Settings};
use qc_storage::Store;

/// Engine context: the store handle, a settings snapshot, and a clock.
///
/// Settings are read once at construction; a long-lived process picks up
/// config changes on restart.
#[derive(Clone)]
pub struct Engine<C: Clock> {
    store: Store,
    settings: Settings,
    clock: C,
}

impl<C: Clock> Engine<C> {
    /// Build an engine over `store`, loading the settings snapshot from the
    /// config table.
    pub async fn load(store: Store, clock: C) -> Result<Self, EngineError> {
        let entries = store.list_config().await?;
        let settings =
            Settings::from_entries(entries.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        Ok(Self {
            store,
            settings,
            clock,
        })
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub(crate) fn now_ms(&self) -> i64 {
        self.clock.epoch_ms()
    }
}
