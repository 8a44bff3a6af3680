// SPDX-License-Identifier: MIT

//! Engine error type.

use qc_core::{ConfigError, SpecError};
use qc_storage::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Spec(#[from] SpecError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl EngineError {
    /// True for caller mistakes (bad spec, unknown key, duplicate id,
    /// missing entity) as opposed to internal store failures.
    pub fn is_validation(&self) -> bool {
        match self {
            EngineError::Spec(_) | EngineError::Config(_) => true,
            EngineError::Store(StoreError::DuplicateId(_)) => true,
            EngineError::Store(err) => err.is_not_found(),
        }
    }
}
