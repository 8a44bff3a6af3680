// SPDX-License-Identifier: MIT

use super::*;
use crate::EngineError;
use qc_core::{ConfigError, FakeClock};
use qc_storage::Store;

async fn engine() -> (Engine<FakeClock>, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open(dir.path().join("queue.db")).await.unwrap();
    let engine = Engine::load(store, FakeClock::new()).await.unwrap();
    (engine, dir)
}

#[tokio::test]
async fn get_unset_key_returns_default() {
    let (engine, _dir) = engine().await;
    assert_eq!(engine.config_get("max_retries").await.unwrap(), "3");
    assert_eq!(engine.config_get("heartbeat_interval_seconds").await.unwrap(), "5");
}

#[tokio::test]
async fn set_then_get() {
    let (engine, _dir) = engine().await;
    engine.config_set("poll_interval_ms", "100").await.unwrap();
    assert_eq!(engine.config_get("poll_interval_ms").await.unwrap(), "100");
}

#[tokio::test]
async fn unknown_key_is_rejected_on_both_paths() {
    let (engine, _dir) = engine().await;

    let err = engine.config_get("jitter").await.unwrap_err();
    assert!(matches!(
        err,
        EngineError::Config(ConfigError::UnknownKey(_))
    ));

    let err = engine.config_set("jitter", "1").await.unwrap_err();
    assert!(err.is_validation());
}

#[tokio::test]
async fn invalid_value_is_rejected() {
    let (engine, _dir) = engine().await;
    let err = engine.config_set("max_retries", "-2").await.unwrap_err();
    assert!(matches!(
        err,
        EngineError::Config(ConfigError::InvalidValue { .. })
    ));

    // Nothing was stored.
    assert_eq!(engine.config_get("max_retries").await.unwrap(), "3");
}

#[tokio::test]
async fn list_covers_every_declared_key() {
    let (engine, _dir) = engine().await;
    engine.config_set("backoff_base", "4").await.unwrap();

    let entries = engine.config_list().await.unwrap();
    assert_eq!(entries.len(), qc_core::ConfigKey::ALL.len());

    let backoff = entries.iter().find(|e| e.key == "backoff_base").unwrap();
    assert_eq!(backoff.value, "4");
    assert!(!backoff.default);

    let retries = entries.iter().find(|e| e.key == "max_retries").unwrap();
    assert_eq!(retries.value, "3");
    assert!(retries.default);
}

#[tokio::test]
async fn settings_snapshot_reflects_stored_values() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open(dir.path().join("queue.db")).await.unwrap();
    store.set_config("backoff_base", "5").await.unwrap();
    store.set_config("stale_worker_timeout_seconds", "10").await.unwrap();

    let engine = Engine::load(store, FakeClock::new()).await.unwrap();
    assert_eq!(engine.settings().backoff_base, 5);
    assert_eq!(engine.settings().stale_worker_timeout_seconds, 10);
    assert_eq!(engine.settings().poll_interval_ms, 500);
}
