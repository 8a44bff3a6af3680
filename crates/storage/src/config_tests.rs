// SPDX-License-Identifier: MIT

use crate::test_store;

#[tokio::test]
async fn get_missing_key_is_none() {
    let (store, _dir) = test_store::open().await;
    assert_eq!(store.get_config("max_retries").await.unwrap(), None);
}

#[tokio::test]
async fn set_then_get_round_trips() {
    let (store, _dir) = test_store::open().await;
    store.set_config("max_retries", "5").await.unwrap();
    assert_eq!(
        store.get_config("max_retries").await.unwrap().as_deref(),
        Some("5")
    );
}

#[tokio::test]
async fn set_is_idempotent_and_overwrites() {
    let (store, _dir) = test_store::open().await;

    store.set_config("backoff_base", "2").await.unwrap();
    store.set_config("backoff_base", "2").await.unwrap();
    assert_eq!(store.list_config().await.unwrap().len(), 1);

    store.set_config("backoff_base", "3").await.unwrap();
    assert_eq!(
        store.get_config("backoff_base").await.unwrap().as_deref(),
        Some("3")
    );
}

#[tokio::test]
async fn list_is_sorted_by_key() {
    let (store, _dir) = test_store::open().await;
    store.set_config("poll_interval_ms", "250").await.unwrap();
    store.set_config("backoff_base", "2").await.unwrap();

    let entries = store.list_config().await.unwrap();
    assert_eq!(
        entries,
        vec![
            ("backoff_base".to_string(), "2".to_string()),
            ("poll_interval_ms".to_string(), "250".to_string()),
        ]
    );
}
