// SPDX-License-Identifier: MIT

use super::*;
use qc_core::{FakeClock, JobSpec, JobState, WorkerId};
use qc_storage::Store;

async fn engine() -> (Engine<FakeClock>, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open(dir.path().join("queue.db")).await.unwrap();
    let engine = Engine::load(store, FakeClock::new()).await.unwrap();
    (engine, dir)
}

async fn enqueue_and_claim(engine: &Engine<FakeClock>, json: &str) -> Job {
    engine
        .enqueue(&JobSpec::from_json(json).unwrap())
        .await
        .unwrap();
    engine
        .store()
        .claim_next(&WorkerId::new("wrk-1"), engine.clock().epoch_ms())
        .await
        .unwrap()
        .unwrap()
}

#[test]
fn backoff_is_exponential_in_the_attempt() {
    assert_eq!(backoff_delay_seconds(2, 1), 2);
    assert_eq!(backoff_delay_seconds(2, 2), 4);
    assert_eq!(backoff_delay_seconds(2, 3), 8);
    assert_eq!(backoff_delay_seconds(3, 2), 9);
    assert_eq!(backoff_delay_seconds(1, 10), 1);
}

#[test]
fn backoff_saturates_instead_of_overflowing() {
    assert_eq!(backoff_delay_seconds(2, 5_000), i64::MAX);
}

#[tokio::test]
async fn first_failure_schedules_retry_with_base_delay() {
    let (engine, _dir) = engine().await;
    let job = enqueue_and_claim(&engine, r#"{"id": "b", "command": "false"}"#).await;

    let resolution = engine
        .handle_job_failure(&job, "Command failed with exit code 1")
        .await
        .unwrap();

    assert_eq!(resolution, FailureResolution::Retrying { delay_seconds: 2 });
    let stored = engine.get_job(&job.id).await.unwrap().unwrap();
    assert_eq!(stored.state, JobState::Pending);
    assert_eq!(stored.attempts, 1);
}

#[tokio::test]
async fn delays_grow_until_the_dead_letter_boundary() {
    // max_retries = 2: attempts consume delays 2s then 4s, and the third
    // failure dead-letters with attempts = 3.
    let (engine, _dir) = engine().await;
    let clock = engine.clock().clone();

    let job = enqueue_and_claim(
        &engine,
        r#"{"id": "b", "command": "false", "max_retries": 2}"#,
    )
    .await;
    let first = engine
        .handle_job_failure(&job, "Command failed with exit code 1")
        .await
        .unwrap();
    assert_eq!(first, FailureResolution::Retrying { delay_seconds: 2 });

    clock.advance(std::time::Duration::from_secs(2));
    let job = engine
        .store()
        .claim_next(&WorkerId::new("wrk-1"), clock.epoch_ms())
        .await
        .unwrap()
        .unwrap();
    let second = engine
        .handle_job_failure(&job, "Command failed with exit code 1")
        .await
        .unwrap();
    assert_eq!(second, FailureResolution::Retrying { delay_seconds: 4 });

    clock.advance(std::time::Duration::from_secs(4));
    let job = engine
        .store()
        .claim_next(&WorkerId::new("wrk-1"), clock.epoch_ms())
        .await
        .unwrap()
        .unwrap();
    let third = engine
        .handle_job_failure(&job, "Command failed with exit code 1")
        .await
        .unwrap();

    let FailureResolution::DeadLettered(entry) = third else {
        panic!("expected dead letter, got {third:?}");
    };
    assert_eq!(entry.attempts, 3);
    assert_eq!(
        entry.last_error.as_deref(),
        Some("Command failed with exit code 1")
    );

    let stored = engine.get_job(&JobId::new("b")).await.unwrap().unwrap();
    assert_eq!(stored.state, JobState::Dead);
    assert_eq!(stored.attempts, 3);
}

#[tokio::test]
async fn zero_max_retries_dead_letters_on_first_failure() {
    let (engine, _dir) = engine().await;
    let job = enqueue_and_claim(
        &engine,
        r#"{"id": "one-shot", "command": "false", "max_retries": 0}"#,
    )
    .await;

    let resolution = engine
        .handle_job_failure(&job, "Timed out after 1s")
        .await
        .unwrap();

    let FailureResolution::DeadLettered(entry) = resolution else {
        panic!("expected dead letter, got {resolution:?}");
    };
    assert_eq!(entry.attempts, 1);
    assert_eq!(entry.last_error.as_deref(), Some("Timed out after 1s"));
}

#[tokio::test]
async fn complete_job_marks_terminal() {
    let (engine, _dir) = engine().await;
    let job = enqueue_and_claim(&engine, r#"{"id": "a", "command": "true"}"#).await;

    engine.complete_job(&job.id).await.unwrap();

    let stored = engine.get_job(&job.id).await.unwrap().unwrap();
    assert_eq!(stored.state, JobState::Completed);
    assert!(stored.worker_id.is_none());
}

#[tokio::test]
async fn dlq_retry_round_trip() {
    let (engine, _dir) = engine().await;
    let job = enqueue_and_claim(
        &engine,
        r#"{"id": "doomed", "command": "false", "max_retries": 0}"#,
    )
    .await;
    let resolution = engine.handle_job_failure(&job, "boom").await.unwrap();
    let FailureResolution::DeadLettered(entry) = resolution else {
        panic!("expected dead letter");
    };

    let fresh = engine.dlq_retry(&entry.dlq_id).await.unwrap();
    assert_eq!(fresh.attempts, 0);
    assert_eq!(fresh.command, "false");
    assert_eq!(fresh.max_retries, engine.settings().max_retries);

    assert!(engine.dlq_list(10).await.unwrap().is_empty());
    assert!(engine.dlq_retry(&entry.dlq_id).await.is_err());
}

#[tokio::test]
async fn dlq_purge_uses_day_cutoff() {
    let (engine, _dir) = engine().await;
    let clock = engine.clock().clone();
    clock.set_epoch_ms(0);

    let job = enqueue_and_claim(
        &engine,
        r#"{"id": "old", "command": "false", "max_retries": 0}"#,
    )
    .await;
    engine.handle_job_failure(&job, "boom").await.unwrap();

    // Three days later, a 7-day purge keeps it; a 2-day purge removes it.
    clock.set_epoch_ms(3 * 86_400_000);
    assert_eq!(engine.dlq_purge(7).await.unwrap(), 0);
    assert_eq!(engine.dlq_purge(2).await.unwrap(), 1);
    assert!(engine.dlq_list(10).await.unwrap().is_empty());
}
