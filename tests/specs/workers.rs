// SPDX-License-Identifier: MIT

//! End-to-end specs with a real worker pool.

use crate::prelude::*;
use serial_test::serial;

#[test]
#[serial]
fn worker_completes_a_job() {
    let project = Project::empty();
    project.run(&["config", "set", "poll_interval_ms", "50"]);
    project.run(&["enqueue", r#"{"id": "a", "command": "true"}"#]);

    let mut supervisor = project.spawn_supervisor(1);

    let done = wait_for(SPEC_WAIT_MAX_MS, || {
        let completed = project.run(&["list", "--state", "completed", "--json"]).json();
        !completed.as_array().unwrap().is_empty()
    });

    project.shutdown_supervisor(&mut supervisor);
    assert!(done, "job should complete");

    let status = project.run(&["status", "--json"]).json();
    let completed = status["counts"]
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["state"] == "completed")
        .unwrap();
    assert_eq!(completed["count"], 1);
}

#[test]
#[serial]
fn failing_job_with_no_retries_reaches_the_dlq() {
    let project = Project::empty();
    project.run(&["config", "set", "poll_interval_ms", "50"]);
    project.run(&[
        "enqueue",
        r#"{"id": "b", "command": "false", "max_retries": 0}"#,
    ]);

    let mut supervisor = project.spawn_supervisor(1);

    let dead = wait_for(SPEC_WAIT_MAX_MS, || {
        let entries = project.run(&["dlq", "list", "--json"]).json();
        !entries.as_array().unwrap().is_empty()
    });

    project.shutdown_supervisor(&mut supervisor);
    assert!(dead, "job should dead-letter");

    let entries = project.run(&["dlq", "list", "--json"]).json();
    let entry = &entries.as_array().unwrap()[0];
    assert_eq!(entry["original_job_id"], "b");
    assert_eq!(entry["attempts"], 1);
    assert!(entry["last_error"]
        .as_str()
        .unwrap()
        .contains("exit code 1"));

    // Round trip: retry creates a fresh pending job and empties the DLQ.
    let dlq_id = entry["dlq_id"].as_str().unwrap().to_string();
    let retried = project.run(&["dlq", "retry", &dlq_id, "--json"]).json();
    let new_id = retried["job_id"].as_str().unwrap().to_string();
    assert_ne!(new_id, "b");

    assert!(project.run(&["dlq", "list"]).stdout().contains("empty"));
    let pending = project.run(&["list", "--state", "pending", "--json"]).json();
    assert_eq!(pending.as_array().unwrap()[0]["id"], new_id);
    assert_eq!(pending.as_array().unwrap()[0]["attempts"], 0);
}

#[test]
#[serial]
fn higher_priority_jobs_run_first() {
    let project = Project::empty();
    project.run(&["config", "set", "poll_interval_ms", "50"]);

    for (id, priority) in [("low", "1"), ("high", "100"), ("mid", "50")] {
        project.run(&[
            "enqueue",
            "--command",
            &format!("echo {id} >> order.txt"),
            "--id",
            id,
            "--priority",
            priority,
        ]);
    }

    let mut supervisor = project.spawn_supervisor(1);

    let done = wait_for(SPEC_WAIT_MAX_MS, || {
        let status = project.run(&["status", "--json"]).json();
        status["counts"]
            .as_array()
            .unwrap()
            .iter()
            .any(|c| c["state"] == "completed" && c["count"] == 3)
    });

    project.shutdown_supervisor(&mut supervisor);
    assert!(done, "all three jobs should complete");

    let order = std::fs::read_to_string(project.path().join("order.txt")).unwrap();
    let lines: Vec<&str> = order.lines().collect();
    assert_eq!(lines, ["high", "mid", "low"]);
}

#[test]
#[serial]
fn worker_stop_with_no_registry_is_clean() {
    let project = Project::empty();
    let out = project.run(&["worker", "stop"]);
    assert!(out.stdout().contains("No registered workers"));
}

#[test]
#[serial]
fn worker_start_rejects_zero_count() {
    let project = Project::empty();
    project.run_expect(&["worker", "start", "--count", "0"], 2);
}
