// SPDX-License-Identifier: MIT

//! Enqueue / list / status specs (no workers involved).

use crate::prelude::*;

#[test]
fn enqueue_json_then_list_shows_pending() {
    let project = Project::empty();

    let out = project.run(&["enqueue", r#"{"id": "a", "command": "true"}"#]);
    assert!(out.stdout().contains("Enqueued job a"));

    let list = project.run(&["list"]);
    assert!(list.stdout().contains("a"));
    assert!(list.stdout().contains("pending"));
}

#[test]
fn enqueue_flag_form_records_fields() {
    let project = Project::empty();
    project.run(&[
        "enqueue",
        "--command",
        "echo hi",
        "--id",
        "flagged",
        "--priority",
        "9",
        "--max-retries",
        "1",
        "--timeout",
        "30",
    ]);

    let jobs = project.run(&["list", "--json"]).json();
    let job = &jobs.as_array().unwrap()[0];
    assert_eq!(job["id"], "flagged");
    assert_eq!(job["priority"], 9);
    assert_eq!(job["max_retries"], 1);
    assert_eq!(job["timeout_seconds"], 30);
    assert_eq!(job["state"], "pending");
}

#[test]
fn enqueue_without_command_is_a_validation_error() {
    let project = Project::empty();
    project.run_expect(&["enqueue", r#"{"id": "a"}"#], 2);
    project.run_expect(&["enqueue", r#"{"command": ""}"#], 2);
}

#[test]
fn enqueue_unknown_field_is_a_validation_error() {
    let project = Project::empty();
    project.run_expect(&["enqueue", r#"{"command": "true", "nice": 19}"#], 2);
}

#[test]
fn enqueue_duplicate_id_is_a_validation_error() {
    let project = Project::empty();
    project.run(&["enqueue", r#"{"id": "a", "command": "true"}"#]);
    project.run_expect(&["enqueue", r#"{"id": "a", "command": "true"}"#], 2);
}

#[test]
fn enqueue_from_file() {
    let project = Project::empty();
    let path = project.path().join("job.json");
    std::fs::write(&path, r#"{"id": "filed", "command": "true"}"#).unwrap();

    project.run(&["enqueue", "--file", path.to_str().unwrap()]);
    assert!(project.run(&["list"]).stdout().contains("filed"));
}

#[test]
fn list_rejects_unknown_state() {
    let project = Project::empty();
    project.run_expect(&["list", "--state", "sleeping"], 2);
}

#[test]
fn list_filters_by_state() {
    let project = Project::empty();
    project.run(&["enqueue", r#"{"id": "a", "command": "true"}"#]);

    let pending = project.run(&["list", "--state", "pending", "--json"]).json();
    assert_eq!(pending.as_array().unwrap().len(), 1);

    let completed = project.run(&["list", "--state", "completed", "--json"]).json();
    assert_eq!(completed.as_array().unwrap().len(), 0);
}

#[test]
fn status_reports_counts_and_workers() {
    let project = Project::empty();
    project.run(&["enqueue", r#"{"id": "a", "command": "true"}"#]);

    let status = project.run(&["status", "--json"]).json();
    let pending = status["counts"]
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["state"] == "pending")
        .unwrap();
    assert_eq!(pending["count"], 1);
    assert_eq!(status["live_workers"].as_array().unwrap().len(), 0);

    let text = project.run(&["status"]).stdout();
    assert!(text.contains("pending"));
    assert!(text.contains("Workers: none"));
}

#[test]
fn state_survives_process_restarts() {
    // Every CLI invocation is a fresh process over the same database.
    let project = Project::empty();
    project.run(&["enqueue", r#"{"id": "durable", "command": "true"}"#]);
    project.run(&["enqueue", r#"{"id": "durable-2", "command": "true"}"#]);

    let list = project.run(&["list", "--json"]).json();
    assert_eq!(list.as_array().unwrap().len(), 2);
}
