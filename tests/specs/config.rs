// SPDX-License-Identifier: MIT

//! Config registry specs.

use crate::prelude::*;

#[test]
fn get_returns_defaults_until_set() {
    let project = Project::empty();
    assert_eq!(project.run(&["config", "get", "max_retries"]).stdout().trim(), "3");
    assert_eq!(project.run(&["config", "get", "backoff_base"]).stdout().trim(), "2");
}

#[test]
fn set_then_get_round_trips() {
    let project = Project::empty();
    project.run(&["config", "set", "poll_interval_ms", "100"]);
    assert_eq!(
        project.run(&["config", "get", "poll_interval_ms"]).stdout().trim(),
        "100"
    );
}

#[test]
fn set_is_idempotent() {
    let project = Project::empty();
    project.run(&["config", "set", "max_retries", "5"]);
    project.run(&["config", "set", "max_retries", "5"]);
    assert_eq!(project.run(&["config", "get", "max_retries"]).stdout().trim(), "5");
}

#[test]
fn unknown_key_exits_2() {
    let project = Project::empty();
    project.run_expect(&["config", "get", "retry_jitter"], 2);
    project.run_expect(&["config", "set", "retry_jitter", "1"], 2);
}

#[test]
fn invalid_value_exits_2() {
    let project = Project::empty();
    project.run_expect(&["config", "set", "max_retries", "-1"], 2);
    project.run_expect(&["config", "set", "backoff_base", "zero"], 2);
}

#[test]
fn list_shows_every_declared_key() {
    let project = Project::empty();
    project.run(&["config", "set", "backoff_base", "3"]);

    let entries = project.run(&["config", "list", "--json"]).json();
    let entries = entries.as_array().unwrap();
    assert_eq!(entries.len(), 6);

    let backoff = entries.iter().find(|e| e["key"] == "backoff_base").unwrap();
    assert_eq!(backoff["value"], "3");
    assert_eq!(backoff["default"], false);

    let db_path = entries.iter().find(|e| e["key"] == "db_path").unwrap();
    assert_eq!(db_path["default"], true);
}
