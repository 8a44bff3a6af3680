// SPDX-License-Identifier: MIT

//! DLQ command specs that need no workers.

use crate::prelude::*;

#[test]
fn empty_dlq_lists_cleanly() {
    let project = Project::empty();
    let out = project.run(&["dlq", "list"]);
    assert!(out.stdout().contains("empty"));
}

#[test]
fn retry_unknown_entry_exits_2() {
    let project = Project::empty();
    project.run_expect(&["dlq", "retry", "dlq-ghost"], 2);
}

#[test]
fn purge_requires_force() {
    let project = Project::empty();
    project.run_expect(&["dlq", "purge", "--older-than", "7"], 2);
}

#[test]
fn purge_with_force_reports_count() {
    let project = Project::empty();
    let out = project.run(&["dlq", "purge", "--older-than", "7", "--force", "--json"]);
    assert_eq!(out.json()["purged"], 0);
}
