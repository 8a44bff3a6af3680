// SPDX-License-Identifier: MIT

//! Shared helpers for the CLI specs.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};

/// Upper bound for polling loops. Generous so loaded CI machines pass.
pub const SPEC_WAIT_MAX_MS: u64 = 15_000;

/// A throwaway project directory with its own database.
pub struct Project {
    dir: tempfile::TempDir,
}

impl Project {
    pub fn empty() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn db_path(&self) -> PathBuf {
        self.dir.path().join("queue.db")
    }

    fn cmd(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::Command::cargo_bin("queuectl").unwrap();
        cmd.env("QUEUECTL_DB", self.db_path())
            .env("NO_COLOR", "1")
            .current_dir(self.dir.path());
        cmd
    }

    /// Run a command and assert it exits zero.
    pub fn run(&self, args: &[&str]) -> SpecOutput {
        let output = self.cmd().args(args).output().unwrap();
        assert!(
            output.status.success(),
            "queuectl {args:?} failed ({:?}): {}",
            output.status.code(),
            String::from_utf8_lossy(&output.stderr),
        );
        SpecOutput { output }
    }

    /// Run a command and assert a specific non-zero exit code.
    pub fn run_expect(&self, args: &[&str], code: i32) -> SpecOutput {
        let output = self.cmd().args(args).output().unwrap();
        assert_eq!(
            output.status.code(),
            Some(code),
            "queuectl {args:?}: {}",
            String::from_utf8_lossy(&output.stderr),
        );
        SpecOutput { output }
    }

    /// Spawn a foreground worker supervisor as a real child process.
    pub fn spawn_supervisor(&self, count: u32) -> std::process::Child {
        std::process::Command::new(assert_cmd::cargo::cargo_bin("queuectl"))
            .args(["worker", "start", "--count", &count.to_string()])
            .env("QUEUECTL_DB", self.db_path())
            .env("NO_COLOR", "1")
            .current_dir(self.dir.path())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .unwrap()
    }

    /// Stop the workers via the registry and reap the supervisor.
    pub fn shutdown_supervisor(&self, child: &mut std::process::Child) {
        self.run(&["worker", "stop"]);
        let deadline = Instant::now() + Duration::from_millis(SPEC_WAIT_MAX_MS);
        while Instant::now() < deadline {
            if child.try_wait().unwrap().is_some() {
                return;
            }
            std::thread::sleep(Duration::from_millis(100));
        }
        // Should not happen: the supervisor reaps its children within its
        // own grace period. Don't leak the process either way.
        child.kill().ok();
        child.wait().ok();
    }
}

/// Poll `condition` until it holds or `max_ms` elapses.
pub fn wait_for(max_ms: u64, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_millis(max_ms);
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(100));
    }
    false
}

pub struct SpecOutput {
    output: std::process::Output,
}

impl SpecOutput {
    pub fn stdout(&self) -> String {
        String::from_utf8_lossy(&self.output.stdout).into_owned()
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.stdout()).unwrap()
    }
}
