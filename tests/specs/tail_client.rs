// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! spec.md §8 scenarios 6 and 7: TailClient detach and follow-through-restart.
//!
//! `--on-exit`/other named flags are placed *before* the program name in
//! these invocations: `run`'s `args` field is `trailing_var_arg`, so once
//! the parser starts consuming it, everything after the program name
//! (including tokens that look like flags) belongs to the child's argv,
//! not to `persistproc run` itself.

use std::time::Duration;

use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;

use crate::prelude::{Harness, LineReader};

#[test]
fn sigint_with_on_exit_detach_leaves_the_child_running() {
    let harness = Harness::start();

    let mut child = harness.cli().args(["run", "--on-exit", "detach", "sleep", "30"]).spawn_piped();

    std::thread::sleep(Duration::from_secs(1));

    kill(Pid::from_raw(child.id() as i32), Signal::SIGINT).expect("send SIGINT to run client");
    let status = child.wait().expect("wait for run client to exit");
    assert!(status.success(), "client should exit 0 on detach, got {status:?}");

    let listed = harness.cli().args(["list"]).passes_json();
    let running: Vec<&serde_json::Value> = listed["processes"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|p| p["status"] == "running" && p["command"][0] == "sleep")
        .collect();
    assert_eq!(running.len(), 1, "the sleep process should still be running after detach");

    let pid = running[0]["pid"].as_u64().unwrap();
    harness.cli().args(["stop", &pid.to_string(), "--force"]).passes();
}

#[test]
fn client_follows_a_transparent_restart() {
    let harness = Harness::start();

    let mut child = harness
        .cli()
        .args([
            "run",
            "--on-exit",
            "detach",
            "sh",
            "-c",
            "while true; do echo beat; sleep 0.2; done",
        ])
        .spawn_piped();

    let stdout = child.stdout.take().expect("piped stdout");
    let lines = LineReader::spawn(stdout);

    let first_beat = lines.wait_for(|l| l.contains("beat"), Duration::from_secs(5));
    assert!(first_beat.is_some(), "expected tailed output before restart");

    let target_tokens =
        vec!["sh".to_string(), "-c".to_string(), "while true; do echo beat; sleep 0.2; done".to_string()];
    let listed = harness.cli().args(["list"]).passes_json();
    let entry = listed["processes"]
        .as_array()
        .unwrap()
        .iter()
        .find(|p| {
            p["status"] == "running"
                && p["command"]
                    .as_array()
                    .unwrap()
                    .iter()
                    .map(|v| v.as_str().unwrap().to_string())
                    .collect::<Vec<_>>()
                    == target_tokens
        })
        .expect("the beat process should be registered")
        .clone();
    let pid1 = entry["pid"].as_u64().unwrap();

    let restarted = harness.cli().args(["restart", &pid1.to_string()]).passes_json();
    let pid2 = restarted["pid"].as_u64().unwrap();
    assert_ne!(pid1, pid2, "restart must issue a new pid");

    // The running client should keep printing beats after the restart,
    // proving it noticed pid1 went away and switched to pid2's combined
    // log instead of exiting, per spec.md §4.8 step 8's restart-follow.
    let beat_after_restart = lines.wait_for(|l| l.contains("beat"), Duration::from_secs(5));
    assert!(
        beat_after_restart.is_some(),
        "client should keep tailing output after a transparent restart"
    );

    kill(Pid::from_raw(child.id() as i32), Signal::SIGINT).expect("send SIGINT to run client");
    let status = child.wait().expect("wait for run client to exit");
    assert!(status.success());

    harness.cli().args(["stop", &pid2.to_string(), "--force"]).passes();
}
