// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! spec.md §8 scenario 1: "Lifecycle round-trip."

use crate::prelude::Harness;

#[test]
fn start_list_stop_get_status_round_trip() {
    let harness = Harness::start();

    let empty = harness.cli().args(["list"]).passes_json();
    assert_eq!(empty["processes"].as_array().unwrap().len(), 0);

    let started = harness
        .cli()
        .args(["start", "sleep 30", "--working-directory", "/tmp"])
        .passes_json();
    let pid = started["pid"].as_u64().expect("pid") as u32;
    assert!(pid > 0);
    assert_eq!(started["label"], "sleep 30 in /tmp");

    let listed = harness.cli().args(["list"]).passes_json();
    let processes = listed["processes"].as_array().unwrap();
    assert_eq!(processes.len(), 1);
    assert_eq!(processes[0]["status"], "running");
    assert_eq!(processes[0]["label"], "sleep 30 in /tmp");
    assert_eq!(processes[0]["pid"].as_u64().unwrap() as u32, pid);

    let stopped = harness.cli().args(["stop", &pid.to_string()]).passes_json();
    assert!(stopped["exit_code"].is_number());

    let status = harness.cli().args(["get_status", &pid.to_string()]).passes_json();
    let status_str = status["status"].as_str().unwrap();
    assert!(
        matches!(status_str, "terminated" | "exited"),
        "unexpected status: {status_str}"
    );
}

#[test]
fn get_log_paths_returns_existing_files() {
    let harness = Harness::start();

    let started = harness.cli().args(["start", "sleep 5"]).passes_json();
    let pid = started["pid"].as_u64().unwrap() as u32;

    let paths = harness.cli().args(["get_log_paths", &pid.to_string()]).passes_json();
    for key in ["stdout", "stderr", "combined"] {
        let path = paths[key].as_str().unwrap();
        assert!(
            std::path::Path::new(path).exists(),
            "{key} log file should exist at {path}"
        );
    }

    harness.cli().args(["stop", &pid.to_string(), "--force"]).passes();
}
