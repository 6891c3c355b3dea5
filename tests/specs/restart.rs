// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! spec.md §8 scenario 3: "Restart preserves label, changes pid."

use crate::prelude::Harness;

#[test]
fn restart_keeps_label_but_issues_a_new_pid() {
    let harness = Harness::start();

    let started = harness
        .cli()
        .args(["start", "sleep 60", "--label", "my-long-runner"])
        .passes_json();
    let pid1 = started["pid"].as_u64().unwrap() as u32;
    let label = started["label"].as_str().unwrap().to_string();
    assert_eq!(label, "my-long-runner");

    let restarted = harness.cli().args(["restart", &pid1.to_string()]).passes_json();
    let pid2 = restarted["pid"].as_u64().unwrap() as u32;
    assert_ne!(pid1, pid2, "restart must return a pid strictly different from the original");
    assert_eq!(restarted["label"], "my-long-runner");

    let listed = harness.cli().args(["list"]).passes_json();
    let running: Vec<&serde_json::Value> = listed["processes"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|p| p["status"] == "running")
        .collect();
    assert_eq!(running.len(), 1, "exactly one running entry after restart");
    assert_eq!(running[0]["label"], "my-long-runner");
    assert_eq!(running[0]["pid"].as_u64().unwrap() as u32, pid2);

    let original_status = harness.cli().args(["get_status", &pid1.to_string()]).passes_json();
    assert_eq!(original_status["status"], "terminated");

    harness.cli().args(["stop", &pid2.to_string(), "--force"]).passes();
}

#[test]
fn restart_by_label_forwards_environment() {
    let harness = Harness::start();

    let started = harness
        .cli()
        .args(["start", "sh -c 'echo $MY_VAR; sleep 30'", "--env", "MY_VAR=hello", "--label", "env-carry"])
        .passes_json();
    let pid1 = started["pid"].as_u64().unwrap() as u32;

    let restarted = harness.cli().args(["restart", "env-carry"]).passes_json();
    let pid2 = restarted["pid"].as_u64().unwrap() as u32;
    assert_ne!(pid1, pid2);

    let output = harness
        .cli()
        .args(["get_output", &pid2.to_string(), "--stream", "stdout"])
        .passes_json();
    let lines = output["output"].as_array().unwrap();
    assert!(
        lines.iter().any(|l| l.as_str().unwrap().contains("hello")),
        "restarted process should still see MY_VAR=hello, got: {lines:?}"
    );

    harness.cli().args(["stop", &pid2.to_string(), "--force"]).passes();
}
