// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! spec.md §8 scenario 2: "Duplicate rejection."

use crate::prelude::Harness;

#[test]
fn starting_the_same_command_and_cwd_twice_is_rejected() {
    let harness = Harness::start();

    let first = harness
        .cli()
        .args(["start", "sleep 30", "--working-directory", "/tmp"])
        .passes_json();
    let pid = first["pid"].as_u64().unwrap() as u32;

    let stderr = harness
        .cli()
        .args(["start", "sleep 30", "--working-directory", "/tmp"])
        .fails();
    assert!(
        stderr.contains("already running"),
        "expected a duplicate-label error, got: {stderr}"
    );

    harness.cli().args(["stop", &pid.to_string(), "--force"]).passes();

    // Once the original has stopped, the same command/cwd starts cleanly.
    let second = harness
        .cli()
        .args(["start", "sleep 30", "--working-directory", "/tmp"])
        .passes_json();
    assert_ne!(second["pid"].as_u64().unwrap() as u32, pid);
    harness
        .cli()
        .args(["stop", &second["pid"].as_u64().unwrap().to_string(), "--force"])
        .passes();
}

#[test]
fn explicit_label_collision_is_also_rejected() {
    let harness = Harness::start();

    let first = harness
        .cli()
        .args(["start", "sleep 30", "--label", "my-worker"])
        .passes_json();
    let pid = first["pid"].as_u64().unwrap() as u32;

    let stderr = harness
        .cli()
        .args(["start", "sleep 60", "--label", "my-worker"])
        .fails();
    assert!(stderr.contains("already running"));

    harness.cli().args(["stop", &pid.to_string(), "--force"]).passes();
}
