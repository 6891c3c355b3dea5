// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! spec.md §8 scenario 4: "Output filtering."

use crate::prelude::{wait_for, Harness, SPEC_WAIT_MAX_MS};

#[test]
fn lines_filter_returns_the_most_recent_n() {
    let harness = Harness::start();

    let started = harness
        .cli()
        .args([
            "start",
            "sh -c 'i=0; while [ $i -lt 5 ]; do echo line$i; i=$((i+1)); sleep 0.2; done'",
        ])
        .passes_json();
    let pid = started["pid"].as_u64().unwrap() as u32;

    let all_arrived = wait_for(SPEC_WAIT_MAX_MS, || {
        // Default `--lines 100` comfortably exceeds the 5 lines this
        // child ever writes, so this reads back the whole file.
        let output = harness
            .cli()
            .args(["get_output", &pid.to_string(), "--stream", "stdout"])
            .passes_json();
        output["output"].as_array().unwrap().len() >= 5
    });
    assert!(all_arrived, "all 5 lines should have landed on disk");

    let last_three = harness
        .cli()
        .args(["get_output", &pid.to_string(), "--stream", "stdout", "--lines", "3"])
        .passes_json();
    let lines: Vec<String> = last_three["output"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap().to_string())
        .collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].contains("line2"));
    assert!(lines[1].contains("line3"));
    assert!(lines[2].contains("line4"));
}

#[test]
fn since_time_equal_to_before_time_returns_empty() {
    let harness = Harness::start();

    let started = harness.cli().args(["start", "echo hello"]).passes_json();
    let pid = started["pid"].as_u64().unwrap() as u32;

    let landed = wait_for(SPEC_WAIT_MAX_MS, || {
        let output = harness
            .cli()
            .args(["get_output", &pid.to_string(), "--stream", "stdout"])
            .passes_json();
        !output["output"].as_array().unwrap().is_empty()
    });
    assert!(landed, "the line should land on disk");

    let one_line = harness
        .cli()
        .args(["get_output", &pid.to_string(), "--stream", "stdout"])
        .passes_json();
    let line = one_line["output"][0].as_str().unwrap();
    let timestamp = line.split(' ').next().unwrap().to_string();

    let empty = harness
        .cli()
        .args([
            "get_output",
            &pid.to_string(),
            "--stream",
            "stdout",
            "--since-time",
            &timestamp,
            "--before-time",
            &timestamp,
        ])
        .passes_json();
    assert!(empty["output"].as_array().unwrap().is_empty());

    let far_future = harness
        .cli()
        .args(["get_output", &pid.to_string(), "--stream", "stdout", "--since-time", "2999-01-01T00:00:00.000Z"])
        .passes_json();
    assert!(far_future["output"].as_array().unwrap().is_empty());
}

#[test]
fn bad_timestamp_is_rejected() {
    let harness = Harness::start();
    let started = harness.cli().args(["start", "sleep 5"]).passes_json();
    let pid = started["pid"].as_u64().unwrap() as u32;

    let stderr = harness
        .cli()
        .args(["get_output", &pid.to_string(), "--since-time", "not-a-timestamp"])
        .fails();
    assert!(stderr.contains("timestamp"), "got: {stderr}");

    harness.cli().args(["stop", &pid.to_string(), "--force"]).passes();
}

#[test]
fn bad_stream_is_rejected() {
    let harness = Harness::start();
    let started = harness.cli().args(["start", "sleep 5"]).passes_json();
    let pid = started["pid"].as_u64().unwrap() as u32;

    let stderr = harness
        .cli()
        .args(["get_output", &pid.to_string(), "--stream", "bogus"])
        .fails();
    assert!(stderr.contains("stream"), "got: {stderr}");

    harness.cli().args(["stop", &pid.to_string(), "--force"]).passes();
}

#[test]
fn lines_zero_returns_empty_even_with_content_present() {
    let harness = Harness::start();
    let started = harness.cli().args(["start", "echo hello"]).passes_json();
    let pid = started["pid"].as_u64().unwrap() as u32;

    let landed = wait_for(SPEC_WAIT_MAX_MS, || {
        let output = harness
            .cli()
            .args(["get_output", &pid.to_string(), "--stream", "stdout"])
            .passes_json();
        !output["output"].as_array().unwrap().is_empty()
    });
    assert!(landed);

    let none = harness
        .cli()
        .args(["get_output", &pid.to_string(), "--stream", "stdout", "--lines", "0"])
        .passes_json();
    assert!(none["output"].as_array().unwrap().is_empty());
}
