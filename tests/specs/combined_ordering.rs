// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! spec.md §8 scenario 5: "Combined log ordering."

use crate::prelude::{wait_for, Harness, SPEC_WAIT_MAX_MS};

#[test]
fn combined_log_interleaves_in_capture_order_bracketed_by_system_lines() {
    let harness = Harness::start();

    let started = harness
        .cli()
        .args(["start", "sh -c 'echo A; echo B 1>&2'"])
        .passes_json();
    let pid = started["pid"].as_u64().unwrap() as u32;

    let exited = wait_for(SPEC_WAIT_MAX_MS, || {
        let status = harness.cli().args(["get_status", &pid.to_string()]).passes_json();
        status["status"] != "running"
    });
    assert!(exited, "the short-lived child should have exited");

    let combined = harness
        .cli()
        .args(["get_output", &pid.to_string(), "--stream", "combined"])
        .passes_json();
    let lines: Vec<String> = combined["output"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap().to_string())
        .collect();

    assert!(lines.len() >= 4, "expected started + A + B + exited, got: {lines:?}");
    assert!(lines.first().unwrap().contains("[SYSTEM]"), "first line should be the start marker");
    assert!(lines.first().unwrap().contains("started"), "first line: {}", lines[0]);
    assert!(lines.last().unwrap().contains("[SYSTEM]"), "last line should be the exit marker");
    assert!(lines.last().unwrap().contains("exited"), "last line: {}", lines.last().unwrap());

    let a_pos = lines.iter().position(|l| l.ends_with(" A")).expect("A line present");
    let b_pos = lines.iter().position(|l| l.ends_with(" B")).expect("B line present");
    assert!(a_pos < b_pos, "A should be captured before B: {lines:?}");
    assert!(a_pos > 0 && b_pos < lines.len() - 1, "content lines bracketed by system lines");

    // Every non-SYSTEM line starts with a parseable ISO-8601 timestamp.
    for line in &lines {
        if line.contains("[SYSTEM]") {
            continue;
        }
        let prefix = line.split(' ').next().unwrap();
        assert!(
            chrono::DateTime::parse_from_rfc3339(prefix).is_ok(),
            "line has no parseable leading timestamp: {line}"
        );
    }
}
