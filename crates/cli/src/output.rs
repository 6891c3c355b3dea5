// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared result-printing helpers for the direct tool-invocation commands.

use serde::Serialize;

use crate::client::ClientError;

/// Prints `value` as pretty JSON when `json` is set, else delegates to
/// `text` for the human-readable rendering. Collapsed to a single boolean
/// flag since this surface doesn't need a richer `OutputFormat`.
pub fn print_result<T: Serialize>(json: bool, value: &T, text: impl FnOnce(&T)) {
    if json {
        match serde_json::to_string_pretty(value) {
            Ok(s) => println!("{s}"),
            Err(err) => eprintln!("error: failed to encode result as json: {err}"),
        }
    } else {
        text(value);
    }
}

/// Reports a failed tool call to stderr and returns the process exit code,
/// per spec.md §6's "Exit codes: 0 on success, 1 on client-detected
/// server-unreachable, non-zero on operation error" and §7's guidance that
/// an unreachable server should print "Start the server with: ...".
pub fn report_client_error(err: &ClientError, port: u16) -> i32 {
    if err.is_unreachable() {
        eprintln!("error: could not connect to the persistproc server on port {port}");
        eprintln!("Start the server with: persistproc serve --port {port}");
    } else {
        eprintln!("error: {err}");
    }
    1
}

/// Truncates `s` to at most `max` characters, appending an ellipsis,
/// for fixed-width table columns.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        s.chars().take(max.saturating_sub(1)).collect::<String>() + "…"
    }
}

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;
