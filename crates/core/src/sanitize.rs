// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Filesystem-safe command sanitization, used to build `log_prefix`.

const MAX_COMMAND_LEN: usize = 50;

/// Collapse whitespace runs to `_`, drop characters outside
/// `[A-Za-z0-9_-]`, and truncate to 50 characters.
pub fn sanitize_command(command: &str) -> String {
    // Pass 1: collapse whitespace runs to a single '_'.
    let mut collapsed = String::with_capacity(command.len());
    let mut last_was_space = false;
    for ch in command.chars() {
        if ch.is_whitespace() {
            last_was_space = true;
            continue;
        }
        if last_was_space {
            collapsed.push('_');
            last_was_space = false;
        }
        collapsed.push(ch);
    }

    // Pass 2: drop anything outside [A-Za-z0-9_-].
    let filtered: String =
        collapsed.chars().filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-').collect();

    filtered.chars().take(MAX_COMMAND_LEN).collect()
}

/// Build the per-entry `log_prefix`: `"<pid>.<sanitized-command>"`.
pub fn log_prefix(pid: u32, command: &str) -> String {
    format!("{pid}.{}", sanitize_command(command))
}

#[cfg(test)]
#[path = "sanitize_tests.rs"]
mod tests;
