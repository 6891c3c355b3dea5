// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shell-style tokenization of command strings, shared by the daemon (Start)
//! and the CLI (building a command string from `run <program> [args...]`).

/// Shell-split a command string, respecting quoting and backslash escapes.
/// Mirrors Python's `shlex.split`, which `original_source` uses throughout.
pub fn split(command: &str) -> Option<Vec<String>> {
    shlex::split(command)
}

/// Join argv tokens back into a shell-escaped command string, the inverse
/// of [`split`]. Falls back to a plain space-join if a token can't be
/// safely quoted (e.g. contains a NUL byte).
pub fn join(tokens: &[String]) -> String {
    shlex::try_join(tokens.iter().map(|s| s.as_str())).unwrap_or_else(|_| tokens.join(" "))
}

#[cfg(test)]
#[path = "tokenize_tests.rs"]
mod tests;
