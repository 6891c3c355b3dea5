// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Stable tool-facing error kinds.
//!
//! Every tool result is a `Result<T, ToolError>` internally; only at the
//! wire boundary does a failure flatten to `{"error": "<message>"}`.

use thiserror::Error;

/// Errors a tool invocation can surface to the caller.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ToolError {
    #[error("a process with label '{label}' is already running (pid {pid})")]
    Duplicate { label: String, pid: u32 },

    #[error("working directory '{0}' does not exist")]
    BadWd(String),

    #[error("command not found: {0}")]
    CommandNotFound(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("failed to spawn process: {0}")]
    SpawnFailed(String),

    #[error("no matching process found")]
    NotFound,

    #[error("command_or_label matched multiple running processes; narrow with working_directory")]
    Ambiguous,

    #[error("timed out waiting for process to exit")]
    Timeout,

    #[error("stream must be 'stdout', 'stderr', or 'combined'")]
    BadStream,

    #[error("invalid ISO-8601 timestamp: {0}")]
    BadTimestamp(String),

    #[error("empty command")]
    EmptyCommand,
}

impl ToolError {
    /// The stable string kind, as referenced in spec.md's error table.
    pub fn kind(&self) -> &'static str {
        match self {
            ToolError::Duplicate { .. } => "duplicate",
            ToolError::BadWd(_) => "bad_wd",
            ToolError::CommandNotFound(_) => "command_not_found",
            ToolError::PermissionDenied(_) => "permission_denied",
            ToolError::SpawnFailed(_) => "spawn_failed",
            ToolError::NotFound => "not_found",
            ToolError::Ambiguous => "ambiguous",
            ToolError::Timeout => "timeout",
            ToolError::BadStream => "bad_stream",
            ToolError::BadTimestamp(_) => "bad_timestamp",
            ToolError::EmptyCommand => "empty_command",
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
