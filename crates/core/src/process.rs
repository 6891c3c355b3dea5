// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The canonical record for one managed child process.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Lifecycle status of a managed process. See spec.md §3 "Status semantics".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessStatus {
    /// OS process alive.
    Running,
    /// Process ended on its own with exit code 0.
    Exited,
    /// Process ended because Stop was issued.
    Terminated,
    /// Process ended on its own with a non-zero exit code.
    Failed,
}

impl ProcessStatus {
    pub fn is_running(&self) -> bool {
        matches!(self, ProcessStatus::Running)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessStatus::Running => "running",
            ProcessStatus::Exited => "exited",
            ProcessStatus::Terminated => "terminated",
            ProcessStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for ProcessStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Absolute paths to a process's three log files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogPaths {
    pub stdout: PathBuf,
    pub stderr: PathBuf,
    pub combined: PathBuf,
}

/// The canonical record for one managed child, per spec.md §3.
///
/// `handle` (the OS process handle used for polling/signalling) is owned by
/// the daemon's `Supervisor`/`Registry`, not by this type — entries that
/// cross the wire boundary are built field-by-field in `pp-wire` so there is
/// no risk of accidentally serializing something unserializable.
#[derive(Debug, Clone)]
pub struct ProcessEntry {
    pub pid: u32,
    /// Tokenized argv, the result of shell-splitting `command_str`.
    pub command: Vec<String>,
    /// The command string as the caller supplied it (preserved verbatim).
    pub command_str: String,
    pub working_directory: Option<PathBuf>,
    /// Only the environment overrides supplied at Start, not the full
    /// merged environment the child actually inherited.
    pub environment: HashMap<String, String>,
    pub label: String,
    pub start_time: String,
    pub status: ProcessStatus,
    pub log_prefix: String,
    pub exit_code: Option<i32>,
    pub exit_time: Option<String>,
}

/// The default label assigned when Start is not given one explicitly:
/// `"<command> in <wd>"`, per spec.md §3.
pub fn default_label(command_str: &str, working_directory: Option<&std::path::Path>) -> String {
    let wd = working_directory.map(|p| p.display().to_string()).unwrap_or_default();
    format!("{command_str} in {wd}")
}

impl ProcessEntry {
    /// Working directory as the empty string when unset, per spec.md §3/§4.7.
    pub fn working_directory_str(&self) -> String {
        self.working_directory.as_ref().map(|p| p.display().to_string()).unwrap_or_default()
    }

    /// The (command, working_directory) identity used for duplicate
    /// detection and restart-target matching.
    pub fn identity(&self) -> (&[String], Option<&PathBuf>) {
        (&self.command, self.working_directory.as_ref())
    }
}

#[cfg(test)]
#[path = "process_tests.rs"]
mod tests;
