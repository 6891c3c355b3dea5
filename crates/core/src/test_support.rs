// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Test builders shared by `pp-daemon` and `pp-cli` test suites.

use std::collections::HashMap;
use std::path::PathBuf;

use crate::process::{ProcessEntry, ProcessStatus};

/// Builder for `ProcessEntry` fixtures used across unit and integration
/// tests.
pub struct ProcessEntryBuilder {
    entry: ProcessEntry,
}

impl ProcessEntryBuilder {
    pub fn new(pid: u32, command: &[&str]) -> Self {
        let command: Vec<String> = command.iter().map(|s| s.to_string()).collect();
        let command_str = command.join(" ");
        let label = format!("{command_str} in ");
        Self {
            entry: ProcessEntry {
                pid,
                command,
                command_str,
                working_directory: None,
                environment: HashMap::new(),
                label,
                start_time: "2024-01-01T00:00:00.000Z".into(),
                status: ProcessStatus::Running,
                log_prefix: format!("{pid}.test"),
                exit_code: None,
                exit_time: None,
            },
        }
    }

    pub fn working_directory(mut self, wd: impl Into<PathBuf>) -> Self {
        self.entry.working_directory = Some(wd.into());
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.entry.label = label.into();
        self
    }

    pub fn status(mut self, status: ProcessStatus) -> Self {
        self.entry.status = status;
        self
    }

    pub fn build(self) -> ProcessEntry {
        self.entry
    }
}
