// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The union of ways a client can name a target process entry.

use std::path::PathBuf;

/// Names a target process entry for `stop`/`restart`/`get_status`/etc.
///
/// Mirrors the `pid | command_or_label [+ working_directory] | label`
/// argument shapes in spec.md §4.7's ToolSurface table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    Pid(u32),
    Label(String),
    CommandOrLabel { command_or_label: String, working_directory: Option<PathBuf> },
}

impl Selector {
    pub fn from_args(
        pid: Option<u32>,
        label: Option<String>,
        command_or_label: Option<String>,
        working_directory: Option<PathBuf>,
    ) -> Option<Selector> {
        if let Some(pid) = pid {
            return Some(Selector::Pid(pid));
        }
        if let Some(label) = label {
            return Some(Selector::Label(label));
        }
        command_or_label.map(|command_or_label| Selector::CommandOrLabel {
            command_or_label,
            working_directory,
        })
    }
}

#[cfg(test)]
#[path = "selector_tests.rs"]
mod tests;
