// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed request bodies for the eight tools in spec.md §4.7's
//! ToolSurface table, one JSON object per tool posted to `/tools/<name>`.

use std::collections::HashMap;
use std::path::PathBuf;

use pp_core::Selector;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StreamKind {
    #[default]
    Combined,
    Stdout,
    Stderr,
}

impl StreamKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StreamKind::Combined => "combined",
            StreamKind::Stdout => "stdout",
            StreamKind::Stderr => "stderr",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "tool", rename_all = "snake_case")]
pub enum Request {
    Start {
        command: String,
        #[serde(default)]
        working_directory: Option<PathBuf>,
        #[serde(default)]
        environment: HashMap<String, String>,
        #[serde(default)]
        label: Option<String>,
    },
    Stop {
        #[serde(default)]
        pid: Option<u32>,
        #[serde(default)]
        label: Option<String>,
        #[serde(default)]
        command_or_label: Option<String>,
        #[serde(default)]
        working_directory: Option<PathBuf>,
        #[serde(default)]
        force: bool,
    },
    Restart {
        #[serde(default)]
        pid: Option<u32>,
        #[serde(default)]
        label: Option<String>,
        #[serde(default)]
        command_or_label: Option<String>,
        #[serde(default)]
        working_directory: Option<PathBuf>,
    },
    List,
    GetStatus {
        #[serde(default)]
        pid: Option<u32>,
        #[serde(default)]
        label: Option<String>,
        #[serde(default)]
        command_or_label: Option<String>,
        #[serde(default)]
        working_directory: Option<PathBuf>,
    },
    GetOutput {
        pid: u32,
        #[serde(default)]
        stream: StreamKind,
        #[serde(default)]
        lines: Option<usize>,
        #[serde(default)]
        before_time: Option<String>,
        #[serde(default)]
        since_time: Option<String>,
    },
    GetLogPaths {
        pid: u32,
    },
    KillPersistproc,
}

impl Request {
    /// Resolves the `pid | label | command_or_label` argument triple
    /// carried by the selector-accepting variants into a `Selector`.
    /// `None` for `Start`, `List`, `GetOutput`, `GetLogPaths`, and
    /// `KillPersistproc`, which address a process a different way (or
    /// not at all).
    pub fn selector(&self) -> Option<Selector> {
        match self {
            Request::Stop { pid, label, command_or_label, working_directory, .. }
            | Request::Restart { pid, label, command_or_label, working_directory }
            | Request::GetStatus { pid, label, command_or_label, working_directory } => {
                Selector::from_args(
                    *pid,
                    label.clone(),
                    command_or_label.clone(),
                    working_directory.clone(),
                )
            }
            Request::Start { .. }
            | Request::List
            | Request::GetOutput { .. }
            | Request::GetLogPaths { .. }
            | Request::KillPersistproc => None,
        }
    }
}

#[cfg(test)]
#[path = "request_tests.rs"]
mod tests;
