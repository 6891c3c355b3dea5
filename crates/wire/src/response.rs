// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Success shapes for the eight tools, wrapped in `Outcome<T>` on the
//! wire (see [`crate::Outcome`]).

use pp_core::ProcessStatus;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartResult {
    pub pid: u32,
    pub label: String,
    pub log_stdout: String,
    pub log_stderr: String,
    pub log_combined: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopResult {
    pub pid: u32,
    pub exit_code: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestartResult {
    pub pid: u32,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessSummary {
    pub pid: u32,
    pub label: String,
    pub command: Vec<String>,
    pub working_directory: String,
    pub status: ProcessStatus,
    pub start_time: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListResult {
    pub processes: Vec<ProcessSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetStatusResult {
    pub pid: u32,
    pub label: String,
    pub command: Vec<String>,
    pub working_directory: String,
    pub status: ProcessStatus,
    pub start_time: String,
    pub exit_code: Option<i32>,
    pub exit_time: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetOutputResult {
    pub output: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetLogPathsResult {
    pub stdout: String,
    pub stderr: String,
    pub combined: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KillPersistprocResult {
    pub pid: u32,
}

#[cfg(test)]
#[path = "response_tests.rs"]
mod tests;
