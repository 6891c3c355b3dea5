// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Named operations with stable argument/result shapes, per spec.md §4.7.
//!
//! Argument validation happens here; business logic is delegated to
//! [`crate::supervisor::Supervisor`] and [`crate::logreader::LogReader`].
//! Every branch returns a `pp_wire::Outcome<T>` so the HTTP layer only has
//! to serialize the result, never branch on success/failure itself.

use std::sync::Arc;

use pp_core::{Selector, ToolError};
use pp_wire::{
    GetLogPathsResult, GetOutputResult, GetStatusResult, KillPersistprocResult, ListResult,
    Outcome, ProcessSummary, Request, RestartResult, StartResult, StopResult,
};

use crate::logreader::LogReader;
use crate::supervisor::Supervisor;

pub struct ToolSurface {
    supervisor: Arc<Supervisor>,
    log_reader: Arc<LogReader>,
}

impl ToolSurface {
    pub fn new(supervisor: Arc<Supervisor>, log_reader: Arc<LogReader>) -> Self {
        Self { supervisor, log_reader }
    }

    /// Dispatches a tool request, returning the success shape as JSON or
    /// `{"error": "..."}`; never a transport-level failure, per spec.md §4.7.
    pub async fn dispatch(&self, request: Request) -> serde_json::Value {
        match request {
            Request::Start { command, working_directory, environment, label } => {
                self.start(command, working_directory, environment, label).await
            }
            Request::Stop { force, .. } => {
                let selector = match self.selector_or_missing(&request) {
                    Ok(s) => s,
                    Err(v) => return v,
                };
                self.stop(selector, force).await
            }
            Request::Restart { .. } => {
                let selector = match self.selector_or_missing(&request) {
                    Ok(s) => s,
                    Err(v) => return v,
                };
                self.restart(selector).await
            }
            Request::List => self.list(),
            Request::GetStatus { .. } => {
                let selector = match self.selector_or_missing(&request) {
                    Ok(s) => s,
                    Err(v) => return v,
                };
                self.get_status(selector)
            }
            Request::GetOutput { pid, stream, lines, before_time, since_time } => {
                self.get_output(pid, stream.as_str(), lines, since_time, before_time).await
            }
            Request::GetLogPaths { pid } => self.get_log_paths(pid),
            Request::KillPersistproc => self.kill_persistproc().await,
        }
    }

    fn selector_or_missing(&self, request: &Request) -> Result<Selector, serde_json::Value> {
        request.selector().ok_or_else(|| to_json::<()>(Err(ToolError::NotFound)))
    }

    async fn start(
        &self,
        command: String,
        working_directory: Option<std::path::PathBuf>,
        environment: std::collections::HashMap<String, String>,
        label: Option<String>,
    ) -> serde_json::Value {
        let result = self.supervisor.start(command, working_directory, environment, label).await;
        to_json(result.map(|entry| {
            let paths = self.log_reader.log_paths_for_entry(&entry);
            StartResult {
                pid: entry.pid,
                label: entry.label,
                log_stdout: paths.stdout.display().to_string(),
                log_stderr: paths.stderr.display().to_string(),
                log_combined: paths.combined.display().to_string(),
            }
        }))
    }

    async fn stop(&self, selector: Selector, force: bool) -> serde_json::Value {
        let result = self.supervisor.stop(&selector, force).await;
        to_json(result.map(|outcome| StopResult {
            pid: outcome.pid,
            exit_code: Some(outcome.exit_code),
        }))
    }

    async fn restart(&self, selector: Selector) -> serde_json::Value {
        let result = self.supervisor.restart(&selector).await;
        to_json(result.map(|outcome| RestartResult { pid: outcome.pid, label: outcome.label }))
    }

    fn list(&self) -> serde_json::Value {
        let processes = self
            .supervisor
            .list()
            .into_iter()
            .map(|entry| ProcessSummary {
                pid: entry.pid,
                label: entry.label,
                command: entry.command,
                working_directory: entry.working_directory_str(),
                status: entry.status,
                start_time: entry.start_time,
            })
            .collect();
        to_json::<ListResult>(Ok(ListResult { processes }))
    }

    fn get_status(&self, selector: Selector) -> serde_json::Value {
        let result = self.supervisor.resolve(&selector).map(|entry| GetStatusResult {
            pid: entry.pid,
            label: entry.label,
            command: entry.command,
            working_directory: entry.working_directory_str(),
            status: entry.status,
            start_time: entry.start_time,
            exit_code: entry.exit_code,
            exit_time: entry.exit_time,
        });
        to_json(result)
    }

    async fn get_output(
        &self,
        pid: u32,
        stream: &str,
        lines: Option<usize>,
        since_time: Option<String>,
        before_time: Option<String>,
    ) -> serde_json::Value {
        let result = self
            .log_reader
            .get_output(pid, stream, lines, since_time.as_deref(), before_time.as_deref())
            .await;
        to_json(result.map(|output| GetOutputResult { output }))
    }

    fn get_log_paths(&self, pid: u32) -> serde_json::Value {
        let result = self.log_reader.get_log_paths(pid).map(|paths| GetLogPathsResult {
            stdout: paths.stdout.display().to_string(),
            stderr: paths.stderr.display().to_string(),
            combined: paths.combined.display().to_string(),
        });
        to_json(result)
    }

    async fn kill_persistproc(&self) -> serde_json::Value {
        let server_pid = self.supervisor.kill_all().await;
        to_json::<KillPersistprocResult>(Ok(KillPersistprocResult { pid: server_pid }))
    }
}

fn to_json<T: serde::Serialize>(result: Result<T, ToolError>) -> serde_json::Value {
    let outcome: Outcome<T> = result.map_err(|err| err.to_string()).into();
    serde_json::to_value(outcome).unwrap_or_else(|err| {
        serde_json::json!({"error": format!("failed to encode tool result: {err}")})
    })
}

#[cfg(test)]
#[path = "tool_surface_tests.rs"]
mod tests;
