// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `GetOutput`/`GetLogPaths`, per spec.md §4.6.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use pp_core::{LogPaths, ToolError};

use crate::logstore::LogStore;
use crate::registry::Registry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Stdout,
    Stderr,
    Combined,
}

impl Stream {
    pub fn parse(raw: &str) -> Result<Self, ToolError> {
        match raw {
            "stdout" => Ok(Stream::Stdout),
            "stderr" => Ok(Stream::Stderr),
            "combined" => Ok(Stream::Combined),
            _ => Err(ToolError::BadStream),
        }
    }
}

pub struct LogReader {
    registry: Arc<Registry>,
    log_store: LogStore,
    /// The daemon's own rotating operational log, read back when the
    /// caller asks for `get_output` with `pid == 0`.
    server_log_path: PathBuf,
}

impl LogReader {
    pub fn new(registry: Arc<Registry>, log_store: LogStore, server_log_path: PathBuf) -> Self {
        Self { registry, log_store, server_log_path }
    }

    pub fn get_log_paths(&self, pid: u32) -> Result<LogPaths, ToolError> {
        let entry = self.registry.get(pid).ok_or(ToolError::NotFound)?;
        Ok(self.log_store.log_paths(&entry.log_prefix))
    }

    /// Resolves log paths for an entry the caller already has in hand
    /// (e.g. the just-spawned entry returned by `Supervisor::start`),
    /// without a redundant registry lookup.
    pub fn log_paths_for_entry(&self, entry: &pp_core::ProcessEntry) -> LogPaths {
        self.log_store.log_paths(&entry.log_prefix)
    }

    pub async fn get_output(
        &self,
        pid: u32,
        stream: &str,
        lines: Option<usize>,
        since_time: Option<&str>,
        before_time: Option<&str>,
    ) -> Result<Vec<String>, ToolError> {
        let path = if pid == 0 {
            self.server_log_path.clone()
        } else {
            let entry = self.registry.get(pid).ok_or(ToolError::NotFound)?;
            let paths = self.log_store.log_paths(&entry.log_prefix);
            match Stream::parse(stream)? {
                Stream::Stdout => paths.stdout,
                Stream::Stderr => paths.stderr,
                Stream::Combined => paths.combined,
            }
        };

        let since = since_time.map(parse_timestamp).transpose()?;
        let before = before_time.map(parse_timestamp).transpose()?;

        let contents = tokio::fs::read_to_string(&path).await.unwrap_or_default();
        let mut filtered: Vec<&str> = contents.lines().collect();

        if since.is_some() || before.is_some() {
            filtered.retain(|line| {
                let Some(ts) = leading_timestamp(line) else { return false };
                let after_since = match since {
                    Some(since) => ts >= since,
                    None => true,
                };
                let before_cutoff = match before {
                    Some(before) => ts < before,
                    None => true,
                };
                after_since && before_cutoff
            });
        }

        let selected: Vec<String> = match lines {
            Some(n) => filtered.iter().rev().take(n).rev().map(|s| s.to_string()).collect(),
            None => filtered.into_iter().map(|s| s.to_string()).collect(),
        };
        Ok(selected)
    }
}

/// Extracts and parses the leading `<ISO-8601><space>` prefix every log
/// line carries. Lines with no parseable leading timestamp (e.g. a line
/// whose content happens to wrap without one) don't match a filter.
fn leading_timestamp(line: &str) -> Option<DateTime<Utc>> {
    let prefix = line.split(' ').next()?;
    DateTime::parse_from_rfc3339(prefix).ok().map(|dt| dt.with_timezone(&Utc))
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, ToolError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| ToolError::BadTimestamp(raw.to_string()))
}

#[cfg(test)]
#[path = "logreader_tests.rs"]
mod tests;
