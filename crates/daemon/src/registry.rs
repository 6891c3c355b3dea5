// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Thread-safe map `pid -> ProcessEntry`, per spec.md §4.4.
//!
//! `parking_lot::Mutex` guards the map. Callers outside the lock only
//! ever see read-only snapshots; mutation happens exclusively through
//! [`Registry::update`]-style helpers below.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;
use pp_core::{ProcessEntry, ProcessStatus, ToolError};
use tokio::process::Child;
use tokio::sync::Mutex as AsyncMutex;

use crate::logpump::CombinedLog;

/// The OS-level resources a running entry owns, alongside its data record.
struct Slot {
    entry: ProcessEntry,
    handle: Option<Arc<AsyncMutex<Child>>>,
    combined: Option<Arc<CombinedLog>>,
}

#[derive(Default)]
pub struct Registry {
    inner: Mutex<HashMap<u32, Slot>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a freshly started entry. Fails with `Duplicate` if a
    /// `running` entry already holds this label — checked again under the
    /// lock to close the race window between the pre-spawn check in
    /// `Supervisor::start` and this call.
    pub fn insert(
        &self,
        entry: ProcessEntry,
        handle: Arc<AsyncMutex<Child>>,
        combined: Arc<CombinedLog>,
    ) -> Result<(), ToolError> {
        let mut map = self.inner.lock();
        if let Some(existing) = map.values().find(|slot| {
            slot.entry.status.is_running() && slot.entry.label == entry.label
        }) {
            return Err(ToolError::Duplicate { label: entry.label, pid: existing.entry.pid });
        }
        let pid = entry.pid;
        map.insert(pid, Slot { entry, handle: Some(handle), combined: Some(combined) });
        Ok(())
    }

    pub fn snapshot(&self) -> Vec<ProcessEntry> {
        self.inner.lock().values().map(|slot| slot.entry.clone()).collect()
    }

    pub fn get(&self, pid: u32) -> Option<ProcessEntry> {
        self.inner.lock().get(&pid).map(|slot| slot.entry.clone())
    }

    pub fn handle(&self, pid: u32) -> Option<Arc<AsyncMutex<Child>>> {
        self.inner.lock().get(&pid).and_then(|slot| slot.handle.clone())
    }

    pub fn combined(&self, pid: u32) -> Option<Arc<CombinedLog>> {
        self.inner.lock().get(&pid).and_then(|slot| slot.combined.clone())
    }

    /// Label-first, then `(command, working_directory)`-tuple lookup among
    /// `running` entries, per spec.md §4.4's `find_running` contract.
    pub fn find_running(
        &self,
        label: Option<&str>,
        command: Option<&[String]>,
        working_directory: Option<&Path>,
    ) -> Option<ProcessEntry> {
        let map = self.inner.lock();
        if let Some(label) = label {
            if let Some(slot) =
                map.values().find(|slot| slot.entry.status.is_running() && slot.entry.label == label)
            {
                return Some(slot.entry.clone());
            }
            return None;
        }
        let command = command?;
        map.values()
            .filter(|slot| slot.entry.status.is_running() && slot.entry.command == command)
            .filter(|slot| match working_directory {
                Some(wd) => slot.entry.working_directory.as_deref() == Some(wd),
                None => true,
            })
            .map(|slot| slot.entry.clone())
            .next()
    }

    /// All running entries matching `(command, working_directory)`, used to
    /// detect `ambiguous` command_or_label selectors (more than one match
    /// with no `working_directory` supplied to disambiguate).
    pub fn find_all_running_by_command(
        &self,
        command: &[String],
        working_directory: Option<&Path>,
    ) -> Vec<ProcessEntry> {
        let map = self.inner.lock();
        map.values()
            .filter(|slot| slot.entry.status.is_running() && slot.entry.command == command)
            .filter(|slot| match working_directory {
                Some(wd) => slot.entry.working_directory.as_deref() == Some(wd),
                None => true,
            })
            .map(|slot| slot.entry.clone())
            .collect()
    }

    /// Any entry (running or not) matching this label, preferring a running
    /// one, else the most recently started. Used by selector resolution for
    /// idempotent `Stop`/`GetStatus` against already-exited entries.
    pub fn find_any_by_label(&self, label: &str) -> Option<ProcessEntry> {
        let map = self.inner.lock();
        let mut matches: Vec<&ProcessEntry> =
            map.values().map(|slot| &slot.entry).filter(|entry| entry.label == label).collect();
        if let Some(running) = matches.iter().find(|entry| entry.status.is_running()) {
            return Some((*running).clone());
        }
        matches.sort_by(|a, b| a.start_time.cmp(&b.start_time));
        matches.last().map(|entry| (*entry).clone())
    }

    pub fn find_any_by_command(
        &self,
        command: &[String],
        working_directory: Option<&Path>,
    ) -> Vec<ProcessEntry> {
        let map = self.inner.lock();
        map.values()
            .map(|slot| &slot.entry)
            .filter(|entry| entry.command == command)
            .filter(|entry| match working_directory {
                Some(wd) => entry.working_directory.as_deref() == Some(wd),
                None => true,
            })
            .cloned()
            .collect()
    }

    /// Atomically transitions `pid` out of `running` if it is still
    /// running, clearing its handle. Returns the entry's final state
    /// whether this call won the race or another mutator already applied
    /// one, per spec.md §4.5's concurrency rules.
    pub fn try_transition(
        &self,
        pid: u32,
        status: ProcessStatus,
        exit_code: i32,
        exit_time: String,
    ) -> Option<ProcessEntry> {
        let mut map = self.inner.lock();
        let slot = map.get_mut(&pid)?;
        if slot.entry.status.is_running() {
            slot.entry.status = status;
            slot.entry.exit_code = Some(exit_code);
            slot.entry.exit_time = Some(exit_time);
            slot.handle = None;
        }
        Some(slot.entry.clone())
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
