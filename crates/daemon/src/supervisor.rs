// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lifecycle operations (Start, Stop, Restart, KillAll) and the background
//! Monitor, per spec.md §4.5.

use std::collections::HashMap;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use std::time::{Duration, Instant};

use nix::sys::signal::{killpg, Signal};
use nix::unistd::Pid;
use pp_core::{default_label, tokenize, Clock, ProcessEntry, ProcessStatus, Selector, ToolError};
use tokio::process::Command;
use tracing::{info, warn};

use crate::logpump::LogPump;
use crate::logstore::LogStore;
use crate::registry::Registry;

/// Wait interval between non-blocking polls of the child handle while
/// `Stop` waits for an exit. Short enough to stay responsive within the
/// graceful/kill timeouts without busy-spinning.
const POLL_STEP: Duration = Duration::from_millis(50);
const GRACEFUL_TIMEOUT: Duration = Duration::from_secs(8);
const KILL_TIMEOUT: Duration = Duration::from_secs(2);
const KILL_ALL_SELF_SIGNAL_DELAY: Duration = Duration::from_millis(150);

pub struct StopOutcome {
    pub pid: u32,
    pub exit_code: i32,
}

pub struct RestartOutcome {
    pub pid: u32,
    pub label: String,
}

pub struct Supervisor {
    registry: Arc<Registry>,
    log_store: LogStore,
    clock: Arc<dyn Clock>,
}

impl Supervisor {
    pub fn new(registry: Arc<Registry>, log_store: LogStore, clock: Arc<dyn Clock>) -> Self {
        Self { registry, log_store, clock }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn list(&self) -> Vec<ProcessEntry> {
        self.registry.snapshot()
    }

    /// Resolves a selector to the entry it names, per spec.md §4.4's
    /// `find_running` disambiguation: label first, then `(command,
    /// working_directory)`. Includes non-running entries so `Stop`/
    /// `GetStatus` on an already-exited pid/label stay idempotent.
    pub fn resolve(&self, selector: &Selector) -> Result<ProcessEntry, ToolError> {
        match selector {
            Selector::Pid(pid) => self.registry.get(*pid).ok_or(ToolError::NotFound),
            Selector::Label(label) => {
                self.registry.find_any_by_label(label).ok_or(ToolError::NotFound)
            }
            Selector::CommandOrLabel { command_or_label, working_directory } => {
                if let Some(entry) = self.registry.find_any_by_label(command_or_label) {
                    return Ok(entry);
                }
                let tokens = tokenize::split(command_or_label).ok_or(ToolError::NotFound)?;
                if tokens.is_empty() {
                    return Err(ToolError::NotFound);
                }
                let matches =
                    self.registry.find_any_by_command(&tokens, working_directory.as_deref());
                let ambiguous = matches.len() > 1 && working_directory.is_none();
                if ambiguous {
                    return Err(ToolError::Ambiguous);
                }
                matches.into_iter().next().ok_or(ToolError::NotFound)
            }
        }
    }

    #[allow(clippy::expect_used)]
    pub async fn start(
        &self,
        command_str: String,
        working_directory: Option<PathBuf>,
        environment: HashMap<String, String>,
        label: Option<String>,
    ) -> Result<ProcessEntry, ToolError> {
        let tokens = tokenize::split(&command_str).ok_or(ToolError::EmptyCommand)?;
        if tokens.is_empty() {
            return Err(ToolError::EmptyCommand);
        }

        let label = label.unwrap_or_else(|| default_label(&command_str, working_directory.as_deref()));

        if let Some(existing) = self.registry.find_running(Some(&label), None, None) {
            return Err(ToolError::Duplicate { label, pid: existing.pid });
        }

        if let Some(wd) = &working_directory {
            if !wd.is_dir() {
                return Err(ToolError::BadWd(wd.display().to_string()));
            }
        }

        let mut command = Command::new(&tokens[0]);
        command.args(&tokens[1..]);
        if let Some(wd) = &working_directory {
            command.current_dir(wd);
        }
        command.envs(&environment);
        command.stdin(Stdio::null()).stdout(Stdio::piped()).stderr(Stdio::piped());
        // New process group so a single Stop can signal the whole subtree
        // without touching the daemon itself. Stable safe API — no
        // `pre_exec`/`unsafe` needed, per spec.md §9's portability note.
        command.process_group(0);
        command.kill_on_drop(false);

        let mut child = command.spawn().map_err(|err| map_spawn_error(err, &tokens[0]))?;
        let pid = child.id().ok_or_else(|| ToolError::SpawnFailed("process exited immediately".into()))?;

        let stdout = child.stdout.take().expect("stdout piped at spawn");
        let stderr = child.stderr.take().expect("stderr piped at spawn");

        let log_prefix = pp_core::sanitize::log_prefix(pid, &command_str);
        let log_paths = self.log_store.log_paths(&log_prefix);

        // The pump's reader tasks run to EOF on their own; dropping the
        // handle here doesn't stop them, only the shared `combined` log is
        // kept around.
        let (_pump, combined) = LogPump::start(stdout, stderr, log_paths, Arc::clone(&self.clock))
            .await
            .map_err(|err| ToolError::SpawnFailed(err.to_string()))?;

        let entry = ProcessEntry {
            pid,
            command: tokens,
            command_str: command_str.clone(),
            working_directory,
            environment,
            label,
            start_time: self.clock.now(),
            status: ProcessStatus::Running,
            log_prefix,
            exit_code: None,
            exit_time: None,
        };

        let handle = Arc::new(tokio::sync::Mutex::new(child));
        if let Err(err) = self.registry.insert(entry.clone(), handle, Arc::clone(&combined)) {
            // Lost a race against a concurrent Start with the same label;
            // the child we just spawned is an orphan — signal it away.
            let _ = killpg(Pid::from_raw(pid as i32), Signal::SIGKILL);
            return Err(err);
        }

        combined.write_system(self.clock.as_ref(), &format!("Process started with command: {command_str}")).await;
        Ok(entry)
    }

    pub async fn stop(&self, selector: &Selector, force: bool) -> Result<StopOutcome, ToolError> {
        let entry = self.resolve(selector)?;
        if !entry.status.is_running() {
            return Ok(StopOutcome { pid: entry.pid, exit_code: entry.exit_code.unwrap_or(0) });
        }
        self.stop_pid(entry.pid, force).await
    }

    async fn stop_pid(&self, pid: u32, force: bool) -> Result<StopOutcome, ToolError> {
        let combined = self.registry.combined(pid);
        let first_signal = if force { Signal::SIGKILL } else { Signal::SIGTERM };

        match killpg(Pid::from_raw(pid as i32), first_signal) {
            Ok(()) => {
                if let Some(combined) = &combined {
                    combined
                        .write_system(
                            self.clock.as_ref(),
                            &format!("Sent signal {first_signal:?} to process group {pid}."),
                        )
                        .await;
                }
            }
            Err(nix::errno::Errno::ESRCH) => {
                let entry = self
                    .registry
                    .try_transition(pid, ProcessStatus::Terminated, 0, self.clock.now())
                    .ok_or(ToolError::NotFound)?;
                if let Some(combined) = &combined {
                    combined
                        .write_system(
                            self.clock.as_ref(),
                            "Process was already gone when stop was requested.",
                        )
                        .await;
                }
                return Ok(StopOutcome { pid, exit_code: entry.exit_code.unwrap_or(0) });
            }
            Err(err) => return Err(ToolError::SpawnFailed(format!("failed to signal pgid {pid}: {err}"))),
        }

        if self.wait_for_exit(pid, GRACEFUL_TIMEOUT).await {
            return self.finalize_stop(pid).await;
        }

        if force {
            return Err(ToolError::Timeout);
        }

        if let Some(combined) = &combined {
            combined
                .write_system(self.clock.as_ref(), &format!("Escalated to SIGKILL for process group {pid}."))
                .await;
        }
        match killpg(Pid::from_raw(pid as i32), Signal::SIGKILL) {
            Ok(()) | Err(nix::errno::Errno::ESRCH) => {}
            Err(err) => return Err(ToolError::SpawnFailed(format!("failed to signal pgid {pid}: {err}"))),
        }

        if self.wait_for_exit(pid, KILL_TIMEOUT).await {
            return self.finalize_stop(pid).await;
        }

        if let Some(combined) = &combined {
            combined
                .write_system(self.clock.as_ref(), "Timed-out waiting for process to exit after SIGKILL.")
                .await;
        }
        Err(ToolError::Timeout)
    }

    async fn finalize_stop(&self, pid: u32) -> Result<StopOutcome, ToolError> {
        let entry = self.registry.get(pid).ok_or(ToolError::NotFound)?;
        if let Some(combined) = self.registry.combined(pid) {
            combined
                .write_system(self.clock.as_ref(), &format!("Process exited with code {}.", entry.exit_code.unwrap_or(0)))
                .await;
        }
        Ok(StopOutcome { pid, exit_code: entry.exit_code.unwrap_or(0) })
    }

    /// Non-blockingly polls the child handle until it reports exit or the
    /// timeout elapses, recording the transition to `Terminated` the first
    /// time this call (rather than the Monitor) observes it.
    async fn wait_for_exit(&self, pid: u32, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            match self.registry.get(pid) {
                Some(entry) if !entry.status.is_running() => return true,
                None => return true,
                _ => {}
            }
            if let Some(handle) = self.registry.handle(pid) {
                if let Ok(mut child) = handle.try_lock() {
                    if let Ok(Some(status)) = child.try_wait() {
                        self.registry.try_transition(
                            pid,
                            ProcessStatus::Terminated,
                            status.code().unwrap_or(0),
                            self.clock.now(),
                        );
                        return true;
                    }
                }
            }
            if Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(POLL_STEP).await;
        }
    }

    pub async fn restart(&self, selector: &Selector) -> Result<RestartOutcome, ToolError> {
        let entry = self.resolve(selector)?;
        // Stop forwards its own errors, except idempotent-already-stopped,
        // which falls through so Start still runs with the captured params.
        self.stop(&Selector::Pid(entry.pid), false).await?;

        // Restart carries the original environment forward.
        let started = self
            .start(entry.command_str.clone(), entry.working_directory.clone(), entry.environment.clone(), Some(entry.label.clone()))
            .await?;
        Ok(RestartOutcome { pid: started.pid, label: started.label })
    }

    pub async fn kill_all(&self) -> u32 {
        let snapshot = self.registry.snapshot();
        for entry in snapshot.into_iter().filter(|entry| entry.status.is_running()) {
            if let Err(err) = self.stop_pid(entry.pid, true).await {
                warn!(pid = entry.pid, %err, "kill_persistproc: failed to stop process");
            }
        }
        let server_pid = std::process::id();
        tokio::spawn(async move {
            tokio::time::sleep(KILL_ALL_SELF_SIGNAL_DELAY).await;
            info!("kill_persistproc: sending SIGTERM to own process {server_pid}");
            let _ = nix::sys::signal::kill(Pid::from_raw(server_pid as i32), Signal::SIGTERM);
        });
        server_pid
    }

    /// Background task: periodically reaps exited children and updates
    /// their registry status. Spawned once at server startup.
    pub async fn run_monitor(&self, poll_interval: Duration) {
        let mut ticker = tokio::time::interval(poll_interval);
        loop {
            ticker.tick().await;
            for entry in self.registry.snapshot().into_iter().filter(|entry| entry.status.is_running()) {
                let Some(handle) = self.registry.handle(entry.pid) else { continue };
                let Ok(mut child) = handle.try_lock() else { continue };
                match child.try_wait() {
                    Ok(Some(status)) => {
                        let code = status.code().unwrap_or(-1);
                        let new_status = if code == 0 { ProcessStatus::Exited } else { ProcessStatus::Failed };
                        if let Some(updated) =
                            self.registry.try_transition(entry.pid, new_status, code, self.clock.now())
                        {
                            if let Some(combined) = self.registry.combined(entry.pid) {
                                combined
                                    .write_system(
                                        self.clock.as_ref(),
                                        &format!("Process exited with code {}.", updated.exit_code.unwrap_or(code)),
                                    )
                                    .await;
                            }
                        }
                    }
                    Ok(None) => {}
                    Err(err) => warn!(pid = entry.pid, %err, "monitor: failed to poll child"),
                }
            }
        }
    }
}

fn map_spawn_error(err: std::io::Error, program: &str) -> ToolError {
    match err.kind() {
        std::io::ErrorKind::NotFound => ToolError::CommandNotFound(program.to_string()),
        std::io::ErrorKind::PermissionDenied => ToolError::PermissionDenied(program.to_string()),
        _ => ToolError::SpawnFailed(err.to_string()),
    }
}

#[cfg(test)]
#[path = "supervisor_tests.rs"]
mod tests;
