// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Client-side algorithm for `persistproc run`, per spec.md §4.8.
//!
//! Ported step-by-step from `original_source/persistproc/run.py`'s
//! `run()`: ensure a matching process is running (adopt, `--fresh`
//! restart, or start fresh), tail its combined log, follow transparent
//! restarts, and resolve an interactive exit policy on SIGINT. The
//! original's `threading.Event`/SIGINT-handler pair becomes a
//! `tokio_util::sync::CancellationToken` consumed at every suspension
//! point, per the REDESIGN FLAG in spec.md §9.

use std::collections::HashMap;
use std::io::{IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use pp_wire::{ProcessSummary, Request};
use tokio::io::{AsyncBufReadExt, AsyncSeekExt, BufReader};
use tokio_util::sync::CancellationToken;

use crate::client::DaemonClient;

/// How long to wait for the combined log file to appear after Start,
/// per spec.md §4.8 step 5.
const COMBINED_FILE_WAIT: Duration = Duration::from_secs(5);
/// Status-poll cadence for the main loop, per spec.md §4.8 step 8.
const STATUS_POLL_INTERVAL: Duration = Duration::from_secs(1);
/// Bound on waiting for exit confirmation after `--on-exit=stop`,
/// per spec.md §4.8 step 9.
const STOP_CONFIRM_TIMEOUT: Duration = Duration::from_secs(6);

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OnExit {
    /// Prompt interactively; the original_source default.
    Ask,
    Stop,
    Detach,
}

pub struct TailOptions {
    pub program: String,
    pub args: Vec<String>,
    pub fresh: bool,
    pub on_exit: OnExit,
    pub raw: bool,
    pub label: Option<String>,
}

/// Runs the full TailClient algorithm to completion, returning the
/// process's exit code.
pub async fn run(client: DaemonClient, opts: TailOptions) -> anyhow::Result<i32> {
    let mut tokens = vec![opts.program.clone()];
    tokens.extend(opts.args.clone());
    let command_str = pp_core::tokenize::join(&tokens);
    let cwd = std::env::current_dir()?;
    let cwd_str = cwd.display().to_string();

    let existing = find_matching(&client, &tokens, &cwd_str).await?;

    let pid = match existing {
        Some(entry) if opts.fresh => {
            let _ = client
                .send::<pp_wire::StopResult>(&Request::Stop {
                    pid: Some(entry.pid),
                    label: None,
                    command_or_label: None,
                    working_directory: None,
                    force: false,
                })
                .await;
            start_new(&client, &command_str, &cwd, &opts).await?
        }
        Some(entry) => entry.pid,
        None => start_new(&client, &command_str, &cwd, &opts).await?,
    };

    let status = client
        .send_with_retry::<pp_wire::GetStatusResult>(&get_status_request(pid))
        .await?;
    let mut current_pid = pid;
    let mut last_start_time = status.start_time;

    let combined_path = fetch_combined_path(&client, current_pid).await?;
    wait_for_file(&combined_path, COMBINED_FILE_WAIT).await;

    let buffering = Arc::new(AtomicBool::new(false));
    let mut tail = spawn_tail(combined_path, opts.raw, Arc::clone(&buffering));

    let exit_code = loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                // Stop printing immediately so prompt text (if any) isn't
                // intermixed with trailing child output; the buffered
                // lines are simply never drained, since every exit path
                // below terminates the process.
                buffering.store(true, Ordering::Relaxed);
                tail.cancel.cancel();
                let _ = tail.handle.await;

                let stop = match opts.on_exit {
                    OnExit::Stop => true,
                    OnExit::Detach => false,
                    OnExit::Ask => prompt_stop(&command_str, &cwd_str, current_pid).await,
                };
                break if stop {
                    stop_and_wait(&client, current_pid).await?.unwrap_or(0)
                } else {
                    0
                };
            }
            _ = tokio::time::sleep(STATUS_POLL_INTERVAL) => {
                match client.send::<pp_wire::GetStatusResult>(&get_status_request(current_pid)).await {
                    Ok(status) if status.status.is_running() => {}
                    Ok(status) => {
                        match find_restart(&client, &tokens, &cwd_str, &last_start_time).await? {
                            Some(replacement) => {
                                tail.cancel.cancel();
                                let _ = tail.handle.await;
                                current_pid = replacement.pid;
                                last_start_time = replacement.start_time;
                                let combined_path = fetch_combined_path(&client, current_pid).await?;
                                wait_for_file(&combined_path, COMBINED_FILE_WAIT).await;
                                tail = spawn_tail(combined_path, opts.raw, Arc::clone(&buffering));
                            }
                            None => break status.exit_code.unwrap_or(0),
                        }
                    }
                    Err(_) => break 0,
                }
            }
        }
    };

    tail.cancel.cancel();
    let _ = tail.handle.await;
    Ok(exit_code)
}

fn get_status_request(pid: u32) -> Request {
    Request::GetStatus { pid: Some(pid), label: None, command_or_label: None, working_directory: None }
}

async fn start_new(
    client: &DaemonClient,
    command_str: &str,
    cwd: &Path,
    opts: &TailOptions,
) -> anyhow::Result<u32> {
    let environment: HashMap<String, String> = std::env::vars().collect();
    let result = client
        .send_with_retry::<pp_wire::StartResult>(&Request::Start {
            command: command_str.to_string(),
            working_directory: Some(cwd.to_path_buf()),
            environment,
            label: opts.label.clone(),
        })
        .await?;
    Ok(result.pid)
}

/// Scans `list` for a running entry with identical command tokens and
/// working directory, per spec.md §4.8 step 2.
async fn find_matching(
    client: &DaemonClient,
    tokens: &[String],
    cwd: &str,
) -> anyhow::Result<Option<ProcessSummary>> {
    let result = client.send_with_retry::<pp_wire::ListResult>(&Request::List).await?;
    Ok(result
        .processes
        .into_iter()
        .find(|p| p.status.is_running() && p.command == tokens && p.working_directory == cwd))
}

/// Scans `list` for a replacement entry per the Restart detection rule in
/// spec.md §4.8: identical tokens and working directory, running, and a
/// `start_time` strictly greater than the last observed one (ISO-8601
/// strings sort chronologically as plain strings).
async fn find_restart(
    client: &DaemonClient,
    tokens: &[String],
    cwd: &str,
    last_start_time: &str,
) -> anyhow::Result<Option<ProcessSummary>> {
    let result = client.send::<pp_wire::ListResult>(&Request::List).await?;
    Ok(result.processes.into_iter().find(|p| {
        p.status.is_running()
            && p.command == tokens
            && p.working_directory == cwd
            && p.start_time.as_str() > last_start_time
    }))
}

async fn fetch_combined_path(client: &DaemonClient, pid: u32) -> anyhow::Result<PathBuf> {
    let paths = client.send::<pp_wire::GetLogPathsResult>(&Request::GetLogPaths { pid }).await?;
    Ok(PathBuf::from(paths.combined))
}

async fn wait_for_file(path: &Path, timeout: Duration) {
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::fs::metadata(path).await.is_err() {
        if tokio::time::Instant::now() >= deadline {
            return;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
}

async fn stop_and_wait(client: &DaemonClient, pid: u32) -> anyhow::Result<Option<i32>> {
    let _ = client
        .send::<pp_wire::StopResult>(&Request::Stop {
            pid: Some(pid),
            label: None,
            command_or_label: None,
            working_directory: None,
            force: false,
        })
        .await;
    Ok(wait_until_non_running(client, pid, STOP_CONFIRM_TIMEOUT).await)
}

async fn wait_until_non_running(client: &DaemonClient, pid: u32, timeout: Duration) -> Option<i32> {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        match client.send::<pp_wire::GetStatusResult>(&get_status_request(pid)).await {
            Ok(status) if !status.status.is_running() => return status.exit_code,
            _ => {
                if tokio::time::Instant::now() >= deadline {
                    return None;
                }
                tokio::time::sleep(Duration::from_millis(200)).await;
            }
        }
    }
}

struct TailHandle {
    cancel: CancellationToken,
    handle: tokio::task::JoinHandle<()>,
}

fn spawn_tail(path: PathBuf, raw: bool, buffering: Arc<AtomicBool>) -> TailHandle {
    let cancel = CancellationToken::new();
    let handle = tokio::spawn(tail_loop(path, raw, cancel.clone(), buffering));
    TailHandle { cancel, handle }
}

/// Seeks to end-of-file and loops reading lines, per spec.md §4.8 step 6.
async fn tail_loop(path: PathBuf, raw: bool, cancel: CancellationToken, buffering: Arc<AtomicBool>) {
    let Ok(file) = tokio::fs::File::open(&path).await else { return };
    let mut reader = BufReader::new(file);
    if reader.get_mut().seek(std::io::SeekFrom::End(0)).await.is_err() {
        return;
    }

    let mut line = String::new();
    loop {
        line.clear();
        tokio::select! {
            _ = cancel.cancelled() => return,
            result = reader.read_line(&mut line) => match result {
                Ok(0) => tokio::time::sleep(Duration::from_millis(200)).await,
                Ok(_) => {
                    if !buffering.load(Ordering::Relaxed) {
                        if let Some(rendered) = transform_line(&line, raw) {
                            print!("{rendered}");
                            let _ = std::io::stdout().flush();
                        }
                    }
                }
                Err(_) => return,
            },
        }
    }
}

/// Applies `--raw`/`[SYSTEM]`-filtering/timestamp-stripping to one log
/// line, per spec.md §4.8 step 6 and SPEC_FULL.md §8's supplemented
/// `--raw` behavior (ported from `original_source`'s `_tail_file`).
/// Returns `None` when the line should be dropped entirely.
fn transform_line(line: &str, raw: bool) -> Option<String> {
    if raw {
        return Some(line.to_string());
    }
    if line.contains("[SYSTEM]") {
        return None;
    }
    Some(strip_timestamp(line))
}

/// Strips the leading `<ISO-8601><space>` prefix every log line carries.
fn strip_timestamp(line: &str) -> String {
    match line.split_once(' ') {
        Some((prefix, rest)) if chrono::DateTime::parse_from_rfc3339(prefix).is_ok() => {
            rest.to_string()
        }
        _ => line.to_string(),
    }
}

/// Prompts "Stop running process '<cmd>' in '<cwd>' (PID <pid>)? [y/N]"
/// with a single-keystroke read when stdin is a TTY, per spec.md §4.8
/// step 9's `--on-exit=ask`. Non-TTY (or a read failure) defaults to
/// detach, matching `original_source`'s fallback behavior.
async fn prompt_stop(command: &str, cwd: &str, pid: u32) -> bool {
    if !std::io::stdin().is_terminal() {
        return false;
    }
    print!("Stop running process '{command}' in '{cwd}' (PID {pid})? [y/N] ");
    let _ = std::io::stdout().flush();
    tokio::task::spawn_blocking(read_single_key).await.unwrap_or(false)
}

/// Reads one keystroke in raw mode. In raw mode the terminal no longer
/// generates SIGINT for Ctrl+C, so a second Ctrl+C during the prompt
/// arrives here as a plain key event — treated the same as any other
/// non-`y` answer, i.e. defaults to detach (spec.md §4.8 step 9).
fn read_single_key() -> bool {
    use crossterm::event::{read, Event, KeyCode};
    use crossterm::terminal::{disable_raw_mode, enable_raw_mode};

    if enable_raw_mode().is_err() {
        return false;
    }
    let answer = loop {
        match read() {
            Ok(Event::Key(key)) => {
                break matches!(key.code, KeyCode::Char('y') | KeyCode::Char('Y'));
            }
            Ok(_) => continue,
            Err(_) => break false,
        }
    };
    let _ = disable_raw_mode();
    println!();
    answer
}

#[cfg(test)]
#[path = "tail_tests.rs"]
mod tests;
