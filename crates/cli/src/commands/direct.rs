// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Direct tool-invocation subcommands: `start`, `stop`, `restart`, `list`,
//! `get_status`, `get_output`, `get_log_paths`, `kill_persistproc`.
//!
//! Each one builds a single [`pp_wire::Request`], posts it through
//! [`crate::client::DaemonClient`], and prints the result — mirroring the
//! teacher's thin `commands/<entity>.rs` handlers (`commands/daemon.rs`)
//! that delegate formatting to `crate::output`.

use std::collections::HashMap;
use std::path::PathBuf;

use clap::Args;
use pp_wire::{Request, StreamKind};

use crate::client::DaemonClient;
use crate::color;
use crate::output::{print_result, report_client_error, truncate};

/// The `pid | label | command...` argument shape shared by every
/// selector-accepting tool, per spec.md §6's "Selectors accept a bare
/// integer (pid) or a string (label, or command when followed by further
/// args)". A single positional slot plus a trailing var-arg covers all
/// three forms without three separate subcommand signatures.
#[derive(Args, Debug)]
pub struct SelectorArgs {
    /// A pid, a label, or the first token of a command.
    pub selector: String,
    /// Further command tokens, when `selector` is a command rather than a
    /// pid or label.
    #[arg(trailing_var_arg = true)]
    pub rest: Vec<String>,
    /// Narrows a command/label match to one working directory.
    #[arg(long)]
    pub working_directory: Option<PathBuf>,
}

impl SelectorArgs {
    /// Resolves the CLI argument shape into the triple
    /// `pp_wire::Request`'s selector-accepting variants carry: a bare pid
    /// when `selector` parses as one and no trailing tokens were given,
    /// otherwise a `command_or_label` built by rejoining `selector` with
    /// `rest`.
    fn into_parts(self) -> (Option<u32>, Option<String>, Option<PathBuf>) {
        if self.rest.is_empty() {
            if let Ok(pid) = self.selector.parse::<u32>() {
                return (Some(pid), None, self.working_directory);
            }
        }
        let mut tokens = vec![self.selector];
        tokens.extend(self.rest);
        (None, Some(pp_core::tokenize::join(&tokens)), self.working_directory)
    }
}

#[derive(Args, Debug)]
pub struct StartArgs {
    /// Full command line to run, e.g. "python server.py --port 8080".
    pub command: String,
    #[arg(long)]
    pub working_directory: Option<PathBuf>,
    /// `KEY=VALUE` environment overrides; may be repeated.
    #[arg(long = "env", value_parser = parse_env_pair)]
    pub environment: Vec<(String, String)>,
    #[arg(long)]
    pub label: Option<String>,
}

fn parse_env_pair(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))
}

#[derive(Args, Debug)]
pub struct StopArgs {
    #[command(flatten)]
    pub selector: SelectorArgs,
    /// Skip the graceful-stop wait and kill immediately.
    #[arg(long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct GetOutputArgs {
    pub pid: u32,
    #[arg(long, default_value = "combined")]
    pub stream: String,
    /// Defaults to the last 100 lines; pass `--lines 0` for none or a
    /// larger value for more. Ported from `original_source`'s CLI
    /// convenience default (`tools.py::GetProcessOutputTool._apply`) — the
    /// raw tool call itself leaves `lines` unbounded when omitted.
    #[arg(long, default_value = "100")]
    pub lines: usize,
    #[arg(long)]
    pub since_time: Option<String>,
    #[arg(long)]
    pub before_time: Option<String>,
}

#[derive(Args, Debug)]
pub struct PidArgs {
    pub pid: u32,
}

pub async fn start(client: &DaemonClient, json: bool, args: StartArgs) -> i32 {
    let request = Request::Start {
        command: args.command,
        working_directory: args.working_directory,
        environment: args.environment.into_iter().collect::<HashMap<_, _>>(),
        label: args.label,
    };
    match client.send::<pp_wire::StartResult>(&request).await {
        Ok(result) => {
            print_result(json, &result, |r| {
                println!("started pid {} ({})", color::header(&r.pid.to_string()), r.label);
                println!("  stdout:   {}", r.log_stdout);
                println!("  stderr:   {}", r.log_stderr);
                println!("  combined: {}", r.log_combined);
            });
            0
        }
        Err(err) => report_client_error(&err, client.port()),
    }
}

pub async fn stop(client: &DaemonClient, json: bool, args: StopArgs) -> i32 {
    let (pid, command_or_label, working_directory) = args.selector.into_parts();
    let request = Request::Stop {
        pid,
        label: None,
        command_or_label,
        working_directory,
        force: args.force,
    };
    match client.send::<pp_wire::StopResult>(&request).await {
        Ok(result) => {
            print_result(json, &result, |r| match r.exit_code {
                Some(code) => println!("stopped pid {} (exit code {code})", r.pid),
                None => println!("stopped pid {} (exit code unknown)", r.pid),
            });
            0
        }
        Err(err) => report_client_error(&err, client.port()),
    }
}

pub async fn restart(client: &DaemonClient, json: bool, selector: SelectorArgs) -> i32 {
    let (pid, command_or_label, working_directory) = selector.into_parts();
    let request =
        Request::Restart { pid, label: None, command_or_label, working_directory };
    match client.send::<pp_wire::RestartResult>(&request).await {
        Ok(result) => {
            print_result(json, &result, |r| {
                println!("restarted as pid {} ({})", color::header(&r.pid.to_string()), r.label);
            });
            0
        }
        Err(err) => report_client_error(&err, client.port()),
    }
}

pub async fn list(client: &DaemonClient, json: bool) -> i32 {
    match client.send::<pp_wire::ListResult>(&Request::List).await {
        Ok(result) => {
            print_result(json, &result, |r| {
                if r.processes.is_empty() {
                    println!("no processes");
                    return;
                }
                println!(
                    "{:<8} {:<10} {:<26} {}",
                    "PID", "STATUS", "LABEL", "COMMAND"
                );
                for p in &r.processes {
                    println!(
                        "{:<8} {:<19} {:<26} {}",
                        p.pid,
                        color::status_label(p.status),
                        truncate(&p.label, 26),
                        pp_core::tokenize::join(&p.command)
                    );
                }
            });
            0
        }
        Err(err) => report_client_error(&err, client.port()),
    }
}

pub async fn get_status(client: &DaemonClient, json: bool, selector: SelectorArgs) -> i32 {
    let (pid, command_or_label, working_directory) = selector.into_parts();
    let request = Request::GetStatus { pid, label: None, command_or_label, working_directory };
    match client.send::<pp_wire::GetStatusResult>(&request).await {
        Ok(result) => {
            print_result(json, &result, |r| {
                println!("pid:     {}", r.pid);
                println!("label:   {}", r.label);
                println!("status:  {}", color::status_label(r.status));
                println!("command: {}", pp_core::tokenize::join(&r.command));
                println!("wd:      {}", r.working_directory);
                println!("started: {}", r.start_time);
                if let Some(code) = r.exit_code {
                    println!("exit:    {code}");
                }
            });
            0
        }
        Err(err) => report_client_error(&err, client.port()),
    }
}

pub async fn get_output(client: &DaemonClient, json: bool, args: GetOutputArgs) -> i32 {
    let stream = match args.stream.as_str() {
        "stdout" => StreamKind::Stdout,
        "stderr" => StreamKind::Stderr,
        "combined" => StreamKind::Combined,
        other => {
            eprintln!("error: stream must be 'stdout', 'stderr', or 'combined', got '{other}'");
            return 1;
        }
    };
    let request = Request::GetOutput {
        pid: args.pid,
        stream,
        lines: Some(args.lines),
        before_time: args.before_time,
        since_time: args.since_time,
    };
    match client.send::<pp_wire::GetOutputResult>(&request).await {
        Ok(result) => {
            print_result(json, &result, |r| {
                for line in &r.output {
                    println!("{line}");
                }
            });
            0
        }
        Err(err) => report_client_error(&err, client.port()),
    }
}

pub async fn get_log_paths(client: &DaemonClient, json: bool, args: PidArgs) -> i32 {
    let request = Request::GetLogPaths { pid: args.pid };
    match client.send::<pp_wire::GetLogPathsResult>(&request).await {
        Ok(result) => {
            print_result(json, &result, |r| {
                println!("stdout:   {}", r.stdout);
                println!("stderr:   {}", r.stderr);
                println!("combined: {}", r.combined);
            });
            0
        }
        Err(err) => report_client_error(&err, client.port()),
    }
}

pub async fn kill_persistproc(client: &DaemonClient, json: bool) -> i32 {
    match client.send::<pp_wire::KillPersistprocResult>(&Request::KillPersistproc).await {
        Ok(result) => {
            print_result(json, &result, |r| {
                println!("persistprocd (pid {}) shutting down", r.pid);
            });
            0
        }
        Err(err) => report_client_error(&err, client.port()),
    }
}

#[cfg(test)]
#[path = "direct_tests.rs"]
mod tests;
