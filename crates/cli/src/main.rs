// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `persistproc` — CLI front-end: `serve`, `run`, and the eight direct
//! tool invocations, per spec.md §6's CLI surface.

use std::process::ExitCode;

use clap::{Parser, Subcommand};

use persistproc::client::DaemonClient;
use persistproc::color;
use persistproc::commands;
use persistproc::tail::OnExit;

#[derive(Parser)]
#[command(
    name = "persistproc",
    about = "Keep a process running across coding-agent restarts, with a tailable combined log.",
    styles = color::styles()
)]
struct Cli {
    /// Daemon port, overriding `PERSISTPROC_PORT`.
    #[arg(long, global = true)]
    port: Option<u16>,
    /// Emit machine-readable JSON instead of text.
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
#[command(rename_all = "snake_case")]
enum Command {
    /// Run the supervisor daemon in the foreground.
    Serve(commands::serve::ServeArgs),
    /// Ensure a matching process is running, then tail its combined log
    /// until interrupted.
    Run(commands::run::RunArgs),
    /// Start a new managed process.
    Start(commands::direct::StartArgs),
    /// Stop a managed process.
    Stop(commands::direct::StopArgs),
    /// Stop and restart a managed process, keeping its command/label.
    Restart(commands::direct::SelectorArgs),
    /// List every managed process.
    List,
    /// Show one process's status.
    GetStatus(commands::direct::SelectorArgs),
    /// Fetch captured stdout/stderr/combined output.
    GetOutput(commands::direct::GetOutputArgs),
    /// Print a process's log file paths.
    GetLogPaths(commands::direct::PidArgs),
    /// Stop every managed process and shut down the daemon.
    KillPersistproc,
    /// A bare positional that isn't a known subcommand is treated as
    /// `run <program> [args...]`, per spec.md §6.
    #[command(external_subcommand)]
    External(Vec<String>),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let json = cli.json;
    let port = cli.port.unwrap_or_else(pp_daemon::env::port);
    let client = DaemonClient::new(port);

    let code = match cli.command {
        Command::Serve(args) => match commands::serve::serve(args).await {
            Ok(()) => 0,
            Err(err) => {
                eprintln!("error: {err}");
                1
            }
        },
        Command::Run(args) => commands::run::run(client, args).await,
        Command::External(tokens) => match tokens.split_first() {
            Some((program, args)) => {
                let run_args = commands::run::RunArgs {
                    program: program.clone(),
                    args: args.to_vec(),
                    fresh: false,
                    on_exit: OnExit::Ask,
                    raw: false,
                    label: None,
                };
                commands::run::run(client, run_args).await
            }
            None => {
                eprintln!("error: no command given");
                1
            }
        },
        Command::Start(args) => commands::direct::start(&client, json, args).await,
        Command::Stop(args) => commands::direct::stop(&client, json, args).await,
        Command::Restart(selector) => commands::direct::restart(&client, json, selector).await,
        Command::List => commands::direct::list(&client, json).await,
        Command::GetStatus(selector) => {
            commands::direct::get_status(&client, json, selector).await
        }
        Command::GetOutput(args) => commands::direct::get_output(&client, json, args).await,
        Command::GetLogPaths(args) => commands::direct::get_log_paths(&client, json, args).await,
        Command::KillPersistproc => commands::direct::kill_persistproc(&client, json).await,
    };

    ExitCode::from(code as u8)
}
