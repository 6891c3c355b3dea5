// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `persistproc run <program> [args...]` — the TailClient entry point.

use clap::Args;

use crate::client::DaemonClient;
use crate::tail::{self, OnExit, TailOptions};

#[derive(Args, Debug)]
pub struct RunArgs {
    pub program: String,
    #[arg(trailing_var_arg = true)]
    pub args: Vec<String>,
    /// Stop and restart if a matching process is already running.
    #[arg(long)]
    pub fresh: bool,
    #[arg(long, value_enum, default_value = "ask")]
    pub on_exit: OnExit,
    /// Print log lines verbatim, skipping `[SYSTEM]`-line filtering and
    /// timestamp stripping.
    #[arg(long)]
    pub raw: bool,
    #[arg(long)]
    pub label: Option<String>,
}

pub async fn run(client: DaemonClient, args: RunArgs) -> i32 {
    let opts = TailOptions {
        program: args.program,
        args: args.args,
        fresh: args.fresh,
        on_exit: args.on_exit,
        raw: args.raw,
        label: args.label,
    };
    match tail::run(client, opts).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err}");
            1
        }
    }
}
