// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `persistproc serve` — runs the supervisor daemon in-process.
//!
//! Shares `pp_daemon::run` with the standalone `persistprocd` binary
//! (`crates/daemon/src/main.rs`); this command just supplies its own data
//! directory / log-file bookkeeping so `persistproc serve` works without
//! the separate binary being on `PATH`.

use chrono::Utc;
use clap::Args;
use tracing_subscriber::EnvFilter;

#[derive(Args)]
pub struct ServeArgs {
    /// Port to bind, overriding `PERSISTPROC_PORT`.
    #[arg(long)]
    pub port: Option<u16>,
}

pub async fn serve(args: ServeArgs) -> anyhow::Result<()> {
    let data_dir = pp_daemon::env::data_dir();
    std::fs::create_dir_all(&data_dir)?;

    let timestamp = Utc::now().format("%Y%m%d_%H%M%S");
    let server_log_path = data_dir.join(format!("persistproc.run.{timestamp}.log"));

    let log_file =
        std::fs::OpenOptions::new().create(true).append(true).open(&server_log_path)?;
    let (non_blocking, _guard) = tracing_appender::non_blocking(log_file);
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(non_blocking)
        .with_ansi(false)
        .init();

    tracing::info!(pid = std::process::id(), ?server_log_path, "persistprocd starting");

    pp_daemon::run(data_dir, server_log_path, args.port).await
}
