// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! pp-daemon: the persistprocd process supervisor daemon.
//!
//! Owns the [`registry::Registry`], the [`supervisor::Supervisor`]
//! lifecycle operations, the [`logpump`]/[`logstore`]/[`logreader`] log
//! pipeline, and the [`tool_surface::ToolSurface`] bound to an HTTP
//! transport by [`server`].

pub mod env;
pub mod logpump;
pub mod logreader;
pub mod logstore;
pub mod registry;
pub mod server;
pub mod supervisor;
pub mod tool_surface;

use std::net::SocketAddr;
use std::sync::Arc;

use pp_core::{Clock, SystemClock};
use tracing::info;

use logreader::LogReader;
use logstore::LogStore;
use registry::Registry;
use supervisor::Supervisor;
use tool_surface::ToolSurface;

/// Runs the daemon to completion: binds the HTTP server, spawns the
/// Monitor, and blocks until a shutdown signal is received. Shared by the
/// `persistprocd` binary and by `persistproc serve` in the CLI.
pub async fn run(
    data_dir: std::path::PathBuf,
    server_log_path: std::path::PathBuf,
    port: Option<u16>,
) -> anyhow::Result<()> {
    let log_store = LogStore::new(data_dir.join("process_logs"))?;
    let registry = Arc::new(Registry::new());
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let supervisor = Arc::new(Supervisor::new(Arc::clone(&registry), log_store.clone(), Arc::clone(&clock)));
    let log_reader = Arc::new(LogReader::new(registry, log_store, server_log_path));
    let tool_surface = Arc::new(ToolSurface::new(Arc::clone(&supervisor), log_reader));

    let monitor_supervisor = Arc::clone(&supervisor);
    let poll_interval = env::monitor_poll_interval();
    let monitor = tokio::spawn(async move {
        monitor_supervisor.run_monitor(poll_interval).await;
    });

    let addr = SocketAddr::from(([127, 0, 0, 1], port.unwrap_or_else(env::port)));
    server::serve(addr, tool_surface, supervisor).await?;

    info!("persistprocd shutting down");
    monitor.abort();
    Ok(())
}
