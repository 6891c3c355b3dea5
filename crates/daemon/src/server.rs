// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Binds the [`crate::tool_surface::ToolSurface`] to an HTTP transport.
//!
//! Grounded in the axum daemon pattern from `other_examples`
//! (`darinkishore-hurry`'s `cmd/daemon/start.rs`): a single `Router`, a
//! `tokio::net::TcpListener` bound up front, `axum::serve(...)
//! .with_graceful_shutdown(...)`. One dispatch route is used rather than one
//! route per tool, consistent with spec.md §1's "any JSON-over-HTTP
//! transport suffices" — the tool name travels in the request body's `tool`
//! tag (see `pp_wire::Request`'s `#[serde(tag = "tool")]`).

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use pp_wire::Request;
use tracing::{info, warn};

use crate::supervisor::Supervisor;
use crate::tool_surface::ToolSurface;

#[derive(Clone)]
struct AppState {
    tool_surface: Arc<ToolSurface>,
}

/// Builds the axum router exposing `POST /tools`, the single JSON-RPC-style
/// dispatch endpoint described in spec.md §4.7.
pub fn router(tool_surface: Arc<ToolSurface>) -> Router {
    let state = AppState { tool_surface };
    Router::new().route("/tools", post(handle_tool_call)).with_state(state)
}

async fn handle_tool_call(
    State(state): State<AppState>,
    Json(request): Json<Request>,
) -> Json<serde_json::Value> {
    Json(state.tool_surface.dispatch(request).await)
}

/// Runs the HTTP server until a shutdown signal arrives, then force-stops
/// every running entry and returns, per spec.md §5's shutdown contract.
pub async fn serve(addr: SocketAddr, tool_surface: Arc<ToolSurface>, supervisor: Arc<Supervisor>) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "persistprocd listening");

    let app = router(tool_surface);
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    info!("shutdown signal received; force-stopping running processes");
    let snapshot = supervisor.list();
    for entry in snapshot.into_iter().filter(|entry| entry.status.is_running()) {
        if let Err(err) = supervisor.stop(&pp_core::Selector::Pid(entry.pid), true).await {
            warn!(pid = entry.pid, %err, "shutdown: failed to stop process");
        }
    }
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => warn!(%err, "failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received SIGINT"),
        _ = terminate => info!("received SIGTERM"),
    }
    // Give the graceful-shutdown path a moment to stop accepting new
    // connections before we start force-stopping children.
    tokio::time::sleep(Duration::from_millis(1)).await;
}

#[cfg(test)]
#[path = "server_tests.rs"]
mod tests;
