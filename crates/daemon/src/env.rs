// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon crate.

use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_PORT: u16 = 8947;
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// `PERSISTPROC_PORT`, default `8947` per spec.md §6.
pub fn port() -> u16 {
    std::env::var("PERSISTPROC_PORT").ok().and_then(|s| s.parse().ok()).unwrap_or(DEFAULT_PORT)
}

/// `PERSISTPROC_DATA_DIR`, falling back to the platform user data directory.
pub fn data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("PERSISTPROC_DATA_DIR") {
        return PathBuf::from(dir);
    }
    dirs::data_dir().unwrap_or_else(|| PathBuf::from(".")).join("persistproc")
}

/// `PERSISTPROC_TEST_POLL_INTERVAL`, in fractional seconds. Overridable so
/// tests don't wait a full second for the Monitor to notice an exit.
pub fn monitor_poll_interval() -> Duration {
    std::env::var("PERSISTPROC_TEST_POLL_INTERVAL")
        .ok()
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|secs| *secs > 0.0)
        .map(Duration::from_secs_f64)
        .unwrap_or(DEFAULT_POLL_INTERVAL)
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
