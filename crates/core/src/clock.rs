// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Clock abstraction so timestamp generation is substitutable in tests.

use chrono::Utc;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

/// Produces the current UTC instant as `YYYY-MM-DDTHH:MM:SS.sssZ`.
///
/// Every timestamp in the system — log lines, `start_time`, `exit_time` —
/// comes through a `Clock` so tests can substitute a deterministic one.
pub trait Clock: Send + Sync {
    fn now(&self) -> String;
}

/// Real wall-clock time.
#[derive(Clone, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> String {
        Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
    }
}

/// Deterministic clock for tests: starts at a fixed instant and only moves
/// when told to, so timestamp-ordering assertions aren't flaky.
#[cfg(any(test, feature = "test-support"))]
#[derive(Clone)]
pub struct StepClock {
    current: Arc<Mutex<chrono::DateTime<Utc>>>,
}

#[cfg(any(test, feature = "test-support"))]
impl StepClock {
    pub fn new() -> Self {
        Self { current: Arc::new(Mutex::new(Utc::now())) }
    }

    pub fn advance(&self, duration: Duration) {
        let mut current = self.current.lock();
        *current += chrono::Duration::from_std(duration).unwrap_or_default();
    }
}

#[cfg(any(test, feature = "test-support"))]
impl Default for StepClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(any(test, feature = "test-support"))]
impl Clock for StepClock {
    fn now(&self) -> String {
        self.current.lock().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
