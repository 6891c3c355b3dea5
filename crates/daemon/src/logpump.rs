// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Captures a child's stdout/stderr into timestamped, append-only log files.
//!
//! Two tasks read one line at a time from their pipe, prefix it with the
//! capture timestamp, and fan it out to their primary file and the shared
//! combined file. A third task waits for both readers to finish and
//! releases its handle on the combined file.

use std::path::Path;
use std::sync::Arc;

use pp_core::{Clock, LogPaths};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{ChildStderr, ChildStdout};
use tokio::sync::Mutex as AsyncMutex;
use tokio::task::JoinHandle;
use tracing::error;

/// The shared `.combined` file. Writes are serialized through an internal
/// mutex so two timestamped lines from different sources never interleave
/// mid-line, and so that `[SYSTEM]` lines emitted by the Supervisor share
/// the same ordering guarantee as pumped output lines.
pub struct CombinedLog {
    file: AsyncMutex<tokio::fs::File>,
}

impl CombinedLog {
    pub async fn open(path: &Path) -> std::io::Result<Self> {
        let file = tokio::fs::OpenOptions::new().create(true).append(true).open(path).await?;
        Ok(Self { file: AsyncMutex::new(file) })
    }

    async fn write_line(&self, line: &str) -> std::io::Result<()> {
        let mut file = self.file.lock().await;
        file.write_all(line.as_bytes()).await?;
        file.flush().await
    }

    /// Emit a `[SYSTEM]`-tagged lifecycle line, per spec.md §3's log-line
    /// format: `<timestamp> [SYSTEM] <message>\n`.
    pub async fn write_system(&self, clock: &dyn Clock, message: &str) {
        let line = format!("{} [SYSTEM] {message}\n", clock.now());
        if let Err(err) = self.write_line(&line).await {
            error!(%err, "failed to write system line to combined log");
        }
    }
}

/// Join handles for a started pump; dropping this does not stop the pump —
/// readers run to EOF regardless.
pub struct LogPump {
    stdout_task: JoinHandle<()>,
    stderr_task: JoinHandle<()>,
}

impl LogPump {
    /// Starts the stdout and stderr reader tasks and returns them alongside
    /// a handle to the shared combined log the Supervisor can also write
    /// `[SYSTEM]` lines to.
    pub async fn start(
        stdout: ChildStdout,
        stderr: ChildStderr,
        log_paths: LogPaths,
        clock: Arc<dyn Clock>,
    ) -> std::io::Result<(Self, Arc<CombinedLog>)> {
        let stdout_file =
            tokio::fs::OpenOptions::new().create(true).append(true).open(&log_paths.stdout).await?;
        let stderr_file =
            tokio::fs::OpenOptions::new().create(true).append(true).open(&log_paths.stderr).await?;
        let combined = Arc::new(CombinedLog::open(&log_paths.combined).await?);

        let stdout_task =
            tokio::spawn(pump_stream(stdout, stdout_file, Arc::clone(&combined), Arc::clone(&clock)));
        let stderr_task =
            tokio::spawn(pump_stream(stderr, stderr_file, Arc::clone(&combined), clock));

        Ok((Self { stdout_task, stderr_task }, combined))
    }

    /// Waits for both reader tasks to reach EOF (the child has closed both
    /// pipes, directly or via exit). Per spec.md §4.3: "a third concurrent
    /// waiter observes the child to completion".
    pub async fn join(self) {
        let _ = tokio::join!(self.stdout_task, self.stderr_task);
    }
}

async fn pump_stream<R>(
    reader: R,
    mut primary: tokio::fs::File,
    combined: Arc<CombinedLog>,
    clock: Arc<dyn Clock>,
) where
    R: tokio::io::AsyncRead + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        // Read one line at a time; a partial trailing line at EOF (no `\n`)
        // is flushed as a final line, per spec.md §4.3.
        let read = match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(n) => n,
            Err(err) => {
                error!(%err, "error reading child output stream");
                break;
            }
        };
        let _ = read;
        while buf.last() == Some(&b'\n') || buf.last() == Some(&b'\r') {
            buf.pop();
        }
        // Invalid UTF-8 is replaced rather than dropped, per spec.md §4.3.
        let line = String::from_utf8_lossy(&buf);
        let timestamped = format!("{} {line}\n", clock.now());
        if let Err(err) = primary.write_all(timestamped.as_bytes()).await {
            error!(%err, "failed to write process log; stopping pump for this stream");
            break;
        }
        if let Err(err) = primary.flush().await {
            error!(%err, "failed to flush process log; stopping pump for this stream");
            break;
        }
        if let Err(err) = combined.write_line(&timestamped).await {
            error!(%err, "failed to write combined log; stopping pump for this stream");
            break;
        }
    }
}

#[cfg(test)]
#[path = "logpump_tests.rs"]
mod tests;
