// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared end-to-end test harness: spawns a real `persistprocd` on an
//! ephemeral port against a private temp data directory, and a thin
//! builder over `persistproc` CLI invocations against it.

use std::io::{BufRead, BufReader};
use std::net::TcpListener;
use std::path::PathBuf;
use std::process::{Child, ChildStdout, Command, Output, Stdio};
use std::sync::mpsc;
use std::time::{Duration, Instant};

use assert_cmd::cargo::CommandCargoExt;
use tempfile::TempDir;

/// How long `wait_for` polls before giving up, for assertions on
/// asynchronous daemon state (Monitor reaping an exited child, a log
/// line landing on disk, ...).
pub const SPEC_WAIT_MAX_MS: u64 = 10_000;

/// A private `persistprocd` instance for one test, bound to its own
/// ephemeral port and temp data directory so tests never collide.
pub struct Harness {
    port: u16,
    data_dir: TempDir,
    daemon: Child,
}

impl Harness {
    /// Starts the daemon and waits until it accepts connections.
    pub fn start() -> Self {
        let data_dir = tempfile::tempdir().expect("create temp data dir");
        let port = free_port();

        let mut command = Command::cargo_bin("persistprocd").expect("find persistprocd binary");
        command
            .env("PERSISTPROC_PORT", port.to_string())
            .env("PERSISTPROC_DATA_DIR", data_dir.path())
            // Tests don't want to wait a full second for the Monitor to
            // notice an exit, per spec.md §6's env var table.
            .env("PERSISTPROC_TEST_POLL_INTERVAL", "0.05")
            .env("RUST_LOG", "persistprocd=warn")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        let daemon = command.spawn().expect("spawn persistprocd");
        let harness = Self { port, data_dir, daemon };
        harness.wait_until_listening();
        harness
    }

    fn wait_until_listening(&self) {
        let deadline = Instant::now() + Duration::from_secs(10);
        while Instant::now() < deadline {
            if std::net::TcpStream::connect(("127.0.0.1", self.port)).is_ok() {
                return;
            }
            std::thread::sleep(Duration::from_millis(25));
        }
        panic!("persistprocd never started listening on port {}", self.port);
    }

    pub fn data_dir(&self) -> &std::path::Path {
        self.data_dir.path()
    }

    /// Builds a `persistproc` invocation pointed at this daemon.
    pub fn cli(&self) -> Cli {
        let mut command = Command::cargo_bin("persistproc").expect("find persistproc binary");
        command.env("PERSISTPROC_PORT", self.port.to_string());
        command.env("PERSISTPROC_DATA_DIR", self.data_dir.path());
        command.env("NO_COLOR", "1");
        Cli { command }
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

impl Drop for Harness {
    fn drop(&mut self) {
        // Best-effort: most tests stop their own children, but a failed
        // assertion shouldn't leave an orphaned daemon + process group
        // behind. `kill_persistproc` already force-stops every managed
        // child; a plain kill of the daemon itself is still needed since
        // it doesn't wait for its own scheduled self-signal.
        let _ = self.daemon.kill();
        let _ = self.daemon.wait();
    }
}

/// A `persistproc` CLI invocation under construction.
pub struct Cli {
    command: Command,
}

impl Cli {
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<std::ffi::OsStr>,
    {
        self.command.args(args);
        self
    }

    pub fn arg(mut self, arg: impl AsRef<std::ffi::OsStr>) -> Self {
        self.command.arg(arg);
        self
    }

    pub fn env(mut self, key: &str, value: impl AsRef<std::ffi::OsStr>) -> Self {
        self.command.env(key, value);
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.command.current_dir(dir.into());
        self
    }

    /// Runs to completion and returns the raw output.
    pub fn output(mut self) -> Output {
        self.command.output().expect("run persistproc")
    }

    /// Runs to completion, asserting a zero exit code, and returns stdout
    /// as a `String`.
    pub fn passes(self) -> String {
        let output = self.output();
        assert!(
            output.status.success(),
            "expected success, got {:?}\nstdout: {}\nstderr: {}",
            output.status.code(),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8_lossy(&output.stdout).into_owned()
    }

    /// Runs to completion, asserting a non-zero exit code, and returns
    /// stderr as a `String`.
    pub fn fails(self) -> String {
        let output = self.output();
        assert!(
            !output.status.success(),
            "expected failure, got success\nstdout: {}",
            String::from_utf8_lossy(&output.stdout)
        );
        String::from_utf8_lossy(&output.stderr).into_owned()
    }

    /// Runs with `--json` appended, asserting success, and parses stdout.
    pub fn passes_json(mut self) -> serde_json::Value {
        self.command.arg("--json");
        let stdout = self.passes();
        serde_json::from_str(&stdout)
            .unwrap_or_else(|err| panic!("invalid json ({err}): {stdout}"))
    }

    /// Spawns without waiting, for tests that need to interact with the
    /// child while it runs (the TailClient specs).
    pub fn spawn_piped(mut self) -> Child {
        self.command.stdin(Stdio::piped()).stdout(Stdio::piped()).stderr(Stdio::piped());
        self.command.spawn().expect("spawn persistproc")
    }
}

/// Binds an ephemeral port and releases it immediately. There's a small
/// window where another process could grab it before the daemon binds;
/// acceptable in a test harness.
fn free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    listener.local_addr().expect("read local addr").port()
}

/// Polls `condition` at a short interval until it returns `true` or
/// `max_ms` elapses, returning whether it ever succeeded.
pub fn wait_for(max_ms: u64, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_millis(max_ms);
    loop {
        if condition() {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        std::thread::sleep(Duration::from_millis(50));
    }
}

/// Drains a child's stdout on a background thread, line by line, so a
/// test can poll for an expected line without blocking on a read that
/// would otherwise race the child's own pace (the TailClient specs).
pub struct LineReader {
    rx: mpsc::Receiver<String>,
}

impl LineReader {
    pub fn spawn(stdout: ChildStdout) -> Self {
        let (tx, rx) = mpsc::channel();
        std::thread::spawn(move || {
            let reader = BufReader::new(stdout);
            for line in reader.lines().map_while(Result::ok) {
                if tx.send(line).is_err() {
                    break;
                }
            }
        });
        Self { rx }
    }

    /// Blocks (up to `timeout`) until a line matching `predicate` arrives.
    pub fn wait_for(&self, predicate: impl Fn(&str) -> bool, timeout: Duration) -> Option<String> {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return None;
            }
            match self.rx.recv_timeout(remaining.min(Duration::from_millis(200))) {
                Ok(line) if predicate(&line) => return Some(line),
                Ok(_) => continue,
                Err(mpsc::RecvTimeoutError::Timeout) => continue,
                Err(mpsc::RecvTimeoutError::Disconnected) => return None,
            }
        }
    }
}
