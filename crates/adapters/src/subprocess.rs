// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subprocess execution with per-invocation timeouts and cancellation.
//!
//! Every external tool call goes through a [`CommandRunner`]. Commands are
//! always built as argv lists; nothing is ever passed through a shell.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Default timeout for auth activation and capability probes.
pub const VERIFY_TIMEOUT: Duration = Duration::from_secs(60);

/// Default timeout for the launcher. Staging a pipeline uploads its
/// artifacts, which can take several minutes.
pub const SUBMIT_TIMEOUT: Duration = Duration::from_secs(15 * 60);

/// Default timeout for one `describe` call.
pub const POLL_TIMEOUT: Duration = Duration::from_secs(60);

/// Default timeout for one `cancel` call.
pub const CANCEL_TIMEOUT: Duration = Duration::from_secs(120);

/// How long a killed child's pipes may keep draining before they are cut.
const KILL_GRACE: Duration = Duration::from_millis(200);

/// Errors from running a subprocess (before its exit code is considered).
///
/// A killed process still reports whatever it wrote to stderr first.
#[derive(Debug, Error)]
pub enum SubprocessError {
    #[error("failed to run `{command}`: {source}")]
    Spawn { command: String, source: std::io::Error },

    #[error("`{command}` timed out after {timeout:?}{}", stderr_suffix(stderr))]
    Timeout { command: String, timeout: Duration, stderr: String },

    #[error("`{command}` interrupted{}", stderr_suffix(stderr))]
    Interrupted { command: String, stderr: String },
}

impl SubprocessError {
    /// Stderr captured before the process was killed.
    pub fn stderr(&self) -> Option<&str> {
        match self {
            SubprocessError::Timeout { stderr, .. } | SubprocessError::Interrupted { stderr, .. } => {
                Some(stderr)
            }
            SubprocessError::Spawn { .. } => None,
        }
    }
}

fn stderr_suffix(stderr: &str) -> String {
    if stderr.is_empty() {
        String::new()
    } else {
        format!(": {stderr}")
    }
}

/// One external process invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub timeout: Duration,
    /// Short name for logs, e.g. "jobs describe".
    pub label: &'static str,
}

impl Invocation {
    pub fn new(program: impl Into<String>, label: &'static str) -> Self {
        Self { program: program.into(), args: Vec::new(), timeout: VERIFY_TIMEOUT, label }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Program and arguments joined with spaces, for messages only.
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Full argv (program first).
    pub fn argv(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.program.as_str()).chain(self.args.iter().map(String::as_str))
    }
}

/// Captured result of a finished process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Successful exit with the given stdout.
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self { exit_code: Some(0), stdout: stdout.into(), stderr: String::new() }
    }

    /// Failed exit with the given code and stderr.
    pub fn failed(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self { exit_code: Some(exit_code), stdout: String::new(), stderr: stderr.into() }
    }

    /// Stderr trimmed for error messages.
    pub fn stderr_text(&self) -> String {
        self.stderr.trim().to_string()
    }
}

impl From<std::process::Output> for CommandOutput {
    fn from(output: std::process::Output) -> Self {
        Self {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}

/// Adapter for running external tools.
#[async_trait]
pub trait CommandRunner: Clone + Send + Sync + 'static {
    /// Locate `program` on the search path.
    fn resolve(&self, program: &str) -> Option<PathBuf>;

    /// Run to completion, capturing stdout and stderr separately.
    async fn run(&self, invocation: &Invocation) -> Result<CommandOutput, SubprocessError>;
}

/// Runs real processes via `tokio::process`.
///
/// Holds the cancellation token for every invocation it starts; cancelling it
/// kills whichever child is currently running.
#[derive(Clone, Default)]
pub struct SystemRunner {
    cancel: CancellationToken,
}

impl SystemRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cancel(cancel: CancellationToken) -> Self {
        Self { cancel }
    }
}

#[async_trait]
impl CommandRunner for SystemRunner {
    fn resolve(&self, program: &str) -> Option<PathBuf> {
        find_on_path(program, std::env::var_os("PATH").as_deref())
    }

    async fn run(&self, invocation: &Invocation) -> Result<CommandOutput, SubprocessError> {
        tracing::debug!(
            label = invocation.label,
            command = %invocation.command_line(),
            timeout = ?invocation.timeout,
            "running"
        );
        let mut cmd = tokio::process::Command::new(&invocation.program);
        cmd.args(&invocation.args).stdin(Stdio::null());
        let start = std::time::Instant::now();
        let output = run_with_timeout(cmd, invocation.timeout, &self.cancel, invocation).await?;
        let output = CommandOutput::from(output);
        tracing::debug!(
            label = invocation.label,
            exit_code = ?output.exit_code,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "finished"
        );
        if !output.stderr.trim().is_empty() {
            tracing::debug!(label = invocation.label, stderr = %output.stderr.trim(), "stderr");
        }
        Ok(output)
    }
}

/// Spawn `cmd` and wait for it, killing the child on timeout or cancellation.
///
/// Both pipes are drained while the child runs, so output written before a
/// kill is still available for the error.
pub async fn run_with_timeout(
    mut cmd: tokio::process::Command,
    timeout: Duration,
    cancel: &CancellationToken,
    invocation: &Invocation,
) -> Result<std::process::Output, SubprocessError> {
    let command = || invocation.command_line();
    if cancel.is_cancelled() {
        return Err(SubprocessError::Interrupted { command: command(), stderr: String::new() });
    }

    cmd.stdout(Stdio::piped()).stderr(Stdio::piped()).kill_on_drop(true);
    let mut child =
        cmd.spawn().map_err(|source| SubprocessError::Spawn { command: command(), source })?;
    let stdout = Capture::default();
    let stderr = Capture::default();
    let mut readers = [stdout.drain(child.stdout.take()), stderr.drain(child.stderr.take())];

    let status = tokio::select! {
        biased;
        _ = cancel.cancelled() => None,
        result = tokio::time::timeout(timeout, child.wait()) => match result {
            Ok(Ok(status)) => Some(status),
            Ok(Err(source)) => return Err(SubprocessError::Spawn { command: command(), source }),
            Err(_) => None,
        },
    };

    let Some(status) = status else {
        if let Err(e) = child.kill().await {
            tracing::warn!(label = invocation.label, error = %e, "failed to kill child");
        }
        // A grandchild may still hold the pipes open.
        let _ = tokio::time::timeout(KILL_GRACE, join_all(&mut readers)).await;
        readers.iter().for_each(JoinHandle::abort);
        let stderr = String::from_utf8_lossy(&stderr.take().await).trim().to_string();
        return Err(if cancel.is_cancelled() {
            tracing::warn!(label = invocation.label, "interrupted, killed child");
            SubprocessError::Interrupted { command: command(), stderr }
        } else {
            tracing::warn!(label = invocation.label, ?timeout, "timed out, killed child");
            SubprocessError::Timeout { command: command(), timeout, stderr }
        });
    };

    join_all(&mut readers).await;
    Ok(std::process::Output { status, stdout: stdout.take().await, stderr: stderr.take().await })
}

async fn join_all(readers: &mut [JoinHandle<()>]) {
    for reader in readers.iter_mut() {
        let _ = reader.await;
    }
}

/// Pipe contents collected as the child writes them.
#[derive(Clone, Default)]
struct Capture(Arc<tokio::sync::Mutex<Vec<u8>>>);

impl Capture {
    fn drain<P>(&self, pipe: Option<P>) -> JoinHandle<()>
    where
        P: AsyncRead + Unpin + Send + 'static,
    {
        let buf = self.clone();
        tokio::spawn(async move {
            let Some(mut pipe) = pipe else { return };
            let mut chunk = [0u8; 4096];
            while let Ok(n) = pipe.read(&mut chunk).await {
                if n == 0 {
                    break;
                }
                buf.0.lock().await.extend_from_slice(&chunk[..n]);
            }
        })
    }

    async fn take(&self) -> Vec<u8> {
        std::mem::take(&mut *self.0.lock().await)
    }
}

/// Resolve `program` against `path_var` the way a shell would.
///
/// A program containing a path separator is checked as-is.
pub fn find_on_path(program: &str, path_var: Option<&std::ffi::OsStr>) -> Option<PathBuf> {
    if program.is_empty() {
        return None;
    }
    if program.contains(std::path::MAIN_SEPARATOR) {
        let path = PathBuf::from(program);
        return is_executable(&path).then_some(path);
    }
    std::env::split_paths(path_var?)
        .map(|dir| dir.join(program))
        .find(|candidate| is_executable(candidate))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path).map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0).unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod fake {
    use super::{CommandOutput, CommandRunner, Invocation, SubprocessError};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::collections::{HashSet, VecDeque};
    use std::path::PathBuf;
    use std::sync::Arc;

    /// Scripted reply for a matching invocation.
    #[derive(Debug, Clone)]
    pub enum FakeReply {
        Output(CommandOutput),
        Timeout,
    }

    struct Rule {
        argv_prefix: Vec<String>,
        replies: VecDeque<FakeReply>,
    }

    #[derive(Default)]
    struct FakeRunnerState {
        missing: HashSet<String>,
        rules: Vec<Rule>,
        calls: Vec<Invocation>,
    }

    /// Fake runner with scripted process output.
    ///
    /// Replies are matched by argv prefix, most recently added rule first.
    /// Within a rule replies are consumed in order and the last one repeats.
    /// Unmatched invocations exit 0 with empty output.
    #[derive(Clone, Default)]
    pub struct FakeRunner {
        inner: Arc<Mutex<FakeRunnerState>>,
    }

    impl FakeRunner {
        pub fn new() -> Self {
            Self::default()
        }

        /// Make `resolve(program)` fail.
        pub fn missing_tool(self, program: &str) -> Self {
            self.inner.lock().missing.insert(program.to_string());
            self
        }

        /// Queue `output` for invocations whose argv starts with `argv_prefix`.
        pub fn respond(&self, argv_prefix: &[&str], output: CommandOutput) -> &Self {
            self.push(argv_prefix, FakeReply::Output(output))
        }

        /// Queue a timeout for invocations whose argv starts with `argv_prefix`.
        pub fn time_out(&self, argv_prefix: &[&str]) -> &Self {
            self.push(argv_prefix, FakeReply::Timeout)
        }

        fn push(&self, argv_prefix: &[&str], reply: FakeReply) -> &Self {
            let prefix: Vec<String> = argv_prefix.iter().map(|s| s.to_string()).collect();
            let mut inner = self.inner.lock();
            match inner.rules.iter_mut().find(|r| r.argv_prefix == prefix) {
                Some(rule) => rule.replies.push_back(reply),
                None => inner.rules.push(Rule { argv_prefix: prefix, replies: VecDeque::from([reply]) }),
            }
            drop(inner);
            self
        }

        /// All invocations, in order.
        pub fn calls(&self) -> Vec<Invocation> {
            self.inner.lock().calls.clone()
        }

        /// Invocations whose argv starts with `argv_prefix`.
        pub fn calls_matching(&self, argv_prefix: &[&str]) -> Vec<Invocation> {
            self.calls().into_iter().filter(|inv| starts_with(inv, argv_prefix)).collect()
        }
    }

    fn starts_with<S: AsRef<str>>(invocation: &Invocation, prefix: &[S]) -> bool {
        let argv: Vec<&str> = invocation.argv().collect();
        argv.len() >= prefix.len() && prefix.iter().zip(&argv).all(|(p, a)| p.as_ref() == *a)
    }

    #[async_trait]
    impl CommandRunner for FakeRunner {
        fn resolve(&self, program: &str) -> Option<PathBuf> {
            if self.inner.lock().missing.contains(program) {
                None
            } else {
                Some(PathBuf::from("/usr/bin").join(program))
            }
        }

        async fn run(&self, invocation: &Invocation) -> Result<CommandOutput, SubprocessError> {
            let mut inner = self.inner.lock();
            inner.calls.push(invocation.clone());
            let reply = inner
                .rules
                .iter_mut()
                .rev()
                .find(|r| starts_with(invocation, &r.argv_prefix))
                .and_then(|rule| {
                    if rule.replies.len() > 1 {
                        rule.replies.pop_front()
                    } else {
                        rule.replies.front().cloned()
                    }
                });
            drop(inner);

            match reply {
                Some(FakeReply::Output(output)) => Ok(output),
                Some(FakeReply::Timeout) => Err(SubprocessError::Timeout {
                    command: invocation.command_line(),
                    timeout: invocation.timeout,
                    stderr: String::new(),
                }),
                None => Ok(CommandOutput::ok("")),
            }
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeReply, FakeRunner};

#[cfg(test)]
#[path = "subprocess_tests.rs"]
mod tests;
