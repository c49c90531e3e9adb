//! Runs one test file through the target executable and classifies the run.
//!
//! The executor owns every way a single test can go wrong. Spawn failures,
//! pipe errors and timeouts all come back as a [`TestOutcome`], so one bad
//! test never stops the rest of the corpus.

use std::fmt;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::config::ExecutionConfig;
use crate::discovery::TestCase;

const POLL_INTERVAL: Duration = Duration::from_millis(10);
/// How long reader threads get to see their pipe close after the group kill.
const READER_GRACE: Duration = Duration::from_millis(500);
/// Longest stderr excerpt kept in a failure detail, in characters.
pub const STDERR_EXCERPT_CHARS: usize = 200;
pub const NOT_EXECUTED_DETAIL: &str = "execution not implemented (file loaded but not executed)";

// =============================================================================
// OUTCOME TYPES
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    Fail,
    Timeout,
}

impl Verdict {
    /// Timeouts count as failures in every total.
    pub fn is_failure(self) -> bool {
        !matches!(self, Verdict::Pass)
    }
}

/// The result of running exactly one test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestOutcome {
    pub test: String,
    pub verdict: Verdict,
    /// Short diagnostic. Empty for passes.
    pub detail: String,
}

impl TestOutcome {
    pub fn pass(test: impl Into<String>) -> Self {
        Self {
            test: test.into(),
            verdict: Verdict::Pass,
            detail: String::new(),
        }
    }

    pub fn fail(test: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            test: test.into(),
            verdict: Verdict::Fail,
            detail: detail.into(),
        }
    }

    pub fn timeout(test: impl Into<String>, limit: Duration) -> Self {
        Self {
            test: test.into(),
            verdict: Verdict::Timeout,
            detail: format!("Test timeout (>{})", format_limit(limit)),
        }
    }
}

/// How the child process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitState {
    Code(i32),
    Signal(i32),
}

impl ExitState {
    pub fn from_status(status: ExitStatus) -> Self {
        if let Some(code) = status.code() {
            return ExitState::Code(code);
        }
        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = status.signal() {
                return ExitState::Signal(signal);
            }
        }
        ExitState::Code(-1)
    }

    pub fn success(self) -> bool {
        self == ExitState::Code(0)
    }
}

impl fmt::Display for ExitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitState::Code(code) => write!(f, "{}", code),
            ExitState::Signal(signal) => write!(f, "signal {}", signal),
        }
    }
}

/// Everything observed from a child that finished on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    pub exit: ExitState,
    pub stdout: String,
    pub stderr: String,
}

// =============================================================================
// CLASSIFICATION
// =============================================================================

/// Maps a finished run to a verdict and detail.
///
/// A target that prints the not-executed marker fails even on exit 0: it
/// read the file without running it. An empty marker disables that check.
pub fn classify(output: &ProcessOutput, not_executed_marker: &str) -> (Verdict, String) {
    if !not_executed_marker.is_empty() && output.stdout.contains(not_executed_marker) {
        return (Verdict::Fail, NOT_EXECUTED_DETAIL.to_string());
    }

    if !output.exit.success() {
        let excerpt: String = output.stderr.chars().take(STDERR_EXCERPT_CHARS).collect();
        return (
            Verdict::Fail,
            format!("Exit code: {}, stderr: {}", output.exit, excerpt),
        );
    }

    (Verdict::Pass, String::new())
}

fn format_limit(limit: Duration) -> String {
    if limit.subsec_nanos() == 0 {
        format!("{}s", limit.as_secs())
    } else {
        format!("{}ms", limit.as_millis())
    }
}

// =============================================================================
// EXECUTION
// =============================================================================

enum Completion {
    Exited(ProcessOutput),
    TimedOut,
}

/// Runs test files against one target executable.
#[derive(Debug, Clone)]
pub struct Executor {
    target: PathBuf,
    config: ExecutionConfig,
}

impl Executor {
    pub fn new(target: impl Into<PathBuf>, config: ExecutionConfig) -> Self {
        Self {
            target: target.into(),
            config,
        }
    }

    /// Runs one test. Always produces exactly one outcome.
    pub fn run(&self, case: &TestCase) -> TestOutcome {
        let outcome = match self.spawn_and_wait(&case.path) {
            Ok(Completion::Exited(output)) => {
                let (verdict, detail) = classify(&output, &self.config.not_executed_marker);
                TestOutcome {
                    test: case.id.clone(),
                    verdict,
                    detail,
                }
            }
            Ok(Completion::TimedOut) => {
                warn!(test = %case.id, "test exceeded {:?}, process group killed", self.config.timeout);
                TestOutcome::timeout(case.id.clone(), self.config.timeout)
            }
            Err(e) => TestOutcome::fail(case.id.clone(), e.to_string()),
        };
        debug!(test = %outcome.test, verdict = ?outcome.verdict, "test finished");
        outcome
    }

    fn spawn_and_wait(&self, test_path: &Path) -> io::Result<Completion> {
        let mut command = Command::new(&self.target);
        command
            .arg(test_path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        set_process_group(&mut command);

        let mut child = command.spawn()?;
        let deadline = Instant::now() + self.config.timeout;
        let stdout = PipeReader::spawn(child.stdout.take());
        let stderr = PipeReader::spawn(child.stderr.take());

        let completion = wait_for(&mut child, &stdout, &stderr, deadline);

        // No member of the group outlives its test, even after a clean exit.
        // A descendant that called setsid has left the group and is out of
        // reach here.
        terminate(&mut child);
        stdout.join(READER_GRACE);
        stderr.join(READER_GRACE);
        completion
    }
}

fn wait_for(
    child: &mut Child,
    stdout: &PipeReader,
    stderr: &PipeReader,
    deadline: Instant,
) -> io::Result<Completion> {
    let status = loop {
        match child.try_wait()? {
            Some(status) => break status,
            None if Instant::now() >= deadline => return Ok(Completion::TimedOut),
            None => thread::sleep(POLL_INTERVAL),
        }
    };

    // A descendant may still hold the pipes open after the child exits.
    let stdout = match stdout.read_until(deadline)? {
        Some(text) => text,
        None => return Ok(Completion::TimedOut),
    };
    let stderr = match stderr.read_until(deadline)? {
        Some(text) => text,
        None => return Ok(Completion::TimedOut),
    };

    Ok(Completion::Exited(ProcessOutput {
        exit: ExitState::from_status(status),
        stdout,
        stderr,
    }))
}

/// Drains one of the child's pipes on its own thread.
struct PipeReader {
    rx: Receiver<io::Result<String>>,
    handle: JoinHandle<()>,
}

impl PipeReader {
    fn spawn<R>(source: Option<R>) -> Self
    where
        R: Read + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let handle = thread::spawn(move || {
            let result = match source {
                Some(mut source) => {
                    let mut buf = Vec::new();
                    source
                        .read_to_end(&mut buf)
                        .map(|_| String::from_utf8_lossy(&buf).into_owned())
                }
                None => Ok(String::new()),
            };
            let _ = tx.send(result);
        });
        Self { rx, handle }
    }

    /// Waits for the captured text until the deadline. `None` means the pipe
    /// was still open when it passed.
    fn read_until(&self, deadline: Instant) -> io::Result<Option<String>> {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match self.rx.recv_timeout(remaining) {
            Ok(result) => result.map(Some),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "output reader exited without a result",
            )),
        }
    }

    /// Joins the thread once the pipe has closed.
    ///
    /// After the group kill only a process outside the group can still hold
    /// the pipe. That reader is left to finish on its own once `grace` runs
    /// out.
    fn join(self, grace: Duration) {
        let deadline = Instant::now() + grace;
        while !self.handle.is_finished() {
            if Instant::now() >= deadline {
                warn!("output pipe still held open after the process group was killed");
                return;
            }
            thread::sleep(POLL_INTERVAL);
        }
        let _ = self.handle.join();
    }
}

/// Kills the child and everything left in its process group, then reaps
/// the child. Safe to call after the child has already exited.
fn terminate(child: &mut Child) {
    kill_process_tree(child);
    let _ = child.wait();
}

#[cfg(unix)]
fn set_process_group(command: &mut Command) {
    use std::os::unix::process::CommandExt;
    command.process_group(0);
}

#[cfg(not(unix))]
fn set_process_group(_command: &mut Command) {}

#[cfg(unix)]
fn kill_process_tree(child: &mut Child) {
    // The child leads its own group, so its pid is also the group id.
    let pgid = child.id() as libc::pid_t;
    unsafe {
        libc::kill(-pgid, libc::SIGKILL);
    }
    let _ = child.kill();
}

#[cfg(not(unix))]
fn kill_process_tree(child: &mut Child) {
    let _ = child.kill();
}
