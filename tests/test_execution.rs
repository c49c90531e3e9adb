// Execution and classification against a real child process.
#![cfg(unix)]

mod common;

use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

use common::{Corpus, HANGS, NOT_EXECUTED, PASSING, SHELL, SYNTAX_ERROR};
use conformance_harness::discovery::TestCase;
use conformance_harness::execution::{Executor, Verdict};

fn case(corpus: &Corpus, relative: &str, contents: &str) -> TestCase {
    let path = corpus.add(relative, contents);
    TestCase {
        id: relative.to_string(),
        path,
    }
}

fn executor(timeout: Duration) -> Executor {
    Executor::new(SHELL, common::fast_execution(timeout))
}

#[test]
fn clean_exit_with_empty_stdout_passes() {
    let corpus = Corpus::new();
    let outcome = executor(Duration::from_secs(5)).run(&case(&corpus, "test/ok.js", PASSING));
    assert_eq!(outcome.verdict, Verdict::Pass);
    assert_eq!(outcome.detail, "");
    assert_eq!(outcome.test, "test/ok.js");
}

#[test]
fn loaded_but_not_executed_fails() {
    let corpus = Corpus::new();
    let outcome =
        executor(Duration::from_secs(5)).run(&case(&corpus, "test/loaded.js", NOT_EXECUTED));
    assert_eq!(outcome.verdict, Verdict::Fail);
    assert!(outcome.detail.contains("execution not implemented"));
}

#[test]
fn nonzero_exit_reports_code_and_stderr() {
    let corpus = Corpus::new();
    let outcome =
        executor(Duration::from_secs(5)).run(&case(&corpus, "test/syntax.js", SYNTAX_ERROR));
    assert_eq!(outcome.verdict, Verdict::Fail);
    assert!(outcome.detail.contains("Exit code: 2"), "{}", outcome.detail);
    assert!(outcome.detail.contains("SyntaxError: x"), "{}", outcome.detail);
}

#[test]
fn long_stderr_is_truncated() {
    let corpus = Corpus::new();
    let script = "i=0\nwhile [ $i -lt 100 ]; do printf 'abcdefghij' >&2; i=$((i+1)); done\nexit 1\n";
    let outcome = executor(Duration::from_secs(5)).run(&case(&corpus, "test/noisy.js", script));
    let excerpt = outcome.detail.trim_start_matches("Exit code: 1, stderr: ");
    assert_eq!(excerpt.chars().count(), 200);
}

#[test]
fn hanging_test_times_out_promptly() {
    let corpus = Corpus::new();
    let started = Instant::now();
    let outcome = executor(Duration::from_millis(300)).run(&case(&corpus, "test/hang.js", HANGS));
    assert_eq!(outcome.verdict, Verdict::Timeout);
    assert!(outcome.detail.contains("timeout"));
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[test]
fn large_output_does_not_block_the_child() {
    let corpus = Corpus::new();
    // Well past a pipe buffer on both streams.
    let script = "i=0\nwhile [ $i -lt 20000 ]; do echo 'line of output'; echo 'err' >&2; i=$((i+1)); done\nexit 0\n";
    let outcome = executor(Duration::from_secs(10)).run(&case(&corpus, "test/chatty.js", script));
    assert_eq!(outcome.verdict, Verdict::Pass);
}

#[test]
fn missing_test_file_is_a_target_failure() {
    let outcome = executor(Duration::from_secs(5)).run(&TestCase {
        id: "test/gone.js".to_string(),
        path: Path::new("/no/such/dir/gone.js").to_path_buf(),
    });
    assert_eq!(outcome.verdict, Verdict::Fail);
    assert!(outcome.detail.starts_with("Exit code: "));
}

#[test]
fn spawn_failure_is_a_failure_not_a_panic() {
    let corpus = Corpus::new();
    let executor = Executor::new(
        corpus.root().join("no-such-engine"),
        common::fast_execution(Duration::from_secs(1)),
    );
    let outcome = executor.run(&case(&corpus, "test/ok.js", PASSING));
    assert_eq!(outcome.verdict, Verdict::Fail);
    assert!(!outcome.detail.is_empty());
}

#[cfg(target_os = "linux")]
fn is_running(pid: u32) -> bool {
    match fs::read_to_string(format!("/proc/{}/stat", pid)) {
        // Field 3 is the state; zombies are already dead.
        Ok(stat) => stat
            .rsplit(')')
            .next()
            .and_then(|rest| rest.split_whitespace().next())
            .is_some_and(|state| state != "Z"),
        Err(_) => false,
    }
}

#[cfg(target_os = "linux")]
#[test]
fn timeout_kills_descendants_too() {
    let corpus = Corpus::new();
    let pid_file = corpus.root().join("grandchild.pid");
    let script = format!(
        "sleep 30 &\necho $! > '{}'\nwait\n",
        pid_file.display()
    );
    let outcome = executor(Duration::from_millis(500)).run(&case(&corpus, "test/spawns.js", &script));
    assert_eq!(outcome.verdict, Verdict::Timeout);

    let pid = read_pid(&pid_file);
    assert!(
        wait_until_gone(pid, Duration::from_secs(2)),
        "grandchild {} survived the timeout",
        pid
    );
}

#[cfg(target_os = "linux")]
fn wait_until_gone(pid: u32, within: Duration) -> bool {
    let deadline = Instant::now() + within;
    while is_running(pid) && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(20));
    }
    !is_running(pid)
}

#[cfg(target_os = "linux")]
fn read_pid(path: &Path) -> u32 {
    fs::read_to_string(path)
        .expect("pid written")
        .trim()
        .parse()
        .expect("numeric pid")
}

#[cfg(target_os = "linux")]
#[test]
fn background_descendant_is_killed_after_a_clean_exit() {
    let corpus = Corpus::new();
    let pid_file = corpus.root().join("background.pid");
    let script = format!(
        "sleep 30 >/dev/null 2>&1 &\necho $! > '{}'\nexit 0\n",
        pid_file.display()
    );
    let outcome = executor(Duration::from_millis(500)).run(&case(&corpus, "test/detach.js", &script));
    assert_eq!(outcome.verdict, Verdict::Pass);

    let pid = read_pid(&pid_file);
    assert!(
        wait_until_gone(pid, Duration::from_secs(2)),
        "background process {} outlived its test",
        pid
    );
}

#[cfg(target_os = "linux")]
#[test]
fn pipe_held_outside_the_group_does_not_hang_the_run() {
    let has_setsid = std::process::Command::new("setsid")
        .arg("true")
        .status()
        .is_ok_and(|status| status.success());
    if !has_setsid {
        return;
    }

    let corpus = Corpus::new();
    let pid_file = corpus.root().join("session.pid");
    let script = format!(
        "setsid sleep 30 &\necho $! > '{}'\nexit 0\n",
        pid_file.display()
    );
    let started = Instant::now();
    let outcome = executor(Duration::from_millis(300)).run(&case(&corpus, "test/setsid.js", &script));
    let elapsed = started.elapsed();

    let pid = read_pid(&pid_file);
    let _ = std::process::Command::new("kill")
        .args(["-9", &pid.to_string()])
        .status();

    assert_eq!(outcome.verdict, Verdict::Timeout);
    assert!(elapsed < Duration::from_secs(5), "run took {:?}", elapsed);
}

#[test]
fn same_behaviour_same_verdict_in_any_order() {
    let corpus = Corpus::new();
    let a = case(&corpus, "test/a.js", SYNTAX_ERROR);
    let b = case(&corpus, "test/b.js", PASSING);
    let exec = executor(Duration::from_secs(5));

    let first = (exec.run(&a), exec.run(&b));
    let second_b = exec.run(&b);
    let second_a = exec.run(&a);
    assert_eq!(first.0, second_a);
    assert_eq!(first.1, second_b);
}
