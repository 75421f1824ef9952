//! Process-level tests for the runner.
//!
//! `sh` stands in for the toolchain: `sh -` reads the submitted code from
//! stdin, and `sh -c "echo ..."` plays the version query. The timeout
//! wrapper is coreutils `timeout`.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use futures_util::StreamExt;

use coderunner_exec::{ExecError, ExecutionParams, FrameKind, Runner, RunnerConfig, StreamFrame};

const VERSION_TEXT: &str = "test-toolchain version 1.0\n";

fn sh_config() -> RunnerConfig {
    RunnerConfig {
        toolchain: "sh".to_string(),
        version_args: vec!["-c".to_string(), "echo test-toolchain version 1.0".to_string()],
        kill_grace: Duration::from_secs(2),
        ..RunnerConfig::default()
    }
}

fn sh_runner() -> Runner {
    Runner::new(sh_config()).expect("valid config")
}

/// Concatenates frame text per kind, preserving per-source order.
fn by_kind(frames: &[StreamFrame]) -> HashMap<FrameKind, String> {
    let mut out: HashMap<FrameKind, String> = HashMap::new();
    for frame in frames {
        out.entry(frame.kind).or_default().push_str(&frame.text);
    }
    out
}

// ---------------------------------------------------------------------------
// Version query
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_version_query_returns_untrimmed_stdout() {
    let version = sh_runner().query_version().await;
    assert_eq!(version, VERSION_TEXT);
}

#[tokio::test]
async fn test_version_query_missing_binary_is_empty() {
    let runner = Runner::new(RunnerConfig {
        toolchain: "coderunner-definitely-not-installed".to_string(),
        ..sh_config()
    })
    .unwrap();
    assert_eq!(runner.query_version().await, "");
}

// ---------------------------------------------------------------------------
// Buffered mode
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_buffered_run_captures_stdout_and_version() {
    let result = sh_runner()
        .run_buffered(&ExecutionParams::new("echo 1"))
        .await
        .unwrap();
    assert_eq!(result.output, "1\n");
    assert_eq!(result.errors, "");
    assert_eq!(result.version, VERSION_TEXT);
}

#[tokio::test]
async fn test_buffered_run_keeps_streams_separate() {
    let code = "echo out-1\necho err-1 >&2\necho out-2\n";
    let result = sh_runner().run_buffered(&ExecutionParams::new(code)).await.unwrap();
    assert_eq!(result.output, "out-1\nout-2\n");
    assert_eq!(result.errors, "err-1\n");
}

#[tokio::test]
async fn test_buffered_run_failure_is_not_an_error() {
    let result = sh_runner()
        .run_buffered(&ExecutionParams::new("echo partial\necho boom >&2\nexit 3"))
        .await
        .unwrap();
    assert_eq!(result.output, "partial\n");
    assert_eq!(result.errors, "boom\n");
}

#[tokio::test]
async fn test_buffered_options_reach_toolchain() {
    // `sh -e -` stops at the first failing command
    let params = ExecutionParams::new("echo before\nfalse\necho after").with_options("-e");
    let result = sh_runner().run_buffered(&params).await.unwrap();
    assert_eq!(result.output, "before\n");
}

#[tokio::test]
async fn test_buffered_timeout_kills_infinite_loop() {
    let params = ExecutionParams::new("echo started\nwhile :; do :; done").with_timeout(1);
    let started = Instant::now();
    let result = sh_runner().run_buffered(&params).await.unwrap();
    let elapsed = started.elapsed();

    assert!(elapsed >= Duration::from_secs(1), "returned too early: {:?}", elapsed);
    assert!(elapsed < Duration::from_secs(6), "took too long: {:?}", elapsed);
    assert_eq!(result.output, "started\n");
}

#[tokio::test]
async fn test_buffered_run_does_not_wait_for_background_jobs() {
    let params = ExecutionParams::new("echo hi\nsleep 20 &\n").with_timeout(1);
    let started = Instant::now();
    let result = tokio::time::timeout(Duration::from_secs(10), sh_runner().run_buffered(&params))
        .await
        .expect("buffered run hung on a background job")
        .unwrap();

    assert!(started.elapsed() < Duration::from_secs(6), "took {:?}", started.elapsed());
    assert_eq!(result.output, "hi\n");
}

#[tokio::test]
async fn test_buffered_timeout_with_background_job_holding_stderr() {
    let params = ExecutionParams::new("sleep 20 >&2 &\nwhile :; do :; done").with_timeout(1);
    let started = Instant::now();
    let result = tokio::time::timeout(Duration::from_secs(10), sh_runner().run_buffered(&params))
        .await
        .expect("buffered run hung on a background job")
        .unwrap();

    assert!(started.elapsed() < Duration::from_secs(6), "took {:?}", started.elapsed());
    assert_eq!(result.errors, "");
}

#[tokio::test]
async fn test_buffered_color_sets_term() {
    let params = ExecutionParams::new("echo \"$TERM\"").with_color(true);
    let result = sh_runner().run_buffered(&params).await.unwrap();
    assert_eq!(result.output, "xterm-256color\n");
}

#[tokio::test]
async fn test_buffered_missing_timeout_wrapper_is_spawn_error() {
    let runner = Runner::new(RunnerConfig {
        timeout_program: "coderunner-no-such-timeout".to_string(),
        ..sh_config()
    })
    .unwrap();
    let err = runner
        .run_buffered(&ExecutionParams::new("echo 1"))
        .await
        .unwrap_err();
    assert!(matches!(err, ExecError::Spawn { ref program, .. } if program == "coderunner-no-such-timeout"));
}

// ---------------------------------------------------------------------------
// Streaming mode
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_stream_labels_every_source() {
    let stream = sh_runner()
        .stream(&ExecutionParams::new("echo out\necho err >&2"))
        .unwrap();
    let frames: Vec<StreamFrame> = stream.collect().await;
    let texts = by_kind(&frames);

    assert_eq!(texts.get(&FrameKind::Version).map(String::as_str), Some(VERSION_TEXT));
    assert_eq!(texts.get(&FrameKind::Stdout).map(String::as_str), Some("out\n"));
    assert_eq!(texts.get(&FrameKind::Stderr).map(String::as_str), Some("err\n"));
}

#[tokio::test]
async fn test_stream_delivers_before_process_exits() {
    let params = ExecutionParams::new("echo early\nsleep 3\necho late");
    let mut stream = sh_runner().stream(&params).unwrap();

    let started = Instant::now();
    loop {
        let frame = stream.next().await.expect("stream ended before stdout frame");
        if frame.kind == FrameKind::Stdout {
            assert_eq!(frame.text, "early\n");
            break;
        }
    }
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn test_stream_missing_version_binary_emits_empty_version_frame() {
    let runner = Runner::new(RunnerConfig {
        toolchain: "coderunner-definitely-not-installed".to_string(),
        ..sh_config()
    })
    .unwrap();
    let frames: Vec<StreamFrame> = runner.stream(&ExecutionParams::new("echo 1")).unwrap().collect().await;
    let version: Vec<_> = frames.iter().filter(|f| f.kind == FrameKind::Version).collect();
    assert_eq!(version.len(), 1);
    assert_eq!(version[0].text, "");
}

#[tokio::test]
async fn test_stream_timeout_ends_stream() {
    let params = ExecutionParams::new("while :; do :; done").with_timeout(1);
    let started = Instant::now();
    let frames: Vec<StreamFrame> = sh_runner().stream(&params).unwrap().collect().await;
    assert!(started.elapsed() < Duration::from_secs(6));
    assert!(frames.iter().all(|f| f.kind != FrameKind::Stdout));
}

#[tokio::test]
async fn test_stream_with_background_job_ends_at_backstop() {
    let params = ExecutionParams::new("echo hi\nsleep 20 &\n").with_timeout(1);
    let started = Instant::now();
    let frames: Vec<StreamFrame> = tokio::time::timeout(
        Duration::from_secs(10),
        sh_runner().stream(&params).unwrap().collect::<Vec<_>>(),
    )
    .await
    .expect("stream hung on a background job");

    assert!(started.elapsed() < Duration::from_secs(6), "took {:?}", started.elapsed());
    assert_eq!(by_kind(&frames).get(&FrameKind::Stdout).map(String::as_str), Some("hi\n"));
}

#[cfg(target_os = "linux")]
#[tokio::test]
async fn test_dropping_stream_kills_process_group() {
    // `exec sleep` keeps the pid, so the pid printed is the one to watch
    let params = ExecutionParams::new("echo $$\nexec sleep 30");
    let mut stream = sh_runner().stream(&params).unwrap();

    let pid: u32 = loop {
        let frame = stream.next().await.expect("no pid frame");
        if frame.kind == FrameKind::Stdout {
            break frame.text.trim().parse().expect("pid");
        }
    };
    assert!(is_running(pid));

    drop(stream);

    let deadline = Instant::now() + Duration::from_secs(3);
    while is_running(pid) && Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    assert!(!is_running(pid), "process {} survived the dropped stream", pid);
}

/// Alive and not a zombie.
#[cfg(target_os = "linux")]
fn is_running(pid: u32) -> bool {
    match std::fs::read_to_string(format!("/proc/{}/stat", pid)) {
        Ok(stat) => stat
            .rsplit(')')
            .next()
            .and_then(|rest| rest.split_whitespace().next())
            .is_some_and(|state| state != "Z"),
        Err(_) => false,
    }
}
