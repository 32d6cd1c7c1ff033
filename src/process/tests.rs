// reflow: Multi-Commit Operation Engine for Git
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use super::builder::{ProcessBuilder, ProcessFlags};
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn test_process_echo() {
    let output = ProcessBuilder::new("echo")
        .arg("hello")
        .run()
        .await
        .expect("echo should succeed");

    assert!(output.success());
    insta::assert_snapshot!(output.stdout().trim(), @"hello");
}

#[tokio::test]
async fn test_process_exit_code() {
    let output = ProcessBuilder::new("sh")
        .args(["-c", "exit 42"])
        .flag(ProcessFlags::ALLOW_FAILURE)
        .run()
        .await
        .expect("process should complete");

    assert_eq!(output.exit_code(), 42);
    assert!(!output.success());
}

#[tokio::test]
async fn test_process_nonzero_without_allow_failure_errors() {
    let result = ProcessBuilder::new("sh").args(["-c", "exit 3"]).run().await;
    assert!(result.is_err(), "non-zero exit should be an error");
}

#[tokio::test]
async fn test_process_success_codes() {
    // Exit code 1 is in the success set, so no error.
    let output = ProcessBuilder::new("sh")
        .args(["-c", "exit 1"])
        .success_codes([0, 1])
        .run()
        .await
        .expect("exit 1 should be accepted");
    assert_eq!(output.exit_code(), 1);
}

#[tokio::test]
async fn test_process_env() {
    let output = ProcessBuilder::new("sh")
        .args(["-c", "echo $REFLOW_TEST_VAR"])
        .env("REFLOW_TEST_VAR", "test_value")
        .run()
        .await
        .expect("process should succeed");

    insta::assert_snapshot!(output.stdout().trim(), @"test_value");
}

#[tokio::test]
async fn test_pre_cancelled_token_skips_spawn() {
    let token = CancellationToken::new();
    token.cancel();

    let output = ProcessBuilder::new("sleep")
        .arg("30")
        .run_with_cancellation(token)
        .await
        .expect("cancelled run should not error");

    assert!(output.is_interrupted());
    assert_eq!(output.exit_code(), -1);
}

#[tokio::test]
async fn test_cancellation_kills_child() {
    let token = CancellationToken::new();
    let cancel = token.clone();

    tokio::spawn(async move {
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        cancel.cancel();
    });

    let output = ProcessBuilder::new("sleep")
        .arg("30")
        .run_with_cancellation(token)
        .await
        .expect("interrupted run should not error");

    assert!(output.is_interrupted());
}

#[test]
fn test_git_resolution() {
    // git is required for the integration suite, so PATH lookup must work.
    assert!(ProcessBuilder::exists("git"), "git should be in PATH");
    let builder = ProcessBuilder::git().expect("git builder should resolve");
    assert!(builder.program().exists());
}

#[test]
fn test_which_unknown_executable() {
    let result = ProcessBuilder::which("definitely-not-a-real-binary-name");
    assert!(result.is_err());
}
