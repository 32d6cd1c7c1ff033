// reflow: Multi-Commit Operation Engine for Git
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Integration tests for the reorder operation.
//!
//! Drives real interactive rebases against temporary repositories and
//! checks the rewritten history.

use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

use reflow::git::log::get_commit;
use reflow::git::rebase::abort_rebase;
use reflow::git::status::{InProgressOperation, get_in_progress_operation};
use reflow::git::{OperationOutcome, Repository};
use reflow::operation::reorder::reorder;

fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("failed to create temp dir")
}

/// Helper to run git commands in a directory.
fn run_git(args: &[&str], cwd: &Path) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(cwd)
        .env("GIT_AUTHOR_NAME", "Test")
        .env("GIT_AUTHOR_EMAIL", "test@test.com")
        .env("GIT_COMMITTER_NAME", "Test")
        .env("GIT_COMMITTER_EMAIL", "test@test.com")
        .output()
        .expect("failed to run git");
    assert!(
        output.status.success(),
        "git {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

fn init_test_repo(dir: &Path) {
    run_git(&["init", "--quiet", "-b", "main"], dir);
    run_git(&["config", "user.email", "test@test.com"], dir);
    run_git(&["config", "user.name", "Test"], dir);
    run_git(&["config", "commit.gpgsign", "false"], dir);
}

/// Commit `content` to `file`, returning the new commit's sha.
fn commit_file(dir: &Path, file: &str, content: &str, message: &str) -> String {
    std::fs::write(dir.join(file), content).expect("failed to write file");
    run_git(&["add", file], dir);
    run_git(&["commit", "--quiet", "-m", message], dir);
    run_git(&["rev-parse", "HEAD"], dir)
}

/// History summaries oldest→newest.
fn history(dir: &Path) -> Vec<String> {
    run_git(&["log", "--reverse", "--format=%s"], dir)
        .lines()
        .map(String::from)
        .collect()
}

/// Builds the worked-example history: I, A, B, C, D, E (each commit
/// touching its own file so replays never conflict). Returns the root
/// sha.
fn build_linear_history(dir: &Path) -> String {
    init_test_repo(dir);
    let root = commit_file(dir, "i.txt", "i", "I");
    for name in ["A", "B", "C", "D", "E"] {
        commit_file(dir, &format!("{name}.txt"), name, name);
    }
    root
}

#[tokio::test]
async fn test_reorder_before_anchor_rewrites_history() {
    let temp = temp_dir();
    let root = build_linear_history(temp.path());
    let repo = Repository::new(temp.path());

    let commit_a = get_commit(&repo, ":/^A").await.expect("commit A");
    let commit_e = get_commit(&repo, ":/^E").await.expect("commit E");
    let commit_c = get_commit(&repo, ":/^C").await.expect("commit C");

    let outcome = reorder(
        &repo,
        &[commit_a, commit_e],
        Some(&commit_c),
        Some(&root),
        None,
    )
    .await;

    assert_eq!(outcome, OperationOutcome::CompletedWithoutError);
    assert_eq!(history(temp.path()), vec!["I", "B", "A", "E", "C", "D"]);
}

#[tokio::test]
async fn test_reorder_to_end_of_range() {
    let temp = temp_dir();
    let root = build_linear_history(temp.path());
    let repo = Repository::new(temp.path());

    let commit_a = get_commit(&repo, ":/^A").await.expect("commit A");

    let outcome = reorder(&repo, &[commit_a], None, Some(&root), None).await;

    assert_eq!(outcome, OperationOutcome::CompletedWithoutError);
    assert_eq!(history(temp.path()), vec!["I", "B", "C", "D", "E", "A"]);
}

#[tokio::test]
async fn test_reorder_empty_to_move_is_error_and_nondestructive() {
    let temp = temp_dir();
    let root = build_linear_history(temp.path());
    let repo = Repository::new(temp.path());
    let tip_before = run_git(&["rev-parse", "HEAD"], temp.path());

    let outcome = reorder(&repo, &[], None, Some(&root), None).await;

    assert_eq!(outcome, OperationOutcome::Error);
    assert_eq!(run_git(&["rev-parse", "HEAD"], temp.path()), tip_before);
    assert_eq!(history(temp.path()), vec!["I", "A", "B", "C", "D", "E"]);
}

#[tokio::test]
async fn test_reorder_missing_anchor_is_error_and_nondestructive() {
    let temp = temp_dir();
    let root = build_linear_history(temp.path());
    let repo = Repository::new(temp.path());
    let tip_before = run_git(&["rev-parse", "HEAD"], temp.path());

    let commit_a = get_commit(&repo, ":/^A").await.expect("commit A");
    // The root commit is outside the root..HEAD range: an anchor that
    // will not be found during the walk.
    let commit_root = get_commit(&repo, &root).await.expect("root commit");

    let outcome = reorder(&repo, &[commit_a], Some(&commit_root), Some(&root), None).await;

    assert_eq!(outcome, OperationOutcome::Error);
    assert_eq!(run_git(&["rev-parse", "HEAD"], temp.path()), tip_before);
}

#[tokio::test]
async fn test_reorder_conflict_then_abort_restores_history() {
    let temp = temp_dir();
    init_test_repo(temp.path());
    let root = commit_file(temp.path(), "file.txt", "base\n", "I");
    commit_file(temp.path(), "file.txt", "from A\n", "A");
    commit_file(temp.path(), "file.txt", "from B\n", "B");
    let repo = Repository::new(temp.path());
    let tip_before = run_git(&["rev-parse", "HEAD"], temp.path());

    // Replaying B before A rewrites overlapping hunks: conflicts.
    let commit_a = get_commit(&repo, ":/^A").await.expect("commit A");
    let outcome = reorder(&repo, &[commit_a], None, Some(&root), None).await;

    assert_eq!(outcome, OperationOutcome::ConflictsEncountered);
    assert_eq!(
        get_in_progress_operation(&repo)
            .await
            .expect("probe should succeed"),
        Some(InProgressOperation::Rebase)
    );

    abort_rebase(&repo).await.expect("abort should succeed");
    assert_eq!(run_git(&["rev-parse", "HEAD"], temp.path()), tip_before);
    assert_eq!(history(temp.path()), vec!["I", "A", "B"]);
}

#[tokio::test]
async fn test_reorder_conflict_resolve_and_continue() {
    let temp = temp_dir();
    init_test_repo(temp.path());
    let root = commit_file(temp.path(), "file.txt", "base\n", "I");
    commit_file(temp.path(), "file.txt", "from A\n", "A");
    commit_file(temp.path(), "file.txt", "from B\n", "B");
    let repo = Repository::new(temp.path());

    let commit_a = get_commit(&repo, ":/^A").await.expect("commit A");
    let outcome = reorder(&repo, &[commit_a], None, Some(&root), None).await;
    assert_eq!(outcome, OperationOutcome::ConflictsEncountered);

    // Resolve and continue. The following pick conflicts again, so loop
    // until the rebase runs dry; each resolution is distinct so no pick
    // ever becomes empty.
    let mut outcome = OperationOutcome::ConflictsEncountered;
    for attempt in 0..3 {
        std::fs::write(temp.path().join("file.txt"), format!("resolved {attempt}\n"))
            .expect("write resolution");
        run_git(&["add", "file.txt"], temp.path());
        outcome = reflow::git::rebase::continue_rebase(&repo)
            .await
            .expect("continue should run");
        if outcome != OperationOutcome::ConflictsEncountered {
            break;
        }
    }

    assert_eq!(outcome, OperationOutcome::CompletedWithoutError);
    assert_eq!(history(temp.path()), vec!["I", "B", "A"]);
    assert!(
        get_in_progress_operation(&repo)
            .await
            .expect("probe should succeed")
            .is_none()
    );
}
