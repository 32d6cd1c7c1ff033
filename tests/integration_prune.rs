// reflow: Multi-Commit Operation Engine for Git
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Integration tests for the background branch pruner.

use std::path::Path;
use std::process::Command;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

use reflow::config::PruneConfig;
use reflow::git::Repository;
use reflow::prune::{BranchPruner, JsonFileStore, PruneStore};

fn run_git(args: &[&str], cwd: &Path) {
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
}

fn commit_file(dir: &Path, file: &str, content: &str, message: &str) {
    std::fs::write(dir.join(file), content).expect("failed to write file");
    run_git(&["add", file], dir);
    run_git(&["commit", "--quiet", "-m", message], dir);
}

/// Bare origin plus a clone carrying one merged, upstream-tracking
/// branch.
fn build_fixture(temp: &TempDir) -> Repository {
    let remote = temp.path().join("remote.git");
    std::fs::create_dir_all(&remote).expect("create remote dir");
    run_git(&["init", "--quiet", "--bare", "-b", "main"], &remote);

    let clone = temp.path().join("clone");
    std::fs::create_dir_all(&clone).expect("create clone dir");
    run_git(&["init", "--quiet", "-b", "main"], &clone);
    run_git(&["config", "user.email", "test@test.com"], &clone);
    run_git(&["config", "user.name", "Test"], &clone);
    run_git(
        &["remote", "add", "origin", remote.to_str().expect("utf8")],
        &clone,
    );
    commit_file(&clone, "base.txt", "base", "base");
    run_git(&["push", "--quiet", "-u", "origin", "main"], &clone);
    run_git(&["remote", "set-head", "origin", "main"], &clone);
    run_git(&["branch", "feature/done"], &clone);
    run_git(&["push", "--quiet", "-u", "origin", "feature/done"], &clone);

    Repository::new(&clone)
}

fn branch_exists(repo: &Repository, name: &str) -> bool {
    let refname = format!("refs/heads/{name}");
    Command::new("git")
        .args(["rev-parse", "--verify", "--quiet", refname.as_str()])
        .current_dir(repo.path())
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

#[tokio::test]
async fn test_start_runs_an_immediate_pass() {
    let temp = tempfile::tempdir().expect("temp dir");
    let repo = build_fixture(&temp);
    let store = Arc::new(JsonFileStore::new(temp.path().join("store.json")));

    assert!(branch_exists(&repo, "feature/done"));

    let mut pruner = BranchPruner::new(repo.clone(), PruneConfig::default(), store.clone());
    pruner.start();

    // The first pass runs immediately; poll until it lands.
    let mut deleted = false;
    for _ in 0..100 {
        if !branch_exists(&repo, "feature/done") {
            deleted = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    pruner.stop();

    assert!(deleted, "immediate pass should prune the merged branch");
    assert!(
        store
            .last_prune_date(&repo.id())
            .expect("load")
            .is_some()
    );
}

#[tokio::test]
async fn test_stop_without_start_is_safe() {
    let temp = tempfile::tempdir().expect("temp dir");
    let repo = build_fixture(&temp);
    let store = Arc::new(JsonFileStore::new(temp.path().join("store.json")));

    let mut pruner = BranchPruner::new(repo, PruneConfig::default(), store);
    pruner.stop();
    pruner.stop();
}
