// reflow: Multi-Commit Operation Engine for Git
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use std::path::Path;
use std::process::Command;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

use super::store::{JsonFileStore, PruneStore, now_epoch_millis};
use super::BranchPruner;
use crate::config::PruneConfig;
use crate::git::Repository;
use crate::git::branch::get_branches;
use crate::git::tests::{commit_file, init_test_repo};

fn run_git(path: &Path, args: &[&str]) {
    let output = Command::new("git")
        .args(args)
        .current_dir(path)
        .output()
        .expect("failed to run git");
    assert!(
        output.status.success(),
        "git {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

/// Fixture: a bare "origin" plus a clone with
/// - `feature/merged`: pushed upstream, fully merged into main
/// - `feature/open`: pushed upstream, diverged from main
/// - `develop`: pushed upstream, merged, but reserved
fn build_prune_fixture(temp: &TempDir) -> Repository {
    let remote = temp.path().join("remote.git");
    std::fs::create_dir_all(&remote).expect("create remote dir");
    run_git(&remote, &["init", "--quiet", "--bare", "-b", "main"]);

    let clone = temp.path().join("clone");
    std::fs::create_dir_all(&clone).expect("create clone dir");
    init_test_repo(&clone);
    run_git(
        &clone,
        &["remote", "add", "origin", remote.to_str().expect("utf8 path")],
    );

    commit_file(&clone, "base.txt", "base", "base");
    run_git(&clone, &["push", "--quiet", "-u", "origin", "main"]);
    run_git(
        &clone,
        &["remote", "set-head", "origin", "main"],
    );

    // Merged: same commit as main, with upstream.
    run_git(&clone, &["branch", "feature/merged"]);
    run_git(&clone, &["push", "--quiet", "-u", "origin", "feature/merged"]);
    run_git(&clone, &["branch", "develop"]);
    run_git(&clone, &["push", "--quiet", "-u", "origin", "develop"]);

    // Open: diverges from main.
    run_git(&clone, &["checkout", "--quiet", "-b", "feature/open"]);
    commit_file(&clone, "open.txt", "open", "open work");
    run_git(&clone, &["push", "--quiet", "-u", "origin", "feature/open"]);
    run_git(&clone, &["checkout", "--quiet", "main"]);

    Repository::new(&clone)
}

fn store_in(temp: &TempDir) -> Arc<JsonFileStore> {
    Arc::new(JsonFileStore::new(temp.path().join("prune-store.json")))
}

async fn local_branch_names(repo: &Repository) -> Vec<String> {
    get_branches(repo)
        .await
        .expect("branches should list")
        .into_iter()
        .filter(|b| b.branch_type == crate::git::branch::BranchType::Local)
        .map(|b| b.name)
        .collect()
}

#[test]
fn test_json_store_roundtrip() {
    let temp = tempfile::tempdir().expect("temp dir");
    let store = JsonFileStore::new(temp.path().join("nested/dir/store.json"));

    assert_eq!(store.last_prune_date("repo-a").expect("load"), None);

    store.set_last_prune_date("repo-a", 1234).expect("save");
    store.set_last_prune_date("repo-b", 5678).expect("save");
    assert_eq!(store.last_prune_date("repo-a").expect("load"), Some(1234));
    assert_eq!(store.last_prune_date("repo-b").expect("load"), Some(5678));

    store.set_last_prune_date("repo-a", 9999).expect("save");
    assert_eq!(store.last_prune_date("repo-a").expect("load"), Some(9999));
}

#[tokio::test]
async fn test_prune_without_origin_deletes_nothing() {
    let temp = tempfile::tempdir().expect("temp dir");
    init_test_repo(temp.path());
    commit_file(temp.path(), "a.txt", "a", "base");
    run_git(temp.path(), &["branch", "leftover"]);

    let repo = Repository::new(temp.path());
    let before = local_branch_names(&repo).await;

    let store = store_in(&temp);
    let pruner = BranchPruner::new(repo.clone(), PruneConfig::default(), store.clone());
    let pruned = pruner.prune_now().await.expect("pass should succeed");

    assert!(pruned.is_empty());
    assert_eq!(local_branch_names(&repo).await, before);
    assert_eq!(
        store.last_prune_date(&repo.id()).expect("load"),
        None,
        "skipped pass must not record a timestamp"
    );
}

#[tokio::test]
async fn test_prune_deletes_merged_upstream_branches_only() {
    let temp = tempfile::tempdir().expect("temp dir");
    let repo = build_prune_fixture(&temp);
    let store = store_in(&temp);

    let completions: Arc<Mutex<Vec<Vec<String>>>> = Arc::new(Mutex::new(Vec::new()));
    let completion_log = Arc::clone(&completions);

    let pruner = BranchPruner::new(repo.clone(), PruneConfig::default(), store.clone())
        .on_complete(Box::new(move |_repo, pruned| {
            completion_log
                .lock()
                .expect("completion log")
                .push(pruned.to_vec());
        }));

    let pruned = pruner.prune_now().await.expect("pass should succeed");
    assert_eq!(pruned, vec!["feature/merged".to_string()]);

    let remaining = local_branch_names(&repo).await;
    assert!(!remaining.contains(&"feature/merged".to_string()));
    // Reserved, diverged and default branches survive.
    assert!(remaining.contains(&"develop".to_string()));
    assert!(remaining.contains(&"feature/open".to_string()));
    assert!(remaining.contains(&"main".to_string()));

    assert!(
        store
            .last_prune_date(&repo.id())
            .expect("load")
            .is_some(),
        "completed pass records a timestamp"
    );
    assert_eq!(
        *completions.lock().expect("completion log"),
        vec![vec!["feature/merged".to_string()]]
    );
}

#[tokio::test]
async fn test_prune_interval_gate_blocks_recent_pass() {
    let temp = tempfile::tempdir().expect("temp dir");
    let repo = build_prune_fixture(&temp);
    let store = store_in(&temp);

    // Recorded just now: the pass must do nothing and keep the value.
    let recorded = now_epoch_millis();
    store
        .set_last_prune_date(&repo.id(), recorded)
        .expect("save");

    let before = local_branch_names(&repo).await;
    let pruner = BranchPruner::new(repo.clone(), PruneConfig::default(), store.clone());
    let pruned = pruner.prune_now().await.expect("pass should succeed");

    assert!(pruned.is_empty(), "gated pass performs zero deletions");
    assert_eq!(local_branch_names(&repo).await, before);
    assert_eq!(
        store.last_prune_date(&repo.id()).expect("load"),
        Some(recorded),
        "gated pass must not update the timestamp"
    );
}

#[tokio::test]
async fn test_prune_stale_timestamp_allows_pass() {
    let temp = tempfile::tempdir().expect("temp dir");
    let repo = build_prune_fixture(&temp);
    let store = store_in(&temp);

    // Recorded five hours ago: past the 4h interval.
    let stale = now_epoch_millis() - 5 * 60 * 60 * 1000;
    store.set_last_prune_date(&repo.id(), stale).expect("save");

    let pruner = BranchPruner::new(repo.clone(), PruneConfig::default(), store.clone());
    let pruned = pruner.prune_now().await.expect("pass should succeed");

    assert_eq!(pruned, vec!["feature/merged".to_string()]);
    let updated = store
        .last_prune_date(&repo.id())
        .expect("load")
        .expect("timestamp present");
    assert!(updated > stale, "completed pass refreshes the timestamp");
}

#[tokio::test]
async fn test_prune_dry_run_keeps_everything() {
    let temp = tempfile::tempdir().expect("temp dir");
    let repo = build_prune_fixture(&temp);
    let store = store_in(&temp);

    let before = local_branch_names(&repo).await;
    let pruner =
        BranchPruner::new(repo.clone(), PruneConfig::default(), store.clone()).with_dry_run(true);
    let pruned = pruner.prune_now().await.expect("pass should succeed");

    // Reports what it would delete but touches nothing.
    assert_eq!(pruned, vec!["feature/merged".to_string()]);
    assert_eq!(local_branch_names(&repo).await, before);
    assert_eq!(store.last_prune_date(&repo.id()).expect("load"), None);
}

#[tokio::test]
async fn test_prune_disabled_start_is_noop() {
    let temp = tempfile::tempdir().expect("temp dir");
    let repo = build_prune_fixture(&temp);
    let store = store_in(&temp);

    let config = PruneConfig {
        enabled: false,
        ..PruneConfig::default()
    };
    let mut pruner = BranchPruner::new(repo.clone(), config, store.clone());
    pruner.start();
    pruner.stop();

    assert!(local_branch_names(&repo)
        .await
        .contains(&"feature/merged".to_string()));
}

#[tokio::test]
#[should_panic(expected = "branch pruner started twice")]
async fn test_prune_double_start_panics() {
    let temp = tempfile::tempdir().expect("temp dir");
    let repo = build_prune_fixture(&temp);
    let store = store_in(&temp);

    let mut pruner = BranchPruner::new(repo, PruneConfig::default(), store);
    pruner.start();
    pruner.start();
}
