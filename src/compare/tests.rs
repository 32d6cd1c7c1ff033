// reflow: Multi-Commit Operation Engine for Git
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use std::sync::{Arc, Mutex};

use super::cache::ComparisonCache;
use super::updater::AheadBehindUpdater;
use crate::git::Repository;
use crate::git::branch::get_branches;
use crate::git::rev_list::AheadBehind;
use crate::git::tests::{commit_file, init_test_repo};

const AB_2_5: AheadBehind = AheadBehind {
    ahead: 2,
    behind: 5,
};

#[test]
fn test_cache_set_get_directional() {
    let mut cache = ComparisonCache::new();
    cache.set("refA", "refB", AB_2_5);

    // Same orientation returns the stored value.
    assert_eq!(cache.get("refA", "refB"), Some(AB_2_5));
    // Opposite orientation returns the consistent inverse.
    assert_eq!(cache.get("refB", "refA"), Some(AB_2_5.inverted()));

    assert!(cache.has("refA", "refB"));
    assert!(cache.has("refB", "refA"));
}

#[test]
fn test_cache_orientation_independent_storage() {
    // Writing in either orientation produces the same single entry.
    let mut forward = ComparisonCache::new();
    forward.set("a", "b", AB_2_5);

    let mut backward = ComparisonCache::new();
    backward.set("b", "a", AB_2_5.inverted());

    assert_eq!(forward.get("a", "b"), backward.get("a", "b"));
    assert_eq!(forward.get("b", "a"), backward.get("b", "a"));
    assert_eq!(forward.len(), 1);
    assert_eq!(backward.len(), 1);
}

#[test]
fn test_cache_overwrites_instead_of_duplicating() {
    let mut cache = ComparisonCache::new();
    cache.set("a", "b", AB_2_5);
    cache.set(
        "a",
        "b",
        AheadBehind {
            ahead: 9,
            behind: 1,
        },
    );

    assert_eq!(cache.len(), 1);
    assert_eq!(
        cache.get("a", "b"),
        Some(AheadBehind {
            ahead: 9,
            behind: 1
        })
    );
}

#[test]
fn test_cache_miss_is_absent_not_error() {
    let cache = ComparisonCache::new();
    assert_eq!(cache.get("x", "y"), None);
    assert!(!cache.has("x", "y"));
}

#[test]
fn test_cache_clear_empties_all_pairs() {
    let mut cache = ComparisonCache::new();
    cache.set("a", "b", AB_2_5);
    cache.set("a", "c", AB_2_5);
    assert_eq!(cache.len(), 2);

    cache.clear();
    assert!(cache.is_empty());
    assert!(!cache.has("a", "b"));
    assert!(!cache.has("a", "c"));
}

/// Repo fixture: main is 2 ahead of `feature`, 1 behind `topic`.
fn build_comparison_repo() -> (tempfile::TempDir, Repository) {
    let temp = tempfile::tempdir().expect("failed to create temp dir");
    init_test_repo(temp.path());
    commit_file(temp.path(), "base.txt", "base", "base");
    std::process::Command::new("git")
        .args(["branch", "feature"])
        .current_dir(temp.path())
        .output()
        .expect("git branch");
    std::process::Command::new("git")
        .args(["checkout", "--quiet", "-b", "topic"])
        .current_dir(temp.path())
        .output()
        .expect("git checkout");
    commit_file(temp.path(), "t.txt", "t", "topic work");
    std::process::Command::new("git")
        .args(["checkout", "--quiet", "main"])
        .current_dir(temp.path())
        .output()
        .expect("git checkout");
    commit_file(temp.path(), "m1.txt", "m1", "main work 1");
    commit_file(temp.path(), "m2.txt", "m2", "main work 2");
    let repo = Repository::new(temp.path());
    (temp, repo)
}

#[tokio::test]
async fn test_updater_fills_cache_and_signals() {
    let (_temp, repo) = build_comparison_repo();
    let branches = get_branches(&repo).await.expect("branches should list");
    let current = branches
        .iter()
        .find(|b| b.name == "main")
        .expect("main exists")
        .clone();

    let cache = Arc::new(Mutex::new(ComparisonCache::new()));
    let busy_events: Arc<Mutex<Vec<bool>>> = Arc::new(Mutex::new(Vec::new()));
    let updates: Arc<Mutex<Vec<(String, String)>>> = Arc::new(Mutex::new(Vec::new()));

    let busy_log = Arc::clone(&busy_events);
    let update_log = Arc::clone(&updates);
    let mut updater = AheadBehindUpdater::new(repo.clone(), Arc::clone(&cache))
        .on_busy(Box::new(move |busy| {
            busy_log.lock().expect("busy log").push(busy);
        }))
        .on_cache_update(Box::new(move |from, to, _| {
            update_log
                .lock()
                .expect("update log")
                .push((from.to_string(), to.to_string()));
        }));

    updater.start();
    updater.enqueue(&current, &branches);
    updater.flush().await;

    // Both candidate tips are now cached relative to main's tip.
    for candidate in branches.iter().filter(|b| b.tip.sha != current.tip.sha) {
        let counts = updater
            .cached(&current.tip.sha, &candidate.tip.sha)
            .expect("pair should be cached");
        match candidate.name.as_str() {
            "feature" => assert_eq!(
                counts,
                AheadBehind {
                    ahead: 2,
                    behind: 0
                }
            ),
            "topic" => assert_eq!(
                counts,
                AheadBehind {
                    ahead: 2,
                    behind: 1
                }
            ),
            other => panic!("unexpected branch {other}"),
        }
    }

    // Busy toggled on then off, exactly once for one batch.
    assert_eq!(*busy_events.lock().expect("busy log"), vec![true, false]);
    assert_eq!(updates.lock().expect("update log").len(), 2);

    updater.shutdown().await;
}

#[tokio::test]
async fn test_updater_skips_cached_pairs() {
    let (_temp, repo) = build_comparison_repo();
    let branches = get_branches(&repo).await.expect("branches should list");
    let current = branches
        .iter()
        .find(|b| b.name == "main")
        .expect("main exists")
        .clone();

    let cache = Arc::new(Mutex::new(ComparisonCache::new()));
    let updates: Arc<Mutex<Vec<(String, String)>>> = Arc::new(Mutex::new(Vec::new()));

    let update_log = Arc::clone(&updates);
    let mut updater = AheadBehindUpdater::new(repo.clone(), Arc::clone(&cache))
        .on_cache_update(Box::new(move |from, to, _| {
            update_log
                .lock()
                .expect("update log")
                .push((from.to_string(), to.to_string()));
        }));

    updater.start();
    updater.enqueue(&current, &branches);
    updater.flush().await;
    let first_round = updates.lock().expect("update log").len();
    assert_eq!(first_round, 2);

    // Second enqueue finds every pair cached: no recomputation.
    updater.enqueue(&current, &branches);
    updater.flush().await;
    assert_eq!(updates.lock().expect("update log").len(), first_round);

    updater.shutdown().await;
}

#[tokio::test]
async fn test_updater_supersession_latest_wins() {
    let (_temp, repo) = build_comparison_repo();
    let branches = get_branches(&repo).await.expect("branches should list");
    let current = branches
        .iter()
        .find(|b| b.name == "main")
        .expect("main exists")
        .clone();

    let cache = Arc::new(Mutex::new(ComparisonCache::new()));
    let mut updater = AheadBehindUpdater::new(repo.clone(), Arc::clone(&cache));
    updater.start();

    // The first batch is superseded before the worker necessarily gets to
    // it; the second must complete in full.
    updater.enqueue(&current, &branches);
    updater.enqueue(&current, &branches);
    updater.flush().await;

    for candidate in branches.iter().filter(|b| b.tip.sha != current.tip.sha) {
        assert!(
            updater
                .cached(&current.tip.sha, &candidate.tip.sha)
                .is_some(),
            "pair from the winning batch should be cached"
        );
    }

    updater.shutdown().await;
}

#[tokio::test]
async fn test_updater_single_pair_failure_is_non_fatal() {
    let (_temp, repo) = build_comparison_repo();
    let branches = get_branches(&repo).await.expect("branches should list");
    let current = branches
        .iter()
        .find(|b| b.name == "main")
        .expect("main exists")
        .clone();

    // Inject a candidate whose tip no longer resolves.
    let mut doomed = current.clone();
    doomed.name = "ghost".to_string();
    doomed.tip.sha = "0000000000000000000000000000000000000000".to_string();
    let mut candidates = vec![doomed];
    candidates.extend(branches.iter().cloned());

    let cache = Arc::new(Mutex::new(ComparisonCache::new()));
    let mut updater = AheadBehindUpdater::new(repo.clone(), Arc::clone(&cache));
    updater.start();
    updater.enqueue(&current, &candidates);
    updater.flush().await;

    // The unresolvable pair is simply absent; the rest were computed.
    assert!(
        updater
            .cached(
                &current.tip.sha,
                "0000000000000000000000000000000000000000"
            )
            .is_none()
    );
    let computed = branches
        .iter()
        .filter(|b| b.tip.sha != current.tip.sha)
        .filter(|b| updater.cached(&current.tip.sha, &b.tip.sha).is_some())
        .count();
    assert_eq!(computed, 2);

    updater.shutdown().await;
}
