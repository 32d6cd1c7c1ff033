// reflow: Multi-Commit Operation Engine for Git
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Branch model and branch-level queries.
//!
//! ```text
//! get_branches        for-each-ref refs/heads refs/remotes
//! get_current_branch  symbolic-ref --short HEAD
//! get_default_branch  symbolic-ref refs/remotes/origin/HEAD
//! get_merged_branches branch --merged <default>
//! delete_local_branch branch -D
//! has_origin_remote   remote get-url origin
//! ```
//!
//! Branches are immutable snapshots: a fresh list is produced on every
//! repository refresh, entries are never mutated in place.

use crate::error::ReflowResult;

use super::Repository;

/// Local or remote-tracking branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchType {
    Local,
    Remote,
}

/// Tip snapshot carried on a branch: enough to key comparisons and
/// render a summary without a second lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchTip {
    /// Commit hash the ref points at.
    pub sha: String,
    /// One-line summary of the tip commit.
    pub summary: String,
    /// Author name of the tip commit.
    pub author: String,
}

/// An immutable branch snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch {
    /// Short name (`feature/x`, `origin/feature/x`).
    pub name: String,
    /// Upstream short name, if a tracking relationship exists.
    pub upstream: Option<String>,
    /// Tip commit snapshot.
    pub tip: BranchTip,
    /// Local or remote.
    pub branch_type: BranchType,
    /// Canonical ref path (`refs/heads/...`, `refs/remotes/...`).
    pub ref_path: String,
}

impl Branch {
    /// Whether this branch tracks an upstream.
    #[must_use]
    pub const fn has_upstream(&self) -> bool {
        self.upstream.is_some()
    }
}

/// For-each-ref format: six NUL-separated fields per line.
const BRANCH_FORMAT: &str =
    "%(refname)%00%(refname:short)%00%(upstream:short)%00%(objectname)%00%(authorname)%00%(subject)";

/// Lists local and remote-tracking branches, sorted by name.
///
/// # Errors
///
/// Returns a `GitError` on command failure.
pub async fn get_branches(repo: &Repository) -> ReflowResult<Vec<Branch>> {
    let format = format!("--format={BRANCH_FORMAT}");
    let stdout = super::git(
        repo,
        ["for-each-ref", format.as_str(), "refs/heads", "refs/remotes"],
        "get branches",
    )
    .await?;

    let mut branches: Vec<Branch> = stdout.lines().filter_map(parse_branch_line).collect();
    branches.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(branches)
}

/// Parses one for-each-ref line; `HEAD` symrefs and malformed lines are
/// skipped.
pub(crate) fn parse_branch_line(line: &str) -> Option<Branch> {
    let mut parts = line.split('\0');
    let ref_path = parts.next()?.to_string();
    let name = parts.next()?.to_string();
    let upstream = parts.next().filter(|s| !s.is_empty()).map(String::from);
    let sha = parts.next()?.to_string();
    let author = parts.next().unwrap_or_default().to_string();
    let summary = parts.next().unwrap_or_default().to_string();

    if name.is_empty() || sha.is_empty() || name.ends_with("/HEAD") {
        return None;
    }

    let branch_type = if ref_path.starts_with("refs/remotes/") {
        BranchType::Remote
    } else {
        BranchType::Local
    };

    Some(Branch {
        name,
        upstream,
        tip: BranchTip {
            sha,
            summary,
            author,
        },
        branch_type,
        ref_path,
    })
}

/// Current branch short name, or `None` when HEAD is detached.
///
/// # Errors
///
/// Returns a `ProcessError` only if git cannot be spawned.
pub async fn get_current_branch(repo: &Repository) -> ReflowResult<Option<String>> {
    let out = super::git_raw(
        repo,
        ["symbolic-ref", "--short", "-q", "HEAD"],
        "get current branch",
    )
    .await?;
    if out.success() {
        Ok(Some(out.stdout().trim().to_string()))
    } else {
        Ok(None)
    }
}

/// Default branch short name derived from `origin/HEAD`, without the
/// remote prefix. `None` when origin has no recorded HEAD.
///
/// # Errors
///
/// Returns a `ProcessError` only if git cannot be spawned.
pub async fn get_default_branch(repo: &Repository) -> ReflowResult<Option<String>> {
    let out = super::git_raw(
        repo,
        ["symbolic-ref", "-q", "refs/remotes/origin/HEAD"],
        "get default branch",
    )
    .await?;
    if !out.success() {
        return Ok(None);
    }
    Ok(out
        .stdout()
        .trim()
        .strip_prefix("refs/remotes/origin/")
        .map(String::from))
}

/// Whether the repository has an `origin` remote at all.
///
/// # Errors
///
/// Returns a `ProcessError` only if git cannot be spawned.
pub async fn has_origin_remote(repo: &Repository) -> ReflowResult<bool> {
    let out = super::git_raw(
        repo,
        ["remote", "get-url", "origin"],
        "check origin remote",
    )
    .await?;
    Ok(out.success())
}

/// Short names of local branches fully merged into `into_branch`.
///
/// # Errors
///
/// Returns a `GitError` on command failure (the pruner aborts its pass on
/// this, deleting nothing).
pub async fn get_merged_branches(
    repo: &Repository,
    into_branch: &str,
) -> ReflowResult<Vec<String>> {
    let stdout = super::git(
        repo,
        [
            "branch",
            "--format=%(refname:short)",
            "--merged",
            into_branch,
        ],
        "get merged branches",
    )
    .await?;

    Ok(stdout
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect())
}

/// Force-deletes a local branch.
///
/// # Errors
///
/// Returns a `GitError` on command failure.
pub async fn delete_local_branch(repo: &Repository, name: &str) -> ReflowResult<()> {
    super::git(repo, ["branch", "-D", name], "delete branch").await?;
    Ok(())
}
