// reflow: Multi-Commit Operation Engine for Git
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Revision-range queries: commit lists and ahead/behind counts.
//!
//! ```text
//! rev_range(a, b)                a..b   (reachable from b, not a)
//! rev_symmetric_difference(a,b)  a...b  (either side, not both)
//!
//! get_ahead_behind    rev-list --left-right --count a...b
//! get_commits_in_range / get_full_history
//!                     log --format=<records> [range]
//! ```
//!
//! Lookup failures for a bad revision are reported as an explicit
//! "no result" (`None`), never as an exception: callers like the
//! ahead/behind updater treat a missing pair as skippable.

use tracing::debug;

use crate::error::{GitErrorCode, ReflowResult};

use super::log::{Commit, log_format_arg, parse_commit_records};
use super::{GitOutput, Repository};

/// Asymmetric difference between two commit graphs. Pure value type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AheadBehind {
    /// Commits reachable from `from` but not `to`.
    pub ahead: u32,
    /// Commits reachable from `to` but not `from`.
    pub behind: u32,
}

impl AheadBehind {
    /// The same comparison read from the other end.
    #[must_use]
    pub const fn inverted(self) -> Self {
        Self {
            ahead: self.behind,
            behind: self.ahead,
        }
    }
}

/// Renders the two-dot range: commits reachable from `to`, not `from`.
#[must_use]
pub fn rev_range(from: &str, to: &str) -> String {
    format!("{from}..{to}")
}

/// Renders the three-dot symmetric-difference notation.
#[must_use]
pub fn rev_symmetric_difference(from: &str, to: &str) -> String {
    format!("{from}...{to}")
}

/// Computes ahead/behind counts for `from` relative to `to`.
///
/// Returns `None` when either revision does not resolve (deleted branch,
/// rewritten history) — an absent result, not an error.
///
/// # Errors
///
/// Returns a `ProcessError` only if git cannot be spawned.
pub async fn get_ahead_behind(
    repo: &Repository,
    from: &str,
    to: &str,
) -> ReflowResult<Option<AheadBehind>> {
    let range = rev_symmetric_difference(from, to);
    let out = super::git_raw(
        repo,
        ["rev-list", "--left-right", "--count", range.as_str(), "--"],
        "rev-list count",
    )
    .await?;

    if !out.success() {
        debug!(range = %range, stderr = %out.stderr().trim(), "ahead/behind lookup failed");
        return Ok(None);
    }

    Ok(parse_left_right(out.stdout()))
}

/// Parses `rev-list --left-right --count` output: `"<left>\t<right>"`.
pub(crate) fn parse_left_right(stdout: &str) -> Option<AheadBehind> {
    let mut parts = stdout.split_whitespace();
    let ahead = parts.next()?.parse().ok()?;
    let behind = parts.next()?.parse().ok()?;
    Some(AheadBehind { ahead, behind })
}

/// Fetches the commits reachable from `range`, newest first.
///
/// Returns `None` if the range contains a revision git cannot resolve.
///
/// # Errors
///
/// Returns a `GitError` on failures other than a bad revision.
pub async fn get_commits_in_range(
    repo: &Repository,
    range: &str,
) -> ReflowResult<Option<Vec<Commit>>> {
    let format = log_format_arg();
    let out = super::git_raw(
        repo,
        ["log", format.as_str(), range, "--"],
        "get commits in range",
    )
    .await?;

    commits_or_bad_revision(repo, out, "get commits in range")
}

/// Fetches the full history of HEAD, newest first.
///
/// # Errors
///
/// Returns a `GitError` on command failure.
pub async fn get_full_history(repo: &Repository) -> ReflowResult<Vec<Commit>> {
    let format = log_format_arg();
    let stdout = super::git(repo, ["log", format.as_str(), "--"], "get full history").await?;
    Ok(parse_commit_records(&stdout))
}

/// Shared classification: bad revision → `None`, other failures → error.
fn commits_or_bad_revision(
    repo: &Repository,
    out: GitOutput,
    label: &str,
) -> ReflowResult<Option<Vec<Commit>>> {
    if out.success() {
        return Ok(Some(parse_commit_records(out.stdout())));
    }
    if out.recognized_error() == Some(GitErrorCode::BadRevision) {
        debug!(repo = %repo.path().display(), "range contains unknown revision");
        return Ok(None);
    }
    Err(super::classify_failure(&out, label).into())
}
