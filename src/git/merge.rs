// reflow: Multi-Commit Operation Engine for Git
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Merge primitives with conflict classification.

use tracing::debug;

use crate::error::ReflowResult;

use super::{OperationOutcome, Repository, classify_conflict_outcome};

/// Merges `branch` into the current branch.
///
/// An already-up-to-date merge completes without error.
///
/// # Errors
///
/// Returns a `ProcessError` only if git cannot be spawned.
pub async fn merge(repo: &Repository, branch: &str) -> ReflowResult<OperationOutcome> {
    let out = super::git_raw(
        repo,
        ["merge", "--no-edit", branch],
        "merge branch",
    )
    .await?;

    if out.success() && out.stdout().contains("Already up to date") {
        debug!(branch, "merge target already up to date");
    }
    Ok(classify_conflict_outcome(&out))
}

/// Aborts an in-progress merge, restoring the pre-merge state.
///
/// # Errors
///
/// Returns a `GitError` on command failure.
pub async fn abort_merge(repo: &Repository) -> ReflowResult<()> {
    super::git(repo, ["merge", "--abort"], "abort merge").await?;
    Ok(())
}
