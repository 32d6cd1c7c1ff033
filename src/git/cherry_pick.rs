// reflow: Multi-Commit Operation Engine for Git
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Cherry-pick primitives with conflict classification.

use tracing::debug;

use crate::error::{GitErrorCode, ReflowResult};

use super::{OperationOutcome, Repository, classify_conflict_outcome};

/// Applies the given commits, oldest first, onto the current branch.
///
/// Picking a merge commit without a mainline is reported by git as a
/// recognized error and surfaces as `Error`, never as a conflict.
///
/// # Errors
///
/// Returns a `ProcessError` only if git cannot be spawned.
pub async fn cherry_pick(repo: &Repository, shas: &[String]) -> ReflowResult<OperationOutcome> {
    if shas.is_empty() {
        debug!("cherry-pick invoked with no commits");
        return Ok(OperationOutcome::Error);
    }

    let mut args = vec!["cherry-pick".to_string()];
    args.extend(shas.iter().cloned());

    let out = super::git_raw(repo, args, "cherry-pick").await?;

    if out.recognized_error() == Some(GitErrorCode::MergeCommitNoMainline) {
        debug!(stderr = %out.stderr().trim(), "cherry-pick rejected merge commit");
        return Ok(OperationOutcome::Error);
    }
    Ok(classify_conflict_outcome(&out))
}

/// Continues a cherry-pick after conflicts were resolved and staged.
///
/// # Errors
///
/// Returns a `ProcessError` only if git cannot be spawned.
pub async fn continue_cherry_pick(repo: &Repository) -> ReflowResult<OperationOutcome> {
    let out = super::git_raw_with_env(
        repo,
        ["cherry-pick", "--continue"],
        [("GIT_EDITOR", ":")],
        "continue cherry-pick",
    )
    .await?;
    Ok(classify_conflict_outcome(&out))
}

/// Aborts an in-progress cherry-pick sequence.
///
/// # Errors
///
/// Returns a `GitError` on command failure.
pub async fn abort_cherry_pick(repo: &Repository) -> ReflowResult<()> {
    super::git(repo, ["cherry-pick", "--abort"], "abort cherry-pick").await?;
    Ok(())
}
