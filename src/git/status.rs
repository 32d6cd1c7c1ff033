// reflow: Multi-Commit Operation Engine for Git
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Conflict and in-progress operation probes.

use std::path::PathBuf;

use crate::error::ReflowResult;

use super::Repository;

/// A multi-commit operation git itself reports as in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InProgressOperation {
    Rebase,
    CherryPick,
    Merge,
}

impl InProgressOperation {
    /// Display name for log and status output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Rebase => "rebase",
            Self::CherryPick => "cherry-pick",
            Self::Merge => "merge",
        }
    }
}

/// Paths currently in the unmerged (conflicted) state.
///
/// # Errors
///
/// Returns a `GitError` on command failure.
pub async fn get_conflicted_paths(repo: &Repository) -> ReflowResult<Vec<PathBuf>> {
    let stdout = super::git(
        repo,
        ["diff", "--name-only", "--diff-filter=U", "-z"],
        "get conflicted paths",
    )
    .await?;

    Ok(stdout
        .split('\0')
        .filter(|p| !p.is_empty())
        .map(PathBuf::from)
        .collect())
}

/// Probes the git directory for an operation awaiting continuation.
///
/// # Errors
///
/// Returns a `GitError` if the git directory cannot be resolved.
pub async fn get_in_progress_operation(
    repo: &Repository,
) -> ReflowResult<Option<InProgressOperation>> {
    let git_dir = super::git(repo, ["rev-parse", "--absolute-git-dir"], "resolve git dir").await?;
    let git_dir = PathBuf::from(git_dir);

    if git_dir.join("rebase-merge").exists() || git_dir.join("rebase-apply").exists() {
        return Ok(Some(InProgressOperation::Rebase));
    }
    if git_dir.join("CHERRY_PICK_HEAD").exists() {
        return Ok(Some(InProgressOperation::CherryPick));
    }
    if git_dir.join("MERGE_HEAD").exists() {
        return Ok(Some(InProgressOperation::Merge));
    }
    Ok(None)
}
