// reflow: Multi-Commit Operation Engine for Git
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Commit reordering: pick-script synthesis over the current branch.
//!
//! ```text
//! reorder(toMove, beforeCommit, lastRetainedCommitRef)
//!        |
//!        v
//! fetch range --> plan_reorder --> todo temp file --> rebase -i
//!        |                                                |
//!        v                                                v
//!   precondition errors --> Error outcome       Completed | Conflicts
//! ```
//!
//! Planning walks the range oldest→newest once with three buffers:
//!
//! * commits before the anchor that are not moved are emitted directly;
//! * moved commits collect in log order (the caller's ordering of
//!   `to_move` is intentionally ignored: original history order
//!   minimizes conflicts);
//! * the anchor and everything after it that is not moved are held back
//!   and emitted after the moved block, so the picks read
//!   `...unmoved, moved block, anchor, rest...` — the moved commits sit
//!   immediately before the anchor.
//!
//! With no anchor the moved block lands at the end of history instead.

use std::collections::HashSet;

use tracing::{debug, error, info};

use crate::error::{OperationError, ReflowResult};
use crate::git::log::Commit;
use crate::git::rebase::{ProgressCallback, rebase_interactive};
use crate::git::rev_list::{get_commits_in_range, get_full_history, rev_range};
use crate::git::{OperationOutcome, Repository};

use super::{TodoLine, write_todo_script};

/// Reorders `to_move` so it sits immediately before `before_commit`
/// (or at the end of history when `None`).
///
/// `last_retained_commit_ref` is the exclusive lower bound of the range
/// to rewrite; `None` rewrites from the root. Precondition violations
/// (empty `to_move`, anchor missing from the range, empty range) are
/// logged and mapped to the `Error` outcome before any destructive
/// invocation happens; the caller never sees a raw error from this
/// entry point.
pub async fn reorder(
    repo: &Repository,
    to_move: &[Commit],
    before_commit: Option<&Commit>,
    last_retained_commit_ref: Option<&str>,
    progress: Option<ProgressCallback<'_>>,
) -> OperationOutcome {
    match try_reorder(
        repo,
        to_move,
        before_commit,
        last_retained_commit_ref,
        progress,
    )
    .await
    {
        Ok(outcome) => outcome,
        Err(err) => {
            error!(error = %err, "reorder failed");
            OperationOutcome::Error
        }
    }
}

async fn try_reorder(
    repo: &Repository,
    to_move: &[Commit],
    before_commit: Option<&Commit>,
    last_retained_commit_ref: Option<&str>,
    progress: Option<ProgressCallback<'_>>,
) -> ReflowResult<OperationOutcome> {
    if to_move.is_empty() {
        return Err(OperationError::NoCommitsProvided.into());
    }

    let commits = fetch_range(repo, last_retained_commit_ref).await?;
    let plan = plan_reorder(&commits, to_move, before_commit)?;

    // Owns the script; dropped (and deleted) on every exit path below,
    // success, conflict or error.
    let todo = write_todo_script(&plan).map_err(|e| crate::error::ProcessError::OutputError {
        command: "write reorder todo".to_string(),
        message: e.to_string(),
    })?;

    info!(
        moved = to_move.len(),
        picks = plan.len(),
        base = last_retained_commit_ref.unwrap_or("--root"),
        "reordering commits"
    );

    let outcome = rebase_interactive(
        repo,
        todo.path(),
        last_retained_commit_ref,
        None,
        progress,
    )
    .await?;

    debug!(outcome = %outcome, "reorder rebase finished");
    Ok(outcome)
}

/// Fetches the commits of the rewritten range, newest first.
pub(crate) async fn fetch_range(
    repo: &Repository,
    last_retained_commit_ref: Option<&str>,
) -> ReflowResult<Vec<Commit>> {
    let commits = match last_retained_commit_ref {
        Some(base) => {
            let range = rev_range(base, "HEAD");
            get_commits_in_range(repo, &range)
                .await?
                .ok_or(OperationError::EmptyRange {
                    range: range.clone(),
                })?
        }
        None => get_full_history(repo).await?,
    };

    if commits.is_empty() {
        return Err(OperationError::EmptyRange {
            range: last_retained_commit_ref
                .map_or_else(|| "HEAD".to_string(), |base| rev_range(base, "HEAD")),
        }
        .into());
    }
    Ok(commits)
}

/// Plans the pick order for a reorder.
///
/// `commits` is the rewritten range newest first (native log order); the
/// walk below iterates it oldest→newest. Fails without side effects when
/// the anchor is absent from the range: silently proceeding would drop
/// the moved commits from history.
pub(crate) fn plan_reorder(
    commits: &[Commit],
    to_move: &[Commit],
    before_commit: Option<&Commit>,
) -> Result<Vec<TodoLine>, OperationError> {
    if to_move.is_empty() {
        return Err(OperationError::NoCommitsProvided);
    }

    let move_shas: HashSet<&str> = to_move.iter().map(|c| c.sha.as_str()).collect();
    let before_sha = before_commit.map(|c| c.sha.as_str());

    let mut picks = Vec::with_capacity(commits.len());
    let mut moved_block: Vec<TodoLine> = Vec::new();
    let mut after_anchor: Vec<TodoLine> = Vec::new();
    let mut anchor_found = false;

    for commit in commits.iter().rev() {
        if move_shas.contains(commit.sha.as_str()) {
            // Log order, wherever the commit sits relative to the anchor.
            moved_block.push(TodoLine::pick(commit));
        } else if before_sha == Some(commit.sha.as_str()) {
            anchor_found = true;
            after_anchor.push(TodoLine::pick(commit));
        } else if anchor_found {
            // Must replay after the moved block: later toMove commits may
            // still be pending further up in history.
            after_anchor.push(TodoLine::pick(commit));
        } else {
            picks.push(TodoLine::pick(commit));
        }
    }

    if let Some(sha) = before_sha
        && !anchor_found
    {
        return Err(OperationError::AnchorNotFound {
            sha: sha.to_string(),
        });
    }

    picks.append(&mut moved_block);
    picks.append(&mut after_anchor);
    Ok(picks)
}
