// reflow: Multi-Commit Operation Engine for Git
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Squashing: fold commits into a target commit via the same
//! todo-script mechanism the reorder uses.
//!
//! The plan walks the range oldest→newest; squashed commits are lifted
//! out of their original positions and re-emitted as `squash` lines
//! immediately after the target's `pick`, in log order. The combined
//! commit message is supplied through a temp file substituted for the
//! editor git opens on the fold.

use std::collections::HashSet;
use std::io::Write as _;

use tracing::{debug, error, info};

use crate::error::{OperationError, ReflowResult};
use crate::git::log::Commit;
use crate::git::rebase::{ProgressCallback, rebase_interactive};
use crate::git::{OperationOutcome, Repository};

use super::reorder::fetch_range;
use super::{TodoLine, write_todo_script};

/// Folds `to_squash` into `squash_onto`, committing the result with
/// `commit_message`.
///
/// Precondition violations (empty `to_squash`, target missing from the
/// range, empty range) are logged and mapped to the `Error` outcome
/// before any destructive invocation happens.
pub async fn squash(
    repo: &Repository,
    to_squash: &[Commit],
    squash_onto: &Commit,
    last_retained_commit_ref: Option<&str>,
    commit_message: &str,
    progress: Option<ProgressCallback<'_>>,
) -> OperationOutcome {
    match try_squash(
        repo,
        to_squash,
        squash_onto,
        last_retained_commit_ref,
        commit_message,
        progress,
    )
    .await
    {
        Ok(outcome) => outcome,
        Err(err) => {
            error!(error = %err, "squash failed");
            OperationOutcome::Error
        }
    }
}

async fn try_squash(
    repo: &Repository,
    to_squash: &[Commit],
    squash_onto: &Commit,
    last_retained_commit_ref: Option<&str>,
    commit_message: &str,
    progress: Option<ProgressCallback<'_>>,
) -> ReflowResult<OperationOutcome> {
    if to_squash.is_empty() {
        return Err(OperationError::NoCommitsProvided.into());
    }

    let commits = fetch_range(repo, last_retained_commit_ref).await?;
    let plan = plan_squash(&commits, to_squash, squash_onto)?;

    let todo = write_todo_script(&plan).map_err(|e| crate::error::ProcessError::OutputError {
        command: "write squash todo".to_string(),
        message: e.to_string(),
    })?;

    // Message file substituted wherever git opens an editor for the fold.
    let mut message_file = tempfile::Builder::new()
        .prefix("reflow-squash-msg-")
        .suffix(".txt")
        .tempfile()
        .map_err(box_io)?;
    message_file
        .write_all(commit_message.as_bytes())
        .map_err(box_io)?;
    message_file.flush().map_err(box_io)?;

    info!(
        squashed = to_squash.len(),
        onto = %squash_onto.short_sha(),
        "squashing commits"
    );

    let outcome = rebase_interactive(
        repo,
        todo.path(),
        last_retained_commit_ref,
        Some(message_file.path()),
        progress,
    )
    .await?;

    debug!(outcome = %outcome, "squash rebase finished");
    Ok(outcome)
}

fn box_io(err: std::io::Error) -> crate::error::ReflowError {
    err.into()
}

/// Plans the pick/squash order for a squash.
///
/// Fails without side effects when the target is absent from the range:
/// silently proceeding would drop the squashed commits from history.
pub(crate) fn plan_squash(
    commits: &[Commit],
    to_squash: &[Commit],
    squash_onto: &Commit,
) -> Result<Vec<TodoLine>, OperationError> {
    if to_squash.is_empty() {
        return Err(OperationError::NoCommitsProvided);
    }

    let squash_shas: HashSet<&str> = to_squash.iter().map(|c| c.sha.as_str()).collect();

    // Squash lines follow log order, like the reorder's moved block.
    let folded: Vec<TodoLine> = commits
        .iter()
        .rev()
        .filter(|c| squash_shas.contains(c.sha.as_str()))
        .map(TodoLine::squash)
        .collect();

    let mut picks = Vec::with_capacity(commits.len());
    let mut target_found = false;

    for commit in commits.iter().rev() {
        if commit.sha == squash_onto.sha {
            target_found = true;
            picks.push(TodoLine::pick(commit));
            picks.extend(folded.iter().cloned());
        } else if !squash_shas.contains(commit.sha.as_str()) {
            picks.push(TodoLine::pick(commit));
        }
    }

    if !target_found {
        return Err(OperationError::AnchorNotFound {
            sha: squash_onto.sha.clone(),
        });
    }
    Ok(picks)
}
