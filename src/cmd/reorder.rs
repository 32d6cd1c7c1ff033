// reflow: Multi-Commit Operation Engine for Git
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! `reorder` command: relocate commits within the current branch.

use anyhow::bail;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use crate::cli::global::GlobalOptions;
use crate::cli::ops::ReorderArgs;
use crate::error::Result;
use crate::git::log::{Commit, get_commit};
use crate::git::rebase::RebaseProgress;
use crate::git::status::get_conflicted_paths;
use crate::git::OperationOutcome;
use crate::operation::reorder::reorder;
use crate::operation::state::{ConflictState, MultiCommitOperation, OperationProgress};
use crate::session::RepositorySession;

/// Runs the reorder command end to end, driving the operation state
/// machine through progress, conflicts, or completion.
///
/// # Errors
///
/// Returns an error when the repository cannot be opened, a named
/// revision does not resolve, or the reorder ends in the `Error`
/// outcome.
pub async fn run_reorder_command(
    args: &ReorderArgs,
    global: &GlobalOptions,
    dry_run: bool,
) -> Result<()> {
    let repo = super::open_repository(global).await?;

    let mut to_move = Vec::with_capacity(args.commits.len());
    for revision in &args.commits {
        to_move.push(get_commit(&repo, revision).await?);
    }
    let before_commit: Option<Commit> = match &args.before {
        Some(revision) => Some(get_commit(&repo, revision).await?),
        None => None,
    };
    let original_tip = get_commit(&repo, "HEAD").await?.sha;

    if dry_run {
        info!(
            moved = to_move.len(),
            before = before_commit.as_ref().map_or("end of history", |c| c.short_sha()),
            "dry run, not rewriting"
        );
        return Ok(());
    }

    let mut session = RepositorySession::new(repo.clone());
    session.observe_tip(original_tip.clone());
    session.begin_operation(MultiCommitOperation::Reorder {
        commits: to_move.clone(),
        original_branch_tip: original_tip,
        last_retained_commit_ref: args.base.clone(),
    });

    let bar = ProgressBar::no_length().with_style(
        ProgressStyle::with_template("{spinner} rebasing {pos}/{len}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    let progress_bar = bar.clone();
    let on_progress = move |progress: RebaseProgress| {
        progress_bar.set_length(progress.total as u64);
        progress_bar.set_position(progress.current as u64);
    };

    let outcome = reorder(
        &repo,
        &to_move,
        before_commit.as_ref(),
        args.base.as_deref(),
        Some(&on_progress),
    )
    .await;
    bar.finish_and_clear();

    let conflicts = if outcome == OperationOutcome::ConflictsEncountered {
        ConflictState::from_paths(get_conflicted_paths(&repo).await?)
    } else {
        ConflictState::default()
    };

    let mut progress = OperationProgress::Failed;
    session.update_operation(|state| {
        progress = state.on_outcome(outcome, conflicts.clone());
    });

    match progress {
        OperationProgress::Completed => {
            session.end_operation();
            println!("reordered {} commit(s)", to_move.len());
            Ok(())
        }
        OperationProgress::Conflicted => {
            println!("reorder stopped on conflicts:");
            for file in &conflicts.files {
                println!("  {}", file.path.display());
            }
            println!("\nresolve the conflicts, then run `git rebase --continue`");
            println!("or abandon the reorder with `git rebase --abort`");
            Ok(())
        }
        OperationProgress::Failed => {
            session.end_operation();
            bail!("reorder failed; the repository was left untouched or restored");
        }
    }
}
