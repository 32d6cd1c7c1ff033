// reflow: Multi-Commit Operation Engine for Git
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Interactive rebase driven by a caller-supplied todo script.
//!
//! ```text
//! rebase_interactive(todo, base)
//!        |
//!        v
//! GIT_SEQUENCE_EDITOR='cat "<todo>" >'
//! git rebase -i <base> | --root
//!        |
//!        +-- exit 0            CompletedWithoutError
//!        +-- CONFLICT markers  ConflictsEncountered
//!        +-- otherwise         Error
//!
//! continue_rebase   rebase --continue (editor suppressed)
//! abort_rebase      rebase --abort
//! ```
//!
//! The sequence-editor trick replaces the todo git generates with the
//! synthesized script: git invokes `$GIT_SEQUENCE_EDITOR <generated>`,
//! and `cat "<ours>" >` overwrites the generated file with ours.

use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;
use tracing::{debug, trace};

use crate::error::ReflowResult;

use super::{OperationOutcome, Repository, classify_conflict_outcome};

/// Progress of an in-flight rebase, parsed from the tool's output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RebaseProgress {
    /// 1-based index of the pick being applied.
    pub current: usize,
    /// Total number of picks in the script.
    pub total: usize,
}

/// Callback invoked for each progress step the tool reports.
pub type ProgressCallback<'a> = &'a (dyn Fn(RebaseProgress) + Send + Sync);

fn progress_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        // Static literal, compilation cannot fail.
        Regex::new(r"Rebasing \((\d+)/(\d+)\)").expect("invalid builtin pattern")
    })
}

/// Emits a progress event for every `Rebasing (n/m)` marker in the output.
fn report_progress(output: &str, progress: Option<ProgressCallback<'_>>) {
    let Some(callback) = progress else { return };
    for captures in progress_pattern().captures_iter(output) {
        let (Ok(current), Ok(total)) = (captures[1].parse(), captures[2].parse()) else {
            continue;
        };
        callback(RebaseProgress { current, total });
    }
}

/// Runs `git rebase -i` replaying the caller-supplied todo script.
///
/// `base_ref` is the exclusive lower bound of the range to rewrite;
/// `None` rewrites from the root of history (`--root`). An optional
/// commit-message file is substituted wherever git would open an editor
/// (squash/reword lines); plain pick scripts never reach it.
///
/// # Errors
///
/// Returns a `ProcessError` only if git cannot be spawned; every other
/// failure is classified into the returned [`OperationOutcome`].
pub async fn rebase_interactive(
    repo: &Repository,
    todo_path: &Path,
    base_ref: Option<&str>,
    commit_message_file: Option<&Path>,
    progress: Option<ProgressCallback<'_>>,
) -> ReflowResult<OperationOutcome> {
    let mut args = vec!["rebase".to_string(), "-i".to_string()];
    match base_ref {
        Some(base) => args.push(base.to_string()),
        None => args.push("--root".to_string()),
    }

    let sequence_editor = format!("cat \"{}\" >", todo_path.display());
    let editor = commit_message_file.map_or_else(
        || ":".to_string(),
        |path| format!("cat \"{}\" >", path.display()),
    );

    debug!(
        base = base_ref.unwrap_or("--root"),
        todo = %todo_path.display(),
        "starting interactive rebase"
    );

    let out = super::git_raw_with_env(
        repo,
        args,
        [
            ("GIT_SEQUENCE_EDITOR".to_string(), sequence_editor),
            ("GIT_EDITOR".to_string(), editor),
        ],
        "interactive rebase",
    )
    .await?;

    report_progress(out.stdout(), progress);
    report_progress(out.stderr(), progress);

    let outcome = classify_conflict_outcome(&out);
    trace!(outcome = %outcome, exit_code = out.exit_code(), "rebase finished");
    Ok(outcome)
}

/// Continues a rebase after conflicts were resolved and staged.
///
/// # Errors
///
/// Returns a `ProcessError` only if git cannot be spawned.
pub async fn continue_rebase(repo: &Repository) -> ReflowResult<OperationOutcome> {
    let out = super::git_raw_with_env(
        repo,
        ["rebase", "--continue"],
        [("GIT_EDITOR", ":")],
        "continue rebase",
    )
    .await?;
    Ok(classify_conflict_outcome(&out))
}

/// Aborts an in-progress rebase, restoring the pre-rebase state.
///
/// # Errors
///
/// Returns a `GitError` on command failure.
pub async fn abort_rebase(repo: &Repository) -> ReflowResult<()> {
    super::git(repo, ["rebase", "--abort"], "abort rebase").await?;
    Ok(())
}
