// reflow: Multi-Commit Operation Engine for Git
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Git subprocess boundary.
//!
//! ```text
//! git()         capture stdout, classify failures
//! git_raw()     capture everything, caller classifies
//!        |
//!        v
//!  ProcessBuilder::git() --> git executable
//!
//! log.rs        Commit model + %x00 log parsing
//! rev_list.rs   range queries, ahead/behind counts
//! branch.rs     Branch model, for-each-ref, merged/delete
//! rebase.rs     interactive rebase with caller-supplied todo
//! cherry_pick.rs / merge.rs   conflict-classified primitives
//! status.rs     conflicted paths, in-progress operation probes
//! ```
//!
//! Every function here is a suspension point: callers yield until the
//! subprocess completes. Recognized failure conditions (bad revision,
//! local changes, ...) are classified from stderr into
//! [`GitErrorCode`](crate::error::GitErrorCode); any other non-zero exit
//! is a generic failure with the stderr text attached.

pub mod branch;
pub mod cherry_pick;
pub mod log;
pub mod merge;
pub mod rebase;
pub mod rev_list;
pub mod status;


use std::path::{Path, PathBuf};

use crate::error::{GitError, GitErrorCode, ReflowResult};
use crate::process::{ProcessBuilder, ProcessFlags, ProcessOutput};

/// A local repository the engine operates on.
///
/// A plain path wrapper: all repository state lives in git itself and is
/// re-queried on demand. Identity (for persisted keys such as the prune
/// timestamp) is the canonicalized path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    path: PathBuf,
}

impl Repository {
    /// Creates a repository handle for the given working directory.
    #[must_use]
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// The repository working directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stable identity used as a persistence key.
    ///
    /// Canonicalizes when possible so that differently-spelled paths to the
    /// same repository share one identity.
    #[must_use]
    pub fn id(&self) -> String {
        self.path
            .canonicalize()
            .unwrap_or_else(|_| self.path.clone())
            .display()
            .to_string()
    }
}

/// Output of a git invocation that was allowed to fail, with the
/// recognized error condition (if any) pre-classified from stderr.
#[derive(Debug)]
pub struct GitOutput {
    output: ProcessOutput,
    recognized: Option<GitErrorCode>,
}

impl GitOutput {
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        self.output.exit_code()
    }

    #[must_use]
    pub fn stdout(&self) -> &str {
        self.output.stdout()
    }

    #[must_use]
    pub fn stderr(&self) -> &str {
        self.output.stderr()
    }

    #[must_use]
    pub const fn success(&self) -> bool {
        self.output.success()
    }

    /// The recognized error condition parsed from stderr, if any.
    #[must_use]
    pub const fn recognized_error(&self) -> Option<GitErrorCode> {
        self.recognized
    }
}

/// Runs git with the given arguments, returning trimmed stdout.
///
/// Non-zero exits are classified: a recognized stderr pattern yields
/// [`GitError::Recognized`], anything else [`GitError::CommandFailed`].
///
/// # Errors
///
/// Returns a `GitError` on any non-zero exit, or a `ProcessError` if git
/// cannot be spawned.
pub(crate) async fn git<I, S>(repo: &Repository, args: I, label: &str) -> ReflowResult<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let out = git_raw(repo, args, label).await?;
    if out.success() {
        return Ok(out.stdout().trim().to_string());
    }
    Err(classify_failure(&out, label).into())
}

/// Runs git with the given arguments, never treating a non-zero exit as an
/// error. Callers that expect non-zero outcomes (rebase stopping on
/// conflicts, probe queries) classify the [`GitOutput`] themselves.
///
/// # Errors
///
/// Returns a `ProcessError` only if git cannot be spawned at all.
pub(crate) async fn git_raw<I, S>(repo: &Repository, args: I, label: &str) -> ReflowResult<GitOutput>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    git_raw_with_env(repo, args, std::iter::empty::<(String, String)>(), label).await
}

/// Like [`git_raw`], with additional environment variables for the child.
pub(crate) async fn git_raw_with_env<I, S, E, K, V>(
    repo: &Repository,
    args: I,
    env: E,
    label: &str,
) -> ReflowResult<GitOutput>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
    E: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    let mut builder = ProcessBuilder::git()?
        .args(args)
        .current_dir(repo.path())
        .flag(ProcessFlags::ALLOW_FAILURE)
        .name(label);
    for (key, value) in env {
        builder = builder.env(key, value);
    }

    let output = builder.run().await.map_err(|e| {
        crate::error::ProcessError::OutputError {
            command: label.to_string(),
            message: e.to_string(),
        }
    })?;

    let recognized = if output.success() {
        None
    } else {
        GitErrorCode::parse(output.stderr())
    };

    Ok(GitOutput { output, recognized })
}

/// Verifies the path is inside a git work tree.
///
/// # Errors
///
/// Returns a `GitError::RepoNotFound` when it is not.
pub async fn ensure_work_tree(repo: &Repository) -> ReflowResult<()> {
    let out = git_raw(
        repo,
        ["rev-parse", "--is-inside-work-tree"],
        "check work tree",
    )
    .await?;
    if out.success() && out.stdout().trim() == "true" {
        Ok(())
    } else {
        Err(GitError::RepoNotFound {
            path: repo.path().display().to_string(),
        }
        .into())
    }
}

/// Outcome of a conflict-capable multi-commit invocation.
///
/// Conflicts are not errors: they are a first-class outcome the operation
/// state machine treats as a normal transition into the conflict flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationOutcome {
    /// The invocation ran to completion.
    CompletedWithoutError,
    /// The invocation stopped on merge conflicts awaiting resolution.
    ConflictsEncountered,
    /// The invocation failed for any other reason.
    Error,
}

impl OperationOutcome {
    /// Short identifier for log output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CompletedWithoutError => "completed",
            Self::ConflictsEncountered => "conflicts",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for OperationOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifies the output of a rebase/cherry-pick/merge style invocation.
///
/// Exit 0 completes; a stop caused by conflicts is detected from the
/// CONFLICT markers or the "could not apply" trailer git emits when it
/// halts for resolution.
pub(crate) fn classify_conflict_outcome(out: &GitOutput) -> OperationOutcome {
    if out.success() {
        return OperationOutcome::CompletedWithoutError;
    }
    let conflicted = out.stdout().contains("CONFLICT")
        || out.stderr().contains("CONFLICT")
        || out.stderr().contains("could not apply")
        || out.stderr().contains("Resolve all conflicts manually");
    if conflicted {
        OperationOutcome::ConflictsEncountered
    } else {
        OperationOutcome::Error
    }
}

/// Builds the typed error for a failed invocation.
fn classify_failure(out: &GitOutput, label: &str) -> GitError {
    out.recognized_error().map_or_else(
        || GitError::CommandFailed {
            command: label.to_string(),
            exit_code: out.exit_code(),
            message: out.stderr().trim().to_string(),
        },
        |code| GitError::Recognized {
            code,
            message: out.stderr().trim().to_string(),
        },
    )
}
