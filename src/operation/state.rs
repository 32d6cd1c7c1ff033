// reflow: Multi-Commit Operation Engine for Git
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Multi-commit operation state machine.
//!
//! ```text
//! ChooseBranch --> WarnForcePush --> ShowProgress
//!      (rebase, merge)    \--------------^   |
//!                                            v
//!                    ShowConflicts <---> HideConflicts
//!                          |                 |
//!                          v                 v
//!                      ConfirmAbort  (conflict flow only)
//!
//! Terminal: completion, confirmed abort, fatal error --> state cleared
//! ```
//!
//! Exactly one operation state is live per repository at a time; the
//! owning session enforces that and treats updates against a missing
//! state as a logged anomaly, not a crash.

use std::path::PathBuf;

use crate::error::OperationError;
use crate::git::OperationOutcome;
use crate::git::log::Commit;
use crate::git::rev_list::AheadBehind;

/// The kind of multi-commit operation, without payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Rebase,
    CherryPick,
    Squash,
    Merge,
    Reorder,
}

impl OperationKind {
    /// Display name for log output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Rebase => "rebase",
            Self::CherryPick => "cherry-pick",
            Self::Squash => "squash",
            Self::Merge => "merge",
            Self::Reorder => "reorder",
        }
    }

    /// Whether the operation begins by picking a second branch.
    ///
    /// Cherry-pick, squash and reorder start from an already-known
    /// source; rebase and merge must choose their counterpart first.
    #[must_use]
    pub const fn requires_branch_choice(self) -> bool {
        matches!(self, Self::Rebase | Self::Merge)
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind-specific operation detail. One live instance per repository.
#[derive(Debug, Clone)]
pub enum MultiCommitOperation {
    /// Rebase the current branch onto another branch.
    Rebase {
        /// Branch being rebased onto (chosen in the ChooseBranch step).
        target_branch: Option<String>,
        /// Commits that will be replayed.
        commits: Vec<Commit>,
        /// Tip hash before the operation began.
        original_branch_tip: String,
    },
    /// Apply commits from another branch onto the current one.
    CherryPick {
        /// Branch the commits come from.
        source_branch: String,
        /// Commits to apply, oldest first.
        commits: Vec<Commit>,
        /// Tip hash before the operation began.
        original_branch_tip: String,
    },
    /// Fold commits into an earlier commit.
    Squash {
        /// Commits being folded.
        commits: Vec<Commit>,
        /// Tip hash before the operation began.
        original_branch_tip: String,
        /// Exclusive lower bound of the rewritten range; `None` rewrites
        /// from the root.
        last_retained_commit_ref: Option<String>,
    },
    /// Merge another branch into the current one.
    Merge {
        /// Branch being merged in (chosen in the ChooseBranch step).
        source_branch: Option<String>,
        /// Tip hash before the operation began.
        original_branch_tip: String,
    },
    /// Relocate commits within the current branch.
    Reorder {
        /// Commits being moved.
        commits: Vec<Commit>,
        /// Tip hash before the operation began.
        original_branch_tip: String,
        /// Exclusive lower bound of the rewritten range; `None` rewrites
        /// from the root.
        last_retained_commit_ref: Option<String>,
    },
}

impl MultiCommitOperation {
    /// The payload-free kind tag.
    #[must_use]
    pub const fn kind(&self) -> OperationKind {
        match self {
            Self::Rebase { .. } => OperationKind::Rebase,
            Self::CherryPick { .. } => OperationKind::CherryPick,
            Self::Squash { .. } => OperationKind::Squash,
            Self::Merge { .. } => OperationKind::Merge,
            Self::Reorder { .. } => OperationKind::Reorder,
        }
    }

    /// Tip hash recorded when the operation began.
    #[must_use]
    pub fn original_branch_tip(&self) -> &str {
        match self {
            Self::Rebase {
                original_branch_tip,
                ..
            }
            | Self::CherryPick {
                original_branch_tip,
                ..
            }
            | Self::Squash {
                original_branch_tip,
                ..
            }
            | Self::Merge {
                original_branch_tip,
                ..
            }
            | Self::Reorder {
                original_branch_tip,
                ..
            } => original_branch_tip,
        }
    }
}

/// Per-path resolution status inside a conflict snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionStatus {
    Unresolved,
    Resolved,
}

/// One conflicted path and its resolution status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictedFile {
    pub path: PathBuf,
    pub status: ResolutionStatus,
}

/// Snapshot of the working directory's conflicts, carried unchanged
/// through the conflict-flow steps.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConflictState {
    pub files: Vec<ConflictedFile>,
}

impl ConflictState {
    /// Builds a snapshot from conflicted paths, all unresolved.
    #[must_use]
    pub fn from_paths(paths: Vec<PathBuf>) -> Self {
        Self {
            files: paths
                .into_iter()
                .map(|path| ConflictedFile {
                    path,
                    status: ResolutionStatus::Unresolved,
                })
                .collect(),
        }
    }

    /// Marks one path as resolved; unknown paths are ignored.
    pub fn mark_resolved(&mut self, path: &std::path::Path) {
        for file in &mut self.files {
            if file.path == path {
                file.status = ResolutionStatus::Resolved;
            }
        }
    }

    /// Whether every conflicted path has been resolved.
    #[must_use]
    pub fn all_resolved(&self) -> bool {
        self.files
            .iter()
            .all(|f| f.status == ResolutionStatus::Resolved)
    }
}

/// The step a live operation currently presents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Pick the counterpart branch (rebase, merge).
    ChooseBranch,
    /// Warn that completing the operation will require a force push.
    WarnForcePush,
    /// The underlying invocation is running.
    ShowProgress,
    /// Conflicts are presented for resolution.
    ShowConflicts(ConflictState),
    /// The user navigated away to the working directory; presentation
    /// only, repository state is unchanged.
    HideConflicts(ConflictState),
    /// Discarding in-progress conflict resolution needs confirmation.
    ConfirmAbort(ConflictState),
    /// Offer creating a branch before the operation proceeds.
    CreateBranch { branch_name: String },
}

impl Step {
    /// Display name for log output.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::ChooseBranch => "choose-branch",
            Self::WarnForcePush => "warn-force-push",
            Self::ShowProgress => "show-progress",
            Self::ShowConflicts(_) => "show-conflicts",
            Self::HideConflicts(_) => "hide-conflicts",
            Self::ConfirmAbort(_) => "confirm-abort",
            Self::CreateBranch { .. } => "create-branch",
        }
    }

    /// Whether this step belongs to the conflict flow.
    ///
    /// Exactly {ShowConflicts, HideConflicts, ConfirmAbort}: the subset
    /// that decides whether aborting needs confirmation.
    #[must_use]
    pub const fn is_conflict_flow(&self) -> bool {
        matches!(
            self,
            Self::ShowConflicts(_) | Self::HideConflicts(_) | Self::ConfirmAbort(_)
        )
    }

    /// The conflict snapshot carried by conflict-flow steps.
    #[must_use]
    pub const fn conflict_state(&self) -> Option<&ConflictState> {
        match self {
            Self::ShowConflicts(state) | Self::HideConflicts(state) | Self::ConfirmAbort(state) => {
                Some(state)
            }
            _ => None,
        }
    }
}

/// How the state machine resolved an outcome report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationProgress {
    /// Terminal: the operation finished, clear the state.
    Completed,
    /// The operation entered (or stayed in) the conflict flow.
    Conflicted,
    /// Terminal: the operation failed, clear the state and surface the
    /// error.
    Failed,
}

/// What an abort request requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortDecision {
    /// In-progress conflict resolution would be discarded: the state has
    /// moved to ConfirmAbort and the caller must ask.
    NeedsConfirmation,
    /// Nothing to confirm: abort right away.
    AbortImmediately,
}

/// A live multi-commit operation: kind-specific detail plus the current
/// step.
#[derive(Debug, Clone)]
pub struct OperationState {
    operation: MultiCommitOperation,
    step: Step,
}

impl OperationState {
    /// Creates the state at its initial step: ChooseBranch for kinds that
    /// need a counterpart branch, ShowProgress otherwise.
    #[must_use]
    pub fn new(operation: MultiCommitOperation) -> Self {
        let step = if operation.kind().requires_branch_choice() {
            Step::ChooseBranch
        } else {
            Step::ShowProgress
        };
        Self { operation, step }
    }

    #[must_use]
    pub const fn operation(&self) -> &MultiCommitOperation {
        &self.operation
    }

    #[must_use]
    pub const fn kind(&self) -> OperationKind {
        self.operation.kind()
    }

    #[must_use]
    pub const fn step(&self) -> &Step {
        &self.step
    }

    /// Records the chosen counterpart branch and leaves ChooseBranch,
    /// passing through WarnForcePush when required.
    ///
    /// # Errors
    ///
    /// Returns an `OperationError::InvalidStep` when not in ChooseBranch.
    pub fn choose_branch(
        &mut self,
        branch: String,
        force_push_warning: bool,
    ) -> Result<(), OperationError> {
        if self.step != Step::ChooseBranch {
            return Err(self.invalid_step());
        }
        match &mut self.operation {
            MultiCommitOperation::Rebase { target_branch, .. } => {
                *target_branch = Some(branch);
            }
            MultiCommitOperation::Merge { source_branch, .. } => {
                *source_branch = Some(branch);
            }
            _ => return Err(self.invalid_step()),
        }
        self.step = if force_push_warning {
            Step::WarnForcePush
        } else {
            Step::ShowProgress
        };
        Ok(())
    }

    /// Leaves WarnForcePush after the user acknowledged it.
    ///
    /// # Errors
    ///
    /// Returns an `OperationError::InvalidStep` when not in WarnForcePush.
    pub fn acknowledge_force_push(&mut self) -> Result<(), OperationError> {
        if self.step != Step::WarnForcePush {
            return Err(self.invalid_step());
        }
        self.step = Step::ShowProgress;
        Ok(())
    }

    /// Applies the outcome of the underlying invocation.
    ///
    /// Conflicts transition into ShowConflicts carrying the supplied
    /// snapshot; completion and failure are terminal (the owner clears
    /// the state).
    pub fn on_outcome(
        &mut self,
        outcome: OperationOutcome,
        conflicts: ConflictState,
    ) -> OperationProgress {
        match outcome {
            OperationOutcome::CompletedWithoutError => OperationProgress::Completed,
            OperationOutcome::ConflictsEncountered => {
                self.step = Step::ShowConflicts(conflicts);
                OperationProgress::Conflicted
            }
            OperationOutcome::Error => OperationProgress::Failed,
        }
    }

    /// ShowConflicts → HideConflicts, carrying the same snapshot.
    ///
    /// # Errors
    ///
    /// Returns an `OperationError::InvalidStep` when not in ShowConflicts.
    pub fn hide_conflicts(&mut self) -> Result<(), OperationError> {
        match std::mem::replace(&mut self.step, Step::ShowProgress) {
            Step::ShowConflicts(state) => {
                self.step = Step::HideConflicts(state);
                Ok(())
            }
            other => {
                self.step = other;
                Err(self.invalid_step())
            }
        }
    }

    /// HideConflicts → ShowConflicts, carrying the same snapshot.
    ///
    /// # Errors
    ///
    /// Returns an `OperationError::InvalidStep` when not in HideConflicts.
    pub fn show_conflicts(&mut self) -> Result<(), OperationError> {
        match std::mem::replace(&mut self.step, Step::ShowProgress) {
            Step::HideConflicts(state) => {
                self.step = Step::ShowConflicts(state);
                Ok(())
            }
            other => {
                self.step = other;
                Err(self.invalid_step())
            }
        }
    }

    /// Requests an abort.
    ///
    /// From the conflict flow the state moves to ConfirmAbort and the
    /// caller must confirm; from anywhere else the abort proceeds
    /// without confirmation.
    pub fn request_abort(&mut self) -> AbortDecision {
        match std::mem::replace(&mut self.step, Step::ShowProgress) {
            Step::ShowConflicts(state) | Step::HideConflicts(state) => {
                self.step = Step::ConfirmAbort(state);
                AbortDecision::NeedsConfirmation
            }
            Step::ConfirmAbort(state) => {
                // Already waiting on confirmation.
                self.step = Step::ConfirmAbort(state);
                AbortDecision::NeedsConfirmation
            }
            other => {
                self.step = other;
                AbortDecision::AbortImmediately
            }
        }
    }

    /// Backs out of ConfirmAbort, returning to ShowConflicts with the
    /// same snapshot.
    ///
    /// # Errors
    ///
    /// Returns an `OperationError::InvalidStep` when not in ConfirmAbort.
    pub fn cancel_abort(&mut self) -> Result<(), OperationError> {
        match std::mem::replace(&mut self.step, Step::ShowProgress) {
            Step::ConfirmAbort(state) => {
                self.step = Step::ShowConflicts(state);
                Ok(())
            }
            other => {
                self.step = other;
                Err(self.invalid_step())
            }
        }
    }

    fn invalid_step(&self) -> OperationError {
        OperationError::InvalidStep {
            operation: self.kind().as_str(),
            step: self.step.name(),
        }
    }
}

/// Whether rewriting the branch's history will require a force push.
///
/// A branch with a computed upstream comparison is a published branch:
/// rewriting commits the upstream already has cannot be pushed without
/// force. `None` (no upstream, or comparison unavailable) never warns.
#[must_use]
pub const fn requires_force_push_warning(upstream_comparison: Option<AheadBehind>) -> bool {
    upstream_comparison.is_some()
}
