// reflow: Multi-Commit Operation Engine for Git
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Per-repository session context.
//!
//! ```text
//! RepositorySession
//!   owns  ComparisonCache  (cleared wholesale on tip change)
//!   owns  AheadBehindUpdater
//!   owns  Option<OperationState>  (exactly one live operation)
//! ```
//!
//! Explicit context object instead of module-level maps keyed by
//! repository: lifecycle is tied to this object's construction and
//! teardown. Updating operation state while none is live is a logged,
//! recoverable anomaly — external actors (command-line interference,
//! concurrent resets) can legitimately race the caller's view.

use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

use crate::compare::{AheadBehindUpdater, ComparisonCache};
use crate::error::ReflowResult;
use crate::git::Repository;
use crate::operation::state::{MultiCommitOperation, OperationState};

/// Repository-scoped owner of the comparison cache, the background
/// updater and the live multi-commit operation state.
pub struct RepositorySession {
    repo: Repository,
    cache: Arc<Mutex<ComparisonCache>>,
    updater: AheadBehindUpdater,
    operation: Option<OperationState>,
    observed_tip: Option<String>,
}

impl RepositorySession {
    /// Creates a session for the repository. The updater is constructed
    /// but not started; callers start it when background comparisons are
    /// wanted.
    #[must_use]
    pub fn new(repo: Repository) -> Self {
        let cache = Arc::new(Mutex::new(ComparisonCache::new()));
        let updater = AheadBehindUpdater::new(repo.clone(), Arc::clone(&cache));
        Self {
            repo,
            cache,
            updater,
            operation: None,
            observed_tip: None,
        }
    }

    #[must_use]
    pub const fn repository(&self) -> &Repository {
        &self.repo
    }

    #[must_use]
    pub const fn updater(&self) -> &AheadBehindUpdater {
        &self.updater
    }

    pub const fn updater_mut(&mut self) -> &mut AheadBehindUpdater {
        &mut self.updater
    }

    /// Records the currently observed tip. When it differs from the
    /// previous observation every cached comparison is invalid (entries
    /// are relative to a specific HEAD) and the cache is cleared
    /// wholesale.
    pub fn observe_tip(&mut self, tip: impl Into<String>) {
        let tip = tip.into();
        if self.observed_tip.as_deref() == Some(tip.as_str()) {
            return;
        }
        if self.observed_tip.is_some() {
            debug!(tip = %tip, "repository tip changed, dropping comparison cache");
            if let Ok(mut cache) = self.cache.lock() {
                cache.clear();
            }
        }
        self.observed_tip = Some(tip);
    }

    /// Queries HEAD and applies [`Self::observe_tip`].
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if HEAD cannot be resolved.
    pub async fn refresh_tip(&mut self) -> ReflowResult<()> {
        let tip = crate::git::log::get_commit(&self.repo, "HEAD").await?.sha;
        self.observe_tip(tip);
        Ok(())
    }

    /// Starts a new multi-commit operation, replacing (and logging) any
    /// operation the caller failed to clear first.
    pub fn begin_operation(&mut self, operation: MultiCommitOperation) -> &mut OperationState {
        if let Some(existing) = &self.operation {
            warn!(
                previous = existing.kind().as_str(),
                next = operation.kind().as_str(),
                "starting operation while another is live, replacing it"
            );
        }
        self.operation.insert(OperationState::new(operation))
    }

    /// The live operation state, if any.
    #[must_use]
    pub const fn operation(&self) -> Option<&OperationState> {
        self.operation.as_ref()
    }

    /// Applies `update` to the live operation state.
    ///
    /// A missing state is not a crash: external actors can have cleared
    /// it underneath us. The attempt is logged and ignored.
    pub fn update_operation(&mut self, update: impl FnOnce(&mut OperationState)) {
        match &mut self.operation {
            Some(state) => update(state),
            None => {
                warn!("no multi-commit operation state to update");
            }
        }
    }

    /// Clears the live operation state (completion, abort, or fatal
    /// error), returning it for inspection.
    pub fn end_operation(&mut self) -> Option<OperationState> {
        self.operation.take()
    }

    /// Stops the updater and waits for its worker to drain.
    pub async fn shutdown(&mut self) {
        self.updater.shutdown().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::OperationOutcome;
    use crate::git::rev_list::AheadBehind;
    use crate::operation::state::{ConflictState, OperationProgress, Step};

    fn test_repo() -> Repository {
        Repository::new("/tmp/definitely-not-used")
    }

    fn merge_operation() -> MultiCommitOperation {
        MultiCommitOperation::Merge {
            source_branch: None,
            original_branch_tip: "abc".to_string(),
        }
    }

    #[tokio::test]
    async fn test_observe_tip_clears_cache_on_change() {
        let mut session = RepositorySession::new(test_repo());
        session.observe_tip("tip-1");

        if let Ok(mut cache) = session.cache.lock() {
            cache.set(
                "a",
                "b",
                AheadBehind {
                    ahead: 1,
                    behind: 0,
                },
            );
        }

        // Same tip: cache untouched.
        session.observe_tip("tip-1");
        assert!(session.updater().cached("a", "b").is_some());

        // New tip: wholesale replacement.
        session.observe_tip("tip-2");
        assert!(session.updater().cached("a", "b").is_none());
    }

    #[tokio::test]
    async fn test_one_live_operation_and_null_update_anomaly() {
        let mut session = RepositorySession::new(test_repo());
        assert!(session.operation().is_none());

        // Anomaly path: nothing to update, no panic.
        session.update_operation(|_| panic!("must not be invoked"));

        session.begin_operation(merge_operation());
        assert_eq!(*session.operation().expect("live").step(), Step::ChooseBranch);

        session.update_operation(|state| {
            state
                .choose_branch("main".to_string(), false)
                .expect("choose branch");
            let progress = state.on_outcome(
                OperationOutcome::CompletedWithoutError,
                ConflictState::default(),
            );
            assert_eq!(progress, OperationProgress::Completed);
        });

        let finished = session.end_operation().expect("state returned");
        assert_eq!(finished.kind().as_str(), "merge");
        assert!(session.operation().is_none());
    }
}
