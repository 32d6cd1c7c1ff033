// reflow: Multi-Commit Operation Engine for Git
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Periodic pruning of merged local branches.
//!
//! ```text
//! BranchPruner::start()
//!   disabled?  --> no-op
//!   one pass now, then every BRANCH_PRUNE_INTERVAL
//!
//! prune pass
//!   no origin remote        --> skip
//!   no default branch       --> skip
//!   last prune < interval   --> skip (persisted gate)
//!   merged ∩ local-with-upstream
//!     minus default/current/reserved
//!   delete each --> record timestamp --> completion callback
//! ```
//!
//! A failed merged-branches query aborts the pass: nothing is deleted
//! and the timestamp stays untouched, so the next scheduled pass retries
//! from scratch.

pub mod store;

#[cfg(test)]
mod tests;

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::PruneConfig;
use crate::error::{Result, ReflowResult};
use crate::git::Repository;
use crate::git::branch::{
    BranchType, delete_local_branch, get_branches, get_current_branch, get_default_branch,
    get_merged_branches, has_origin_remote,
};

pub use store::{JsonFileStore, PruneStore, now_epoch_millis};

/// Minimum interval between prune passes.
pub const BRANCH_PRUNE_INTERVAL: Duration = Duration::from_secs(4 * 60 * 60);

/// Fired after a pass that deleted (or, in dry-run, would delete)
/// branches.
pub type PruneCompletionCallback = Box<dyn Fn(&Repository, &[String]) + Send + Sync>;

/// Periodic background pruner for one repository.
pub struct BranchPruner {
    repo: Repository,
    config: PruneConfig,
    store: Arc<dyn PruneStore>,
    dry_run: bool,
    on_complete: Option<Arc<PruneCompletionCallback>>,
    token: Option<CancellationToken>,
    worker: Option<tokio::task::JoinHandle<()>>,
}

impl BranchPruner {
    /// Creates a pruner over the given repository, config and timestamp
    /// store.
    #[must_use]
    pub fn new(repo: Repository, config: PruneConfig, store: Arc<dyn PruneStore>) -> Self {
        Self {
            repo,
            config,
            store,
            dry_run: false,
            on_complete: None,
            token: None,
            worker: None,
        }
    }

    /// Log deletions without performing them or touching the timestamp.
    #[must_use]
    pub const fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Registers the completion callback.
    #[must_use]
    pub fn on_complete(mut self, callback: PruneCompletionCallback) -> Self {
        self.on_complete = Some(Arc::new(callback));
        self
    }

    /// Runs one pass immediately, then schedules recurring passes.
    ///
    /// A no-op when pruning is disabled by configuration.
    ///
    /// # Panics
    ///
    /// Panics when called while already started: a caller contract
    /// violation with no sensible recovery.
    pub fn start(&mut self) {
        if !self.config.enabled {
            debug!("branch pruning disabled by configuration");
            return;
        }
        assert!(
            self.worker.is_none(),
            "branch pruner started twice for {}",
            self.repo.id()
        );

        let token = CancellationToken::new();
        self.token = Some(token.clone());

        let repo = self.repo.clone();
        let config = self.config.clone();
        let store = Arc::clone(&self.store);
        let dry_run = self.dry_run;
        let on_complete = self.on_complete.clone();

        self.worker = Some(tokio::spawn(async move {
            loop {
                if let Err(error) =
                    prune_pass(&repo, &config, store.as_ref(), dry_run, on_complete.as_deref())
                        .await
                {
                    warn!(error = %error, "prune pass failed, will retry on next interval");
                }

                tokio::select! {
                    () = token.cancelled() => break,
                    () = tokio::time::sleep(BRANCH_PRUNE_INTERVAL) => {}
                }
            }
        }));
    }

    /// Cancels the recurring schedule. Safe to call when not started; an
    /// in-flight pass is allowed to finish.
    pub fn stop(&mut self) {
        if let Some(token) = self.token.take() {
            token.cancel();
        }
        self.worker = None;
    }

    /// Runs a single pass right now, honoring the same gates as the
    /// scheduled passes. Used by the one-shot CLI command.
    ///
    /// # Errors
    ///
    /// Returns the pass failure, if any (nothing was deleted then).
    pub async fn prune_now(&self) -> Result<Vec<String>> {
        prune_pass(
            &self.repo,
            &self.config,
            self.store.as_ref(),
            self.dry_run,
            self.on_complete.as_deref(),
        )
        .await
    }
}

/// One prune pass over a repository. Returns the pruned branch names.
async fn prune_pass(
    repo: &Repository,
    config: &PruneConfig,
    store: &dyn PruneStore,
    dry_run: bool,
    on_complete: Option<&PruneCompletionCallback>,
) -> Result<Vec<String>> {
    if !has_origin_remote(repo).await? {
        debug!("no hosted counterpart, skipping prune");
        return Ok(Vec::new());
    }

    let Some(default_branch) = get_default_branch(repo).await? else {
        debug!("no known default branch, skipping prune");
        return Ok(Vec::new());
    };

    let now = now_epoch_millis();
    if let Some(last) = store.last_prune_date(&repo.id())? {
        let elapsed = now.saturating_sub(last);
        if elapsed < i64::try_from(BRANCH_PRUNE_INTERVAL.as_millis()).unwrap_or(i64::MAX) {
            debug!(elapsed_ms = elapsed, "pruned recently, skipping");
            return Ok(Vec::new());
        }
    }

    let candidates = prune_candidates(repo, config, &default_branch).await?;

    let mut pruned = Vec::with_capacity(candidates.len());
    for branch in candidates {
        if dry_run {
            info!(branch = %branch, "would prune merged branch");
            pruned.push(branch);
            continue;
        }
        match delete_local_branch(repo, &branch).await {
            Ok(()) => {
                info!(branch = %branch, "pruned merged branch");
                pruned.push(branch);
            }
            Err(error) => {
                warn!(branch = %branch, error = %error, "failed to delete branch");
            }
        }
    }

    if !dry_run {
        store.set_last_prune_date(&repo.id(), now)?;
    }

    if let Some(callback) = on_complete
        && !pruned.is_empty()
    {
        callback(repo, &pruned);
    }
    Ok(pruned)
}

/// Branches eligible for deletion: merged into the default branch, local
/// with an upstream, and not the default, the checked-out branch, or a
/// reserved name.
async fn prune_candidates(
    repo: &Repository,
    config: &PruneConfig,
    default_branch: &str,
) -> ReflowResult<Vec<String>> {
    // Any failure here aborts the pass before a single deletion.
    let merged = get_merged_branches(repo, default_branch).await?;
    let branches = get_branches(repo).await?;
    let current = get_current_branch(repo).await?;

    let candidates = branches
        .into_iter()
        .filter(|b| b.branch_type == BranchType::Local && b.has_upstream())
        .filter(|b| merged.iter().any(|m| *m == b.name))
        .filter(|b| b.name != default_branch)
        .filter(|b| current.as_deref() != Some(b.name.as_str()))
        .filter(|b| !config.is_reserved(&b.name))
        .map(|b| b.name)
        .collect();
    Ok(candidates)
}
