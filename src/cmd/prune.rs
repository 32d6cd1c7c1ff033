// reflow: Multi-Commit Operation Engine for Git
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! `prune` command: delete merged local branches.

use std::sync::Arc;

use tracing::info;

use crate::cli::global::GlobalOptions;
use crate::cli::ops::PruneArgs;
use crate::config::Config;
use crate::error::Result;
use crate::prune::{BranchPruner, JsonFileStore};

/// Runs the prune command: one gated pass, or the recurring background
/// schedule with `--watch`.
///
/// # Errors
///
/// Returns an error if the repository cannot be opened or a one-shot
/// pass fails.
pub async fn run_prune_command(
    args: &PruneArgs,
    global: &GlobalOptions,
    config: &Config,
    dry_run: bool,
) -> Result<()> {
    let repo = super::open_repository(global).await?;
    let store = Arc::new(JsonFileStore::new(config.prune.store_path.clone()));

    let pruner = BranchPruner::new(repo, config.prune.clone(), store)
        .with_dry_run(dry_run)
        .on_complete(Box::new(|repo, pruned| {
            info!(
                repo = %repo.path().display(),
                count = pruned.len(),
                "prune pass finished"
            );
        }));

    if args.watch {
        let mut pruner = pruner;
        pruner.start();
        println!("pruning on a 4h interval; press ctrl-c to stop");
        tokio::signal::ctrl_c().await?;
        pruner.stop();
        return Ok(());
    }

    let pruned = pruner.prune_now().await?;
    if pruned.is_empty() {
        println!("nothing to prune");
    } else {
        let verb = if dry_run { "would prune" } else { "pruned" };
        println!("{verb} {} branch(es):", pruned.len());
        for branch in &pruned {
            println!("  {branch}");
        }
    }
    Ok(())
}
