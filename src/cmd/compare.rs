// reflow: Multi-Commit Operation Engine for Git
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! `compare` command: ahead/behind counts for the current branch.

use anyhow::Context;

use crate::cli::global::GlobalOptions;
use crate::cli::ops::CompareArgs;
use crate::config::Config;
use crate::error::Result;
use crate::git::branch::{Branch, BranchType, get_branches, get_current_branch};
use crate::session::RepositorySession;

/// Runs the compare command: schedules one updater batch, waits for it,
/// prints the cached results.
///
/// # Errors
///
/// Returns an error if the repository cannot be opened or the branch
/// queries fail.
pub async fn run_compare_command(
    args: &CompareArgs,
    global: &GlobalOptions,
    config: &Config,
) -> Result<()> {
    let repo = super::open_repository(global).await?;

    let current_name = get_current_branch(&repo)
        .await?
        .context("HEAD is detached; compare needs a current branch")?;

    let branches = get_branches(&repo).await?;
    let current = branches
        .iter()
        .find(|b| b.branch_type == BranchType::Local && b.name == current_name)
        .cloned()
        .with_context(|| format!("current branch {current_name} not found"))?;

    let candidates: Vec<Branch> = branches
        .into_iter()
        .filter(|b| b.name != current_name)
        .filter(|b| config.compare.include_remotes || b.branch_type == BranchType::Local)
        .filter(|b| args.branches.is_empty() || args.branches.iter().any(|n| *n == b.name))
        .collect();

    let mut session = RepositorySession::new(repo);
    session.refresh_tip().await?;
    session.updater_mut().start();
    session.updater().enqueue(&current, &candidates);
    session.updater().flush().await;

    println!("comparing against {current_name}\n");
    println!("{:<40} {:>7} {:>7}", "branch", "ahead", "behind");
    for candidate in &candidates {
        match session.updater().cached(&current.tip.sha, &candidate.tip.sha) {
            Some(counts) => println!(
                "{:<40} {:>7} {:>7}",
                candidate.name, counts.ahead, counts.behind
            ),
            None => println!("{:<40} {:>7} {:>7}", candidate.name, "-", "-"),
        }
    }

    session.shutdown().await;
    Ok(())
}
