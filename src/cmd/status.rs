// reflow: Multi-Commit Operation Engine for Git
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! `status` command: current branch and in-progress operation probe.

use crate::cli::global::GlobalOptions;
use crate::cli::ops::StatusArgs;
use crate::error::Result;
use crate::git::branch::{get_current_branch, get_default_branch};
use crate::git::status::{get_conflicted_paths, get_in_progress_operation};

/// Runs the status command.
///
/// # Errors
///
/// Returns an error if the repository cannot be opened or the probes
/// fail.
pub async fn run_status_command(_args: &StatusArgs, global: &GlobalOptions) -> Result<()> {
    let repo = super::open_repository(global).await?;

    match get_current_branch(&repo).await? {
        Some(branch) => println!("on branch {branch}"),
        None => println!("HEAD is detached"),
    }
    if let Some(default_branch) = get_default_branch(&repo).await? {
        println!("default branch {default_branch}");
    }

    match get_in_progress_operation(&repo).await? {
        Some(operation) => {
            println!("{} in progress", operation.as_str());
            let conflicted = get_conflicted_paths(&repo).await?;
            if conflicted.is_empty() {
                println!("no unresolved conflicts");
            } else {
                println!("unresolved conflicts:");
                for path in conflicted {
                    println!("  {}", path.display());
                }
            }
        }
        None => println!("no operation in progress"),
    }
    Ok(())
}
