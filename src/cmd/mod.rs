// reflow: Multi-Commit Operation Engine for Git
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Command implementations.
//!
//! ```text
//! CLI args --> cmd::run_* handlers
//!   compare, reorder, prune, status
//! ```

pub mod compare;
pub mod prune;
pub mod reorder;
pub mod status;

use crate::cli::global::GlobalOptions;
use crate::error::Result;
use crate::git::{Repository, ensure_work_tree};

/// Resolves and validates the repository named by the global options.
pub(crate) async fn open_repository(global: &GlobalOptions) -> Result<Repository> {
    let repo = Repository::new(global.repo_path());
    ensure_work_tree(&repo).await?;
    Ok(repo)
}
