// reflow: Multi-Commit Operation Engine for Git
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Per-command argument definitions.

use clap::Args;

/// Arguments for the `compare` command.
#[derive(Debug, Clone, Default, Args)]
pub struct CompareArgs {
    /// Branches to compare against the current branch.
    /// With no names, every other branch is a candidate.
    #[arg(value_name = "BRANCH")]
    pub branches: Vec<String>,
}

/// Arguments for the `reorder` command.
#[derive(Debug, Clone, Args)]
pub struct ReorderArgs {
    /// Commits to move, by revision. Their order on the command line is
    /// irrelevant: original history order is preserved.
    #[arg(value_name = "REVISION", required = true)]
    pub commits: Vec<String>,

    /// Destination anchor: the moved commits land immediately before
    /// this commit. Omit to move them to the end of history.
    #[arg(long = "before", value_name = "REVISION")]
    pub before: Option<String>,

    /// Exclusive lower bound of the range to rewrite. Omit to rewrite
    /// from the root of history.
    #[arg(long = "base", value_name = "REVISION")]
    pub base: Option<String>,
}

/// Arguments for the `prune` command.
#[derive(Debug, Clone, Default, Args)]
pub struct PruneArgs {
    /// Keep running, pruning on the background interval, until
    /// interrupted.
    #[arg(long)]
    pub watch: bool,
}

/// Arguments for the `status` command.
#[derive(Debug, Clone, Default, Args)]
pub struct StatusArgs {}
