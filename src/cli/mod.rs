// reflow: Multi-Commit Operation Engine for Git
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! CLI module for reflow using clap derive.
//!
//! # Command Structure
//!
//! ```text
//! reflow [global options] <command>
//! compare [branches...]
//! reorder <commits...> [--before REV] [--base REV]
//! prune [--watch]
//! status
//! ```

pub mod global;
pub mod ops;

#[cfg(test)]
mod tests;

use clap::{Parser, Subcommand};

use crate::cli::global::GlobalOptions;
use crate::cli::ops::{CompareArgs, PruneArgs, ReorderArgs, StatusArgs};

/// Multi-commit operation engine for Git.
///
/// Drives reorder, rebase, squash, cherry-pick and merge orchestration
/// over the git CLI, with branch comparison caching and merged-branch
/// pruning.
#[derive(Debug, Parser)]
#[command(
    name = "reflow",
    author,
    version,
    about = "Multi-commit operation engine for Git",
    long_about = "reflow Copyright (C) 2026 Romeo Ahmed\n\
                  This program comes with ABSOLUTELY NO WARRANTY\n\
                  This is free software, and you are welcome to redistribute it\n\
                  under certain conditions; see LICENSE for details.\n\n\
                  Rewrites and compares branch history by driving the git\n\
                  executable: reorder commits, prune merged branches, and keep\n\
                  ahead/behind comparisons fresh. See `reflow <command> --help`\n\
                  for more information about a command.",
    after_help = "CONFIG FILES:\n\n\
                  reflow looks for `reflow.toml` in the current directory.\n\
                  Additional files can be supplied with --config and are loaded\n\
                  after it, each overriding the previous. REFLOW_* environment\n\
                  variables override every file."
)]
pub struct Cli {
    /// Global options shared by all commands
    #[command(flatten)]
    pub global: GlobalOptions,

    /// Command to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Shows the version.
    #[command(visible_alias = "-v")]
    Version,

    /// Computes ahead/behind counts for the current branch.
    Compare(CompareArgs),

    /// Relocates commits within the current branch.
    Reorder(ReorderArgs),

    /// Deletes local branches already merged into the default branch.
    Prune(PruneArgs),

    /// Shows the repository's operation state.
    Status(StatusArgs),
}

/// Parses command-line arguments.
#[must_use]
pub fn parse() -> Cli {
    Cli::parse()
}

/// Parses command-line arguments from an iterator.
pub fn parse_from<I, T>(iter: I) -> Cli
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::parse_from(iter)
}

/// Tries to parse command-line arguments, returning an error on failure.
///
/// # Errors
///
/// Returns a `clap::Error` if the arguments are invalid or if
/// help/version information was requested.
pub fn try_parse() -> Result<Cli, clap::Error> {
    Cli::try_parse()
}
