// reflow: Multi-Commit Operation Engine for Git
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Process execution for the version-control subprocess boundary.
//!
//! ```text
//! ProcessBuilder
//!  • git()/new/exists/find
//!  • args/cwd/env/flags/success_codes/name
//!  • run() / run_with_cancellation(token)
//!              |
//!              v
//!       tokio::process::Command
//!       piped stdio, kill_on_drop
//!              |
//!              v
//!        ProcessOutput
//!  { exit_code, stdout, stderr, interrupted }
//!
//! ProcessFlags: ALLOW_FAILURE, IGNORE_OUTPUT_ON_SUCCESS
//! ```
//!
//! Every invocation of the underlying tool is a suspension point: the
//! calling task yields until the subprocess completes. Cancellation via
//! `run_with_cancellation` kills the child; cooperative schedulers that
//! must never interrupt an in-flight invocation (the ahead/behind
//! updater) use plain `run()` and poll their token between invocations.

mod builder;
mod runner;

pub use builder::{ProcessBuilder, ProcessFlags, ProcessOutput};

#[cfg(test)]
mod tests;
