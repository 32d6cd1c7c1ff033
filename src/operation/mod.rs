// reflow: Multi-Commit Operation Engine for Git
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Multi-commit operations: state machine, reorder, squash.
//!
//! ```text
//! state.rs     operation kind / step sum types, conflict flow,
//!              transition rules
//! reorder.rs   pick-script synthesis + interactive rebase execution
//! squash.rs    pick/squash-script synthesis sharing the same runner
//!
//! Todo script: one action per line, oldest pick first,
//!              "pick <sha> <summary>", UTF-8, newline-terminated.
//! ```
//!
//! The todo script lives in a named temp file exclusively owned by one
//! invocation and deleted on every exit path (drop-based cleanup), per
//! the scoped-resource discipline.

pub mod reorder;
pub mod squash;
pub mod state;


use std::io::Write as _;

use tempfile::NamedTempFile;

use crate::error::Result;
use crate::git::log::Commit;

/// Action carried by one todo-script line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TodoAction {
    Pick,
    Squash,
}

impl TodoAction {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Pick => "pick",
            Self::Squash => "squash",
        }
    }
}

/// One line of a rebase todo script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TodoLine {
    pub(crate) action: TodoAction,
    pub(crate) sha: String,
    pub(crate) summary: String,
}

impl TodoLine {
    pub(crate) fn pick(commit: &Commit) -> Self {
        Self {
            action: TodoAction::Pick,
            sha: commit.sha.clone(),
            summary: commit.summary.clone(),
        }
    }

    pub(crate) fn squash(commit: &Commit) -> Self {
        Self {
            action: TodoAction::Squash,
            sha: commit.sha.clone(),
            summary: commit.summary.clone(),
        }
    }

    fn render(&self) -> String {
        format!("{} {} {}\n", self.action.as_str(), self.sha, self.summary)
    }
}

/// Writes a todo script to a fresh temp file, oldest action first.
///
/// The returned handle owns the file; dropping it deletes the script
/// whatever the rebase outcome was.
pub(crate) fn write_todo_script(lines: &[TodoLine]) -> Result<NamedTempFile> {
    let mut file = tempfile::Builder::new()
        .prefix("reflow-todo-")
        .suffix(".txt")
        .tempfile()?;
    for line in lines {
        file.write_all(line.render().as_bytes())?;
    }
    file.flush()?;
    Ok(file)
}
