// reflow: Multi-Commit Operation Engine for Git
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Commit model and `git log` output parsing.
//!
//! ```text
//! git log --format=<12 NUL-separated fields>
//!        |
//!        v
//! parse_commit_records() --> Vec<Commit>
//! ```
//!
//! Fields are joined with `%x00` and each record is terminated with
//! `%x00` as well, so the whole output is split on NUL and consumed in
//! fixed-size chunks. Git forbids NUL in commit messages, which makes the
//! chunking unambiguous even for multi-line bodies.

use crate::error::ReflowResult;

use super::Repository;

/// Number of NUL-separated fields per log record.
const LOG_FIELDS: usize = 12;

/// Log format producing [`LOG_FIELDS`] fields per record.
const LOG_FORMAT: &str = "%H%x00%P%x00%s%x00%b%x00%an%x00%ae%x00%at%x00%aI%x00%cn%x00%ce%x00%ct%x00%cI%x00";

/// Author or committer identity captured on a commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitIdentity {
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Seconds since the Unix epoch.
    pub timestamp: i64,
    /// UTC offset as recorded on the commit, e.g. `+02:00`.
    pub tz_offset: String,
}

impl CommitIdentity {
    /// Builds an identity from name, email, epoch seconds and the strict
    /// ISO 8601 date git renders for `%aI`/`%cI`.
    fn from_fields(name: &str, email: &str, epoch: &str, iso_date: &str) -> Self {
        Self {
            name: name.to_string(),
            email: email.to_string(),
            timestamp: epoch.parse().unwrap_or(0),
            tz_offset: tz_offset_of(iso_date),
        }
    }
}

/// Extracts the UTC offset suffix of a strict ISO 8601 date.
fn tz_offset_of(iso_date: &str) -> String {
    if iso_date.ends_with('Z') {
        return "+00:00".to_string();
    }
    // 2026-01-02T03:04:05+02:00 → +02:00
    iso_date
        .char_indices()
        .rev()
        .find(|&(i, c)| (c == '+' || c == '-') && i > 7)
        .map_or_else(String::new, |(i, _)| iso_date[i..].to_string())
}

/// A single commit, parsed from log output. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    /// Content hash.
    pub sha: String,
    /// One-line summary (subject).
    pub summary: String,
    /// Full body, without the subject line.
    pub body: String,
    /// Author identity.
    pub author: CommitIdentity,
    /// Committer identity.
    pub committer: CommitIdentity,
    /// Parent hashes, in order.
    pub parent_shas: Vec<String>,
}

impl Commit {
    /// Abbreviated hash for log output.
    #[must_use]
    pub fn short_sha(&self) -> &str {
        &self.sha[..self.sha.len().min(9)]
    }

    /// Whether this commit has more than one parent.
    #[must_use]
    pub fn is_merge(&self) -> bool {
        self.parent_shas.len() > 1
    }
}

/// Parses NUL-separated log records into commits.
///
/// Tolerates the newline git appends after each record terminator by
/// trimming it off the front of the following record's first field.
pub(crate) fn parse_commit_records(stdout: &str) -> Vec<Commit> {
    let tokens: Vec<&str> = stdout.split('\0').collect();
    let records = tokens.len().saturating_sub(1) / LOG_FIELDS;

    let mut commits = Vec::with_capacity(records);
    for record in 0..records {
        let fields = &tokens[record * LOG_FIELDS..(record + 1) * LOG_FIELDS];
        let sha = fields[0].trim_start_matches('\n');
        if sha.is_empty() {
            continue;
        }
        commits.push(Commit {
            sha: sha.to_string(),
            parent_shas: fields[1].split_whitespace().map(String::from).collect(),
            summary: fields[2].to_string(),
            body: fields[3].trim_end().to_string(),
            author: CommitIdentity::from_fields(fields[4], fields[5], fields[6], fields[7]),
            committer: CommitIdentity::from_fields(fields[8], fields[9], fields[10], fields[11]),
        });
    }
    commits
}

/// Looks up a single commit by revision.
///
/// # Errors
///
/// Returns a `GitError::CommitNotFound` if the revision does not resolve,
/// or any other `GitError` on command failure.
pub async fn get_commit(repo: &Repository, revision: &str) -> ReflowResult<Commit> {
    let format = log_format_arg();
    let stdout = super::git(
        repo,
        ["log", "-1", format.as_str(), revision, "--"],
        "get commit",
    )
    .await?;

    parse_commit_records(&stdout).into_iter().next().map_or_else(
        || {
            Err(crate::error::GitError::CommitNotFound {
                sha: revision.to_string(),
            }
            .into())
        },
        Ok,
    )
}

/// Returns the log format argument shared by the range queries.
pub(crate) fn log_format_arg() -> String {
    format!("--format={LOG_FORMAT}")
}
