// reflow: Multi-Commit Operation Engine for Git
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Error handling module.
//!
//! ```text
//!              ReflowError (~24 bytes)
//!                     |
//!     +---------+-----+-----+---------+
//!     |    |    |     |     |    |    |
//!     v    v    v     v     v    v    v
//!   Bail  Git  Cfg  Proc   Op  Store Io/Other
//!         Box  Box  Box    Box  Box  Box<str>
//!
//! Sub-errors (unboxed internally):
//!   Git       CommandFailed, Recognized(GitErrorCode), BranchNotFound
//!   Config    ReadError, ParseError, MissingKey, InvalidValue
//!   Process   ExecutableNotFound, SpawnFailed, NonZeroExit
//!   Operation NoCommitsProvided, AnchorNotFound, EmptyRange
//!   Store     Load, Save
//!
//! All variants boxed => ReflowError fits in 24 bytes.
//!
//! GitErrorCode: the vocabulary of git failures recognized from
//! stderr (bad revision, local changes, merge conflicts, ...).
//! ```

use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

/// Convenience alias for `anyhow::Result`.
pub type Result<T> = anyhow::Result<T>;

/// Result type using [`ReflowError`].
pub type ReflowResult<T> = std::result::Result<T, ReflowError>;

/// Top-level application error type.
///
/// All sub-errors are boxed to keep this enum at ~24 bytes on the stack.
#[derive(Debug, Error)]
pub enum ReflowError {
    /// Fatal error that should terminate the application.
    #[error("fatal error: {0}")]
    Bailed(Box<str>),

    /// Git operation failed.
    #[error("git error: {0}")]
    Git(#[from] Box<GitError>),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(#[from] Box<ConfigError>),

    /// Process execution error.
    #[error("process error: {0}")]
    Process(#[from] Box<ProcessError>),

    /// Multi-commit operation error.
    #[error("operation error: {0}")]
    Operation(#[from] Box<OperationError>),

    /// Persistence error.
    #[error("store error: {0}")]
    Store(#[from] Box<StoreError>),

    /// I/O error.
    #[error("io error: {0}")]
    Io(Box<std::io::Error>),

    /// Generic error with message.
    #[error("{0}")]
    Other(Box<str>),
}

/// Create a fatal [`ReflowError::Bailed`] that terminates the application.
pub fn bail_out(message: impl Into<String>) -> ReflowError {
    ReflowError::Bailed(message.into().into_boxed_str())
}

// --- From implementations for boxing ---

/// Macro to generate `From` implementations that box the source error.
macro_rules! impl_from_boxed {
    ($($error:ty => $variant:ident),+ $(,)?) => {
        $(
            impl From<$error> for ReflowError {
                fn from(err: $error) -> Self {
                    ReflowError::$variant(Box::new(err))
                }
            }
        )+
    };
}

impl_from_boxed! {
    GitError => Git,
    ConfigError => Config,
    ProcessError => Process,
    OperationError => Operation,
    StoreError => Store,
    std::io::Error => Io,
}

// --- Git Errors ---

/// Git failure conditions recognized from stderr.
///
/// Any non-zero exit whose stderr matches one of these patterns is
/// classified; everything else stays a generic [`GitError::CommandFailed`]
/// with the stderr text attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GitErrorCode {
    /// `fatal: bad revision '...'`
    BadRevision,
    /// Checkout would overwrite local changes.
    LocalChangesOverwritten,
    /// Merge would overwrite local changes.
    MergeWithLocalChanges,
    /// Cherry-picking a merge commit without `-m`.
    MergeCommitNoMainline,
    /// `nothing to commit` while an operation expected staged changes.
    NothingToCommit,
}

impl GitErrorCode {
    /// Pattern table, compiled once. The two overwrite messages share a
    /// prefix and are distinguished by their trailing word.
    fn patterns() -> &'static [(Regex, Self)] {
        static PATTERNS: OnceLock<Vec<(Regex, GitErrorCode)>> = OnceLock::new();
        PATTERNS.get_or_init(|| {
            [
                (r"fatal: bad revision '.*'", Self::BadRevision),
                (
                    r"fatal: ambiguous argument '.*': unknown revision or path",
                    Self::BadRevision,
                ),
                (
                    r"error: Your local changes to the following files would be overwritten by merge:",
                    Self::MergeWithLocalChanges,
                ),
                (
                    r"error: Your local changes to the following files would be overwritten by checkout:",
                    Self::LocalChangesOverwritten,
                ),
                (
                    r"error: commit [0-9a-f]+ is a merge but no -m option was given",
                    Self::MergeCommitNoMainline,
                ),
                (r"nothing to commit", Self::NothingToCommit),
            ]
            .into_iter()
            .map(|(pattern, code)| {
                // Static literals, compilation cannot fail.
                (Regex::new(pattern).expect("invalid builtin pattern"), code)
            })
            .collect()
        })
    }

    /// Classify stderr output, returning the first matching code.
    #[must_use]
    pub fn parse(stderr: &str) -> Option<Self> {
        Self::patterns()
            .iter()
            .find(|(pattern, _)| pattern.is_match(stderr))
            .map(|&(_, code)| code)
    }

    /// Short identifier for log output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BadRevision => "bad-revision",
            Self::LocalChangesOverwritten => "local-changes-overwritten",
            Self::MergeWithLocalChanges => "merge-with-local-changes",
            Self::MergeCommitNoMainline => "merge-commit-no-mainline",
            Self::NothingToCommit => "nothing-to-commit",
        }
    }
}

impl std::fmt::Display for GitErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Git operation errors.
#[derive(Debug, Error)]
pub enum GitError {
    /// Repository not found at the specified path.
    #[error("repository not found: {path}")]
    RepoNotFound { path: String },

    /// Git command exited non-zero without a recognized error code.
    #[error("git command failed: {command} (exit {exit_code}) - {message}")]
    CommandFailed {
        command: String,
        exit_code: i32,
        message: String,
    },

    /// Git command failed with a recognized error condition.
    #[error("git command failed ({code}): {message}")]
    Recognized { code: GitErrorCode, message: String },

    /// Branch not found.
    #[error("branch not found: {branch}")]
    BranchNotFound { branch: String },

    /// Commit lookup returned no result.
    #[error("commit not found: {sha}")]
    CommitNotFound { sha: String },
}

// --- Config Errors ---

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse configuration file.
    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: String, message: String },

    /// Missing required configuration key.
    #[error("missing required config key '{key}' in section '[{section}]'")]
    MissingKey { section: String, key: String },

    /// Invalid configuration value.
    #[error("invalid value for '{key}' in section '[{section}]': {message}")]
    InvalidValue {
        section: String,
        key: String,
        message: String,
    },

    /// Configuration file not found.
    #[error("config file not found: {0}")]
    NotFound(String),
}

// --- Process Errors ---

/// Process execution errors.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// Executable not found in PATH.
    #[error("executable not found: '{name}' (not in PATH)")]
    ExecutableNotFound { name: String },

    /// Failed to spawn process.
    #[error("failed to spawn process '{command}': {source}")]
    SpawnFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// Process exited with non-zero status.
    #[error("process '{command}' exited with code {code}")]
    NonZeroExit { command: String, code: i32 },

    /// Failed to read process output.
    #[error("failed to read output from process '{command}': {message}")]
    OutputError { command: String, message: String },
}

// --- Operation Errors ---

/// Multi-commit operation errors raised during script synthesis.
///
/// These are precondition failures: they are caught at the top of the
/// operation, logged, and mapped to an `Error` outcome before any
/// destructive git invocation happens.
#[derive(Debug, Error)]
pub enum OperationError {
    /// The set of commits to operate on was empty.
    #[error("no commits provided")]
    NoCommitsProvided,

    /// The anchor commit was not found in the traversed range.
    #[error("unable to find commit {sha} in log")]
    AnchorNotFound { sha: String },

    /// The commit range to rewrite resolved to zero commits.
    #[error("no commits in range {range}")]
    EmptyRange { range: String },

    /// A step update was attempted that the operation kind cannot carry.
    #[error("step {step} is not valid for operation {operation}")]
    InvalidStep {
        operation: &'static str,
        step: &'static str,
    },
}

// --- Store Errors ---

/// Persistence errors for the prune-timestamp store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Failed to load the store file.
    #[error("failed to load store '{path}': {message}")]
    Load { path: String, message: String },

    /// Failed to persist the store file.
    #[error("failed to save store '{path}': {message}")]
    Save { path: String, message: String },
}
