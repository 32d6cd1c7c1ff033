// reflow: Multi-Commit Operation Engine for Git
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Process builder with configuration options.

use bitflags::bitflags;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::{OnceLock, RwLock};

use crate::error::{ProcessError, ReflowResult};

/// Static cache for executable paths resolved via `which`.
static EXECUTABLE_CACHE: OnceLock<RwLock<BTreeMap<String, PathBuf>>> = OnceLock::new();

/// Get the executable cache, initializing if needed.
fn exe_cache() -> &'static RwLock<BTreeMap<String, PathBuf>> {
    EXECUTABLE_CACHE.get_or_init(|| RwLock::new(BTreeMap::new()))
}

bitflags! {
    /// Flags controlling process execution behavior.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ProcessFlags: u32 {
        /// Don't fail if the process exits with a non-zero status.
        /// Used for invocations where non-zero is an expected outcome,
        /// e.g. a rebase that stops on conflicts.
        const ALLOW_FAILURE = 0x01;
        /// Don't log output if the process succeeds.
        const IGNORE_OUTPUT_ON_SUCCESS = 0x02;
    }
}

/// Output from a completed process.
#[derive(Debug, Clone, Default)]
pub struct ProcessOutput {
    exit_code: i32,
    stdout: String,
    stderr: String,
    interrupted: bool,
}

impl ProcessOutput {
    /// Creates a new `ProcessOutput` (for internal use).
    pub(super) const fn new(
        exit_code: i32,
        stdout: String,
        stderr: String,
        interrupted: bool,
    ) -> Self {
        Self {
            exit_code,
            stdout,
            stderr,
            interrupted,
        }
    }

    /// Returns the process exit code (0 = success).
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        self.exit_code
    }

    /// Returns captured stdout.
    #[must_use]
    pub fn stdout(&self) -> &str {
        &self.stdout
    }

    /// Returns captured stderr.
    #[must_use]
    pub fn stderr(&self) -> &str {
        &self.stderr
    }

    /// Returns whether the process was interrupted by cancellation.
    #[must_use]
    pub const fn is_interrupted(&self) -> bool {
        self.interrupted
    }

    /// Returns whether the process exited with code 0.
    #[must_use]
    pub const fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Builder for configuring and spawning a subprocess.
///
/// # Example
///
/// ```ignore
/// let output = ProcessBuilder::git()?
///     .args(["rev-parse", "--abbrev-ref", "HEAD"])
///     .current_dir(&repo_path)
///     .name("get current branch")
///     .run()
///     .await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProcessBuilder {
    program: PathBuf,
    args: Vec<String>,
    working_dir: Option<PathBuf>,
    env: BTreeMap<String, String>,
    flags: ProcessFlags,
    success_codes: BTreeSet<i32>,
    name_override: Option<String>,
}

impl ProcessBuilder {
    /// Creates a builder for an explicit program path.
    #[must_use]
    pub fn new(program: impl AsRef<Path>) -> Self {
        Self {
            program: program.as_ref().to_path_buf(),
            args: Vec::new(),
            working_dir: None,
            env: BTreeMap::new(),
            flags: ProcessFlags::empty(),
            success_codes: BTreeSet::from([0]),
            name_override: None,
        }
    }

    /// Creates a builder for the `git` executable, resolved through PATH
    /// once and cached.
    ///
    /// The builder always sets `GIT_TERMINAL_PROMPT=0` and
    /// `GCM_INTERACTIVE=never` so no invocation can block on credential
    /// prompts.
    ///
    /// # Errors
    ///
    /// Returns a `ProcessError::ExecutableNotFound` if `git` is not in PATH.
    pub fn git() -> ReflowResult<Self> {
        let program = Self::which("git")?;
        let mut builder = Self::new(program);
        builder
            .env
            .insert("GIT_TERMINAL_PROMPT".to_string(), "0".to_string());
        builder
            .env
            .insert("GCM_INTERACTIVE".to_string(), "never".to_string());
        builder.name_override = Some("git".to_string());
        Ok(builder)
    }

    /// Resolves an executable through PATH, caching the result.
    ///
    /// # Errors
    ///
    /// Returns a `ProcessError::ExecutableNotFound` if the lookup fails.
    pub fn which(name: &str) -> ReflowResult<PathBuf> {
        if let Ok(cache) = exe_cache().read()
            && let Some(path) = cache.get(name)
        {
            return Ok(path.clone());
        }

        let path = which::which(name).map_err(|_| ProcessError::ExecutableNotFound {
            name: name.to_string(),
        })?;

        if let Ok(mut cache) = exe_cache().write() {
            cache.insert(name.to_string(), path.clone());
        }
        Ok(path)
    }

    /// Returns whether an executable exists in PATH.
    #[must_use]
    pub fn exists(name: &str) -> bool {
        Self::which(name).is_ok()
    }

    /// Adds a single argument.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Adds multiple arguments.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Sets the working directory.
    #[must_use]
    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.working_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Sets an environment variable for the child.
    #[must_use]
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Adds process flags.
    #[must_use]
    pub fn flag(mut self, flags: ProcessFlags) -> Self {
        self.flags |= flags;
        self
    }

    /// Sets the full set of exit codes considered successful.
    #[must_use]
    pub fn success_codes<I: IntoIterator<Item = i32>>(mut self, codes: I) -> Self {
        self.success_codes = codes.into_iter().collect();
        self
    }

    /// Sets a display label used in log output instead of the program name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name_override = Some(name.into());
        self
    }

    // --- accessors used by the runner ---

    pub(super) fn program(&self) -> &Path {
        &self.program
    }

    pub(super) fn args_slice(&self) -> &[String] {
        &self.args
    }

    pub(super) fn working_dir(&self) -> Option<&Path> {
        self.working_dir.as_deref()
    }

    pub(super) const fn environment(&self) -> &BTreeMap<String, String> {
        &self.env
    }

    pub(super) const fn process_flags(&self) -> ProcessFlags {
        self.flags
    }

    pub(super) const fn success_code_set(&self) -> &BTreeSet<i32> {
        &self.success_codes
    }

    pub(super) fn name_override(&self) -> Option<&str> {
        self.name_override.as_deref()
    }
}
