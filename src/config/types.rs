// reflow: Multi-Commit Operation Engine for Git
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Configuration types for reflow.
//!
//! ```text
//! Config: GlobalConfig, CompareConfig, PruneConfig
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::ConfigError;
use crate::logging::LogLevel;

/// Global options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GlobalConfig {
    /// Console log level (0-5).
    pub log_level: LogLevel,
    /// Optional log file; trace-level output is mirrored there.
    pub log_file: Option<PathBuf>,
    /// Log only what would be done, never mutate the repository.
    pub dry_run: bool,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::INFO,
            log_file: None,
            dry_run: false,
        }
    }
}

/// Comparison / ahead-behind options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompareConfig {
    /// Include remote-tracking branches as comparison candidates.
    pub include_remotes: bool,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            include_remotes: true,
        }
    }
}

/// Branch pruning options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PruneConfig {
    /// Whether background pruning is enabled at all.
    pub enabled: bool,
    /// Path of the JSON file recording last-prune timestamps per repository.
    pub store_path: PathBuf,
    /// Branch names that are never pruned, in addition to the default and
    /// currently checked-out branch.
    pub reserved_branches: Vec<String>,
}

impl Default for PruneConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            store_path: PathBuf::from(".reflow/prune-store.json"),
            reserved_branches: default_reserved_branches(),
        }
    }
}

fn default_reserved_branches() -> Vec<String> {
    ["main", "master", "develop", "development", "trunk", "gh-pages"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl PruneConfig {
    /// Validates the section.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError::InvalidValue` if the store path is empty.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.store_path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                section: "prune".to_string(),
                key: "store_path".to_string(),
                message: "store path must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Returns whether a branch name is on the reserved shortlist.
    #[must_use]
    pub fn is_reserved(&self, name: &str) -> bool {
        self.reserved_branches.iter().any(|b| b == name)
    }
}
