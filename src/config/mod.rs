// reflow: Multi-Commit Operation Engine for Git
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Configuration management for reflow.
//!
//! # Configuration Hierarchy
//!
//! ```text
//! Priority (low → high)
//! 1. defaults
//! 2. reflow.toml (cwd)
//! 3. --config
//! 4. REFLOW_* env vars
//! 5. CLI overrides
//! ```
//!
//! # Environment Variable Mapping
//!
//! ```text
//! REFLOW_GLOBAL_LOG_LEVEL=4      → global.log_level = 4
//! REFLOW_PRUNE_ENABLED=false     → prune.enabled = false
//! REFLOW_COMPARE_INCLUDE_REMOTES=false → compare.include_remotes = false
//! ```

pub mod loader;
pub mod types;


use serde::{Deserialize, Serialize};

use crate::error::Result;

use loader::ConfigLoader;
pub use types::{CompareConfig, GlobalConfig, PruneConfig};

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Global options.
    pub global: GlobalConfig,
    /// Comparison / ahead-behind options.
    pub compare: CompareConfig,
    /// Branch pruning options.
    pub prune: PruneConfig,
}

impl Config {
    /// Create a new configuration builder.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use reflow::config::Config;
    ///
    /// let config = Config::builder()
    ///     .add_toml_file_optional("reflow.toml")
    ///     .with_env_prefix("REFLOW")
    ///     .build()?;
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    #[must_use]
    pub fn builder() -> ConfigLoader {
        ConfigLoader::new()
    }

    /// Load configuration from a single TOML file (simple API).
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, contains invalid TOML,
    /// or does not match the `Config` structure.
    pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        Self::builder().add_toml_file(path).build()
    }

    /// Load configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the content is not valid TOML or does not match
    /// the `Config` structure.
    pub fn from_str(content: &str) -> Result<Self> {
        Self::builder().add_toml_str(content).build()
    }

    /// Validates cross-field constraints after deserialization.
    ///
    /// # Errors
    ///
    /// Returns an error if a section carries an invalid value combination.
    pub(crate) fn resolve_and_validate(&mut self) -> Result<()> {
        self.prune.validate()?;
        Ok(())
    }
}
