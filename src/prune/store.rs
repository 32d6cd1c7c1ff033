// reflow: Multi-Commit Operation Engine for Git
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Persistence for last-prune timestamps.
//!
//! Timestamps are opaque epoch-millisecond integers keyed by repository
//! identity. The file-backed store keeps one JSON object per file:
//! `{ "<repository id>": 1712345678901, ... }`.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{ReflowResult, StoreError};

/// Milliseconds since the Unix epoch, now.
#[must_use]
pub fn now_epoch_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| i64::try_from(d.as_millis()).unwrap_or(i64::MAX))
}

/// Last-prune timestamp persistence, keyed by repository identity.
pub trait PruneStore: Send + Sync {
    /// The recorded timestamp, or `None` if the repository was never
    /// pruned.
    ///
    /// # Errors
    ///
    /// Returns a `StoreError` if the backing store cannot be read.
    fn last_prune_date(&self, repo_id: &str) -> ReflowResult<Option<i64>>;

    /// Records a new timestamp, overwriting any previous one.
    ///
    /// # Errors
    ///
    /// Returns a `StoreError` if the backing store cannot be written.
    fn set_last_prune_date(&self, repo_id: &str, timestamp: i64) -> ReflowResult<()>;
}

/// JSON-file-backed store. Reads on every lookup so that concurrent
/// processes sharing the file observe each other's passes.
pub struct JsonFileStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    /// Creates a store over the given file path; the file is created on
    /// first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    fn load(&self) -> ReflowResult<BTreeMap<String, i64>> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => {
                serde_json::from_str(&content).map_err(|e| {
                    StoreError::Load {
                        path: self.path.display().to_string(),
                        message: e.to_string(),
                    }
                    .into()
                })
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(StoreError::Load {
                path: self.path.display().to_string(),
                message: e.to_string(),
            }
            .into()),
        }
    }

    fn save(&self, entries: &BTreeMap<String, i64>) -> ReflowResult<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::Save {
                path: self.path.display().to_string(),
                message: e.to_string(),
            })?;
        }
        let content = serde_json::to_string_pretty(entries).map_err(|e| StoreError::Save {
            path: self.path.display().to_string(),
            message: e.to_string(),
        })?;
        std::fs::write(&self.path, content).map_err(|e| {
            StoreError::Save {
                path: self.path.display().to_string(),
                message: e.to_string(),
            }
            .into()
        })
    }
}

impl PruneStore for JsonFileStore {
    fn last_prune_date(&self, repo_id: &str) -> ReflowResult<Option<i64>> {
        Ok(self.load()?.get(repo_id).copied())
    }

    fn set_last_prune_date(&self, repo_id: &str, timestamp: i64) -> ReflowResult<()> {
        let _guard = self.write_lock.lock();
        let mut entries = self.load()?;
        entries.insert(repo_id.to_string(), timestamp);
        self.save(&entries)
    }
}
