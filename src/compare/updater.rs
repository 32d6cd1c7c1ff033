// reflow: Multi-Commit Operation Engine for Git
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Background ahead/behind computation with latest-wins batches.
//!
//! ```text
//! enqueue(current, candidates)
//!   dedupe tips, drop cached pairs
//!   cancel previous batch token     <-- supersession is immediate
//!   send Batch over flume channel
//!
//! worker task
//!   recv batch
//!   busy(true)
//!   per pair: token check --> rev-list --> cache + cache_update()
//!   busy(false)
//! ```
//!
//! Cancellation is polled only at pair boundaries: a superseded batch
//! skips its remaining pairs but never interrupts the in-flight
//! rev-list invocation. Single-pair failures are logged and skipped; the
//! pair stays absent and is recomputed by a future batch that includes
//! it.

use std::sync::{Arc, Mutex};

use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::git::branch::Branch;
use crate::git::rev_list::{AheadBehind, get_ahead_behind};
use crate::git::Repository;

use super::cache::ComparisonCache;

/// Fired after every successful per-pair computation.
pub type CacheUpdateCallback = Box<dyn Fn(&str, &str, AheadBehind) + Send + Sync>;

/// Fired when the worker starts (true) or finishes/aborts (false) a batch.
pub type BusyCallback = Box<dyn Fn(bool) + Send + Sync>;

#[derive(Default)]
struct Callbacks {
    cache_update: Option<CacheUpdateCallback>,
    busy: Option<BusyCallback>,
}

impl Callbacks {
    fn notify_update(&self, from: &str, to: &str, value: AheadBehind) {
        if let Some(callback) = &self.cache_update {
            callback(from, to, value);
        }
    }

    fn notify_busy(&self, busy: bool) {
        if let Some(callback) = &self.busy {
            callback(busy);
        }
    }
}

/// One unit of scheduled work: the current tip against candidate tips.
struct Batch {
    from: String,
    to: Vec<String>,
    token: CancellationToken,
}

/// Worker mailbox entries.
enum Message {
    Batch(Batch),
    /// Resolves once every message queued before it has been processed.
    Flush(tokio::sync::oneshot::Sender<()>),
}

/// Cooperative background updater for the comparison cache.
///
/// Owned by a repository session; the spawned worker task is the single
/// scheduling context that mutates the cache.
pub struct AheadBehindUpdater {
    repo: Repository,
    cache: Arc<Mutex<ComparisonCache>>,
    callbacks: Arc<Callbacks>,
    sender: Option<flume::Sender<Message>>,
    worker: Option<tokio::task::JoinHandle<()>>,
    current_token: Mutex<Option<CancellationToken>>,
}

impl AheadBehindUpdater {
    /// Creates an updater over the given repository and cache.
    #[must_use]
    pub fn new(repo: Repository, cache: Arc<Mutex<ComparisonCache>>) -> Self {
        Self {
            repo,
            cache,
            callbacks: Arc::new(Callbacks::default()),
            sender: None,
            worker: None,
            current_token: Mutex::new(None),
        }
    }

    /// Registers the cache-update callback. Must be called before
    /// `start()`.
    #[must_use]
    pub fn on_cache_update(mut self, callback: CacheUpdateCallback) -> Self {
        if let Some(callbacks) = Arc::get_mut(&mut self.callbacks) {
            callbacks.cache_update = Some(callback);
        } else {
            warn!("callback registered after start is ignored");
        }
        self
    }

    /// Registers the busy-state callback. Must be called before
    /// `start()`.
    #[must_use]
    pub fn on_busy(mut self, callback: BusyCallback) -> Self {
        if let Some(callbacks) = Arc::get_mut(&mut self.callbacks) {
            callbacks.busy = Some(callback);
        } else {
            warn!("callback registered after start is ignored");
        }
        self
    }

    /// Spawns the worker task. Idempotent: a second call is a logged
    /// no-op.
    pub fn start(&mut self) {
        if self.worker.is_some() {
            warn!("ahead/behind updater already started");
            return;
        }
        let (sender, receiver) = flume::unbounded::<Message>();
        let repo = self.repo.clone();
        let cache = Arc::clone(&self.cache);
        let callbacks = Arc::clone(&self.callbacks);
        self.sender = Some(sender);
        self.worker = Some(tokio::spawn(async move {
            worker_loop(&receiver, &repo, &cache, &callbacks).await;
        }));
    }

    /// Schedules a new batch comparing `current` against `candidates`.
    ///
    /// Any running batch is superseded immediately: its token is
    /// cancelled so it stops at the next pair boundary. Pairs already in
    /// the cache are filtered out up front; duplicates collapse in
    /// insertion order.
    pub fn enqueue(&self, current: &Branch, candidates: &[Branch]) {
        let Some(sender) = &self.sender else {
            warn!("enqueue on an updater that is not running");
            return;
        };

        let from = current.tip.sha.clone();
        let mut seen = std::collections::HashSet::new();
        let mut to = Vec::new();
        for candidate in candidates {
            let sha = &candidate.tip.sha;
            if *sha == from || !seen.insert(sha.clone()) {
                continue;
            }
            let cached = self
                .cache
                .lock()
                .map(|cache| cache.has(&from, sha))
                .unwrap_or(false);
            if !cached {
                to.push(sha.clone());
            }
        }

        let token = CancellationToken::new();
        if let Ok(mut slot) = self.current_token.lock() {
            if let Some(previous) = slot.replace(token.clone()) {
                previous.cancel();
            }
        }

        trace!(pairs = to.len(), "scheduling comparison batch");
        if sender.send(Message::Batch(Batch { from, to, token })).is_err() {
            warn!("comparison worker is gone, batch dropped");
        }
    }

    /// Waits until every batch queued so far has been processed (or
    /// skipped due to supersession). Does not cancel anything.
    pub async fn flush(&self) {
        let Some(sender) = &self.sender else { return };
        let (done, wait) = tokio::sync::oneshot::channel();
        if sender.send(Message::Flush(done)).is_ok() {
            let _ = wait.await;
        }
    }

    /// Stops scheduling: cancels the live batch and closes the channel.
    ///
    /// The worker drains already-queued (cancelled) batches and exits; an
    /// in-flight rev-list invocation is allowed to finish. Safe to call
    /// when not started.
    pub fn stop(&mut self) {
        if let Ok(mut slot) = self.current_token.lock()
            && let Some(token) = slot.take()
        {
            token.cancel();
        }
        self.sender = None;
    }

    /// Stops and waits for the worker task to finish. Used on session
    /// teardown and in tests that need a drained queue.
    pub async fn shutdown(&mut self) {
        self.stop();
        if let Some(worker) = self.worker.take() {
            let _ = worker.await;
        }
    }

    /// Read access to the owned cache.
    #[must_use]
    pub fn cached(&self, from: &str, to: &str) -> Option<AheadBehind> {
        self.cache.lock().ok().and_then(|cache| cache.get(from, to))
    }
}

/// Worker: processes batches sequentially, latest-wins.
async fn worker_loop(
    receiver: &flume::Receiver<Message>,
    repo: &Repository,
    cache: &Arc<Mutex<ComparisonCache>>,
    callbacks: &Callbacks,
) {
    while let Ok(message) = receiver.recv_async().await {
        let batch = match message {
            Message::Batch(batch) => batch,
            Message::Flush(done) => {
                let _ = done.send(());
                continue;
            }
        };
        if batch.token.is_cancelled() || batch.to.is_empty() {
            continue;
        }

        callbacks.notify_busy(true);
        for to in &batch.to {
            if batch.token.is_cancelled() {
                debug!("comparison batch superseded, skipping remaining pairs");
                break;
            }

            let already = cache
                .lock()
                .map(|cache| cache.has(&batch.from, to))
                .unwrap_or(false);
            if already {
                continue;
            }

            match get_ahead_behind(repo, &batch.from, to).await {
                Ok(Some(counts)) => {
                    if let Ok(mut cache) = cache.lock() {
                        cache.set(&batch.from, to, counts);
                    }
                    callbacks.notify_update(&batch.from, to, counts);
                }
                Ok(None) => {
                    debug!(from = %batch.from, to = %to, "comparison unavailable, skipping pair");
                }
                Err(error) => {
                    warn!(from = %batch.from, to = %to, error = %error, "comparison failed, skipping pair");
                }
            }
        }
        callbacks.notify_busy(false);
    }
}
