//! Main cache store: concurrent key->entry map plus tag->keys reverse index
//!
//! The store owns three guarantees:
//! - Singleflight: at most one concurrent execution of the compute closure
//!   per key; every other caller for that key waits on the shared outcome.
//! - Tag isolation: invalidating a tag removes exactly the entries whose
//!   tag set contains it, detaching each from every other bucket it
//!   belonged to.
//! - Generation fencing: a computation whose key was invalidated while it
//!   was in flight delivers its result to its callers but is never
//!   published into the store.
//!
//! Store and index are mutated under a single lock so they stay consistent
//! as a unit. The lock is never held across the compute closure or any
//! other I/O.

use crate::cache::{
    config::CacheConfig,
    entry::{CacheEntry, ComputeOutcome, EntryState},
    tags::Tag,
    types::{CacheKey, CacheStats, CacheValue},
};
use crate::error::{CacheError, Result};
use std::collections::{HashMap, HashSet, VecDeque};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{watch, RwLock};
use tracing::{debug, error, info};

/// Tag-indexed read-through cache with singleflight and generation fencing
pub struct CacheStore {
    /// Cache configuration
    config: CacheConfig,

    /// Internal storage
    inner: Arc<RwLock<StoreInner>>,
}

/// Internal storage, mutated as a unit under one lock
struct StoreInner {
    /// Main storage: key -> entry
    entries: HashMap<CacheKey, CacheEntry>,

    /// Reverse index: tag -> keys currently registered under it
    tag_index: HashMap<Tag, HashSet<CacheKey>>,

    /// Per-key generation counters; bumped when an in-flight computation
    /// is invalidated so its publish is discarded. Survives entry removal.
    generations: HashMap<CacheKey, u64>,

    /// LRU tracking: maintains access order (used when a capacity bound
    /// is configured)
    lru_queue: VecDeque<CacheKey>,

    /// Store-wide epoch; bumped by `invalidate_all` to fence every
    /// computation in flight at reset time
    epoch: u64,

    /// Current cache statistics
    stats: CacheStats,
}

/// What the initial lookup found for a key
enum Lookup {
    /// Published value
    Ready(CacheValue),

    /// Another caller's computation is in flight; wait on its outcome
    Join(watch::Receiver<Option<ComputeOutcome>>),

    /// A previous computation was cancelled before publishing and left
    /// its entry behind; clear it and start fresh
    Abandoned,

    /// No entry for this key
    Absent,
}

impl CacheStore {
    /// Create a new cache store with the given configuration
    pub fn new(config: CacheConfig) -> Self {
        info!("initializing cache store with config: {:?}", config);

        let inner = StoreInner {
            entries: HashMap::new(),
            tag_index: HashMap::new(),
            generations: HashMap::new(),
            lru_queue: VecDeque::new(),
            epoch: 0,
            stats: CacheStats::default(),
        };

        Self {
            config,
            inner: Arc::new(RwLock::new(inner)),
        }
    }

    /// Read-through entry point.
    ///
    /// Returns the cached value for `key` if one is published. If another
    /// caller already started the same computation, waits for it and
    /// returns the shared outcome. Otherwise runs `compute`, publishes the
    /// value under every tag in `tags`, and returns it.
    ///
    /// A failed computation is delivered to every waiter and never cached.
    /// A computation whose key was invalidated while it ran is returned to
    /// its callers but discarded rather than cached.
    pub async fn get_or_compute<F, Fut>(
        &self,
        key: CacheKey,
        tags: Vec<Tag>,
        compute: F,
    ) -> Result<CacheValue>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<CacheValue>>,
    {
        let tx = {
            let mut inner = self.inner.write().await;

            let lookup = match inner.entries.get(&key) {
                Some(entry) => match &entry.state {
                    EntryState::Ready { value } => Lookup::Ready(value.clone()),
                    EntryState::Computing { outcome } => {
                        if outcome.has_changed().is_err() {
                            Lookup::Abandoned
                        } else {
                            Lookup::Join(outcome.clone())
                        }
                    }
                },
                None => Lookup::Absent,
            };

            match lookup {
                Lookup::Ready(value) => {
                    if let Some(entry) = inner.entries.get_mut(&key) {
                        entry.mark_accessed();
                    }
                    if self.config.enable_metrics {
                        inner.stats.hits += 1;
                    }
                    if self.config.max_entries.is_some() {
                        inner.touch(&key);
                    }
                    debug!(key = %key, "cache hit");
                    return Ok(value);
                }
                Lookup::Join(rx) => {
                    if self.config.enable_metrics {
                        inner.stats.coalesced += 1;
                    }
                    drop(inner);
                    debug!(key = %key, "waiting on in-flight computation");
                    return self.join(&key, rx).await;
                }
                Lookup::Abandoned => {
                    debug!(key = %key, "clearing entry abandoned by a cancelled computation");
                    inner.remove_entry(&key);
                }
                Lookup::Absent => {}
            }

            // Claim the key: create a COMPUTING entry with a generation
            // snapshot and register it under its tags so an invalidation
            // arriving before publish can fence it.
            let generation = inner.generations.get(&key).copied().unwrap_or(0);
            let epoch = inner.epoch;
            let (tx, rx) = watch::channel(None);
            let tag_set: HashSet<Tag> = tags.into_iter().collect();
            for tag in &tag_set {
                inner
                    .tag_index
                    .entry(tag.clone())
                    .or_default()
                    .insert(key.clone());
            }
            inner.entries.insert(
                key.clone(),
                CacheEntry::computing(key.clone(), tag_set, generation, epoch, rx),
            );
            inner.lru_queue.push_back(key.clone());
            if self.config.enable_metrics {
                inner.stats.misses += 1;
            }
            inner.evict_if_needed(self.config.max_entries, self.config.enable_metrics);
            inner.stats.entries = inner.entries.len();
            tx
        };

        debug!(key = %key, "cache miss, computing");
        let outcome = compute().await;

        {
            let mut inner = self.inner.write().await;
            let fresh = inner.is_fresh(&key, &tx);

            match &outcome {
                Ok(value) => {
                    if fresh {
                        match inner.entries.get_mut(&key) {
                            Some(entry) => {
                                entry.state = EntryState::Ready {
                                    value: value.clone(),
                                };
                                debug!(key = %key, "published computed value");
                            }
                            None => {
                                // Removal paths bump the generation or the
                                // epoch first, so a fresh snapshot with no
                                // entry means store/index desync.
                                error!(
                                    key = %key,
                                    "{}",
                                    CacheError::Compute(
                                        "fresh computation has no entry to publish into"
                                            .to_string()
                                    )
                                );
                            }
                        }
                    } else {
                        if self.config.enable_metrics {
                            inner.stats.fenced += 1;
                        }
                        debug!(key = %key, "discarding result fenced by invalidation");
                    }
                }
                Err(e) => {
                    // Never cache a failure: the key reverts to absent so
                    // the next call retries the read.
                    if fresh {
                        inner.remove_entry(&key);
                    }
                    debug!(key = %key, error = %e, "computation failed, not cached");
                }
            }
            inner.stats.entries = inner.entries.len();
        }

        // Fan the shared outcome out to every waiter. Errors only mean
        // nobody is waiting.
        let _ = tx.send(Some(outcome.clone()));

        outcome
    }

    /// Peek at the published value for a key without computing anything.
    /// An entry with a computation still in flight reads as a miss.
    pub async fn get(&self, key: &str) -> Option<CacheValue> {
        let mut inner = self.inner.write().await;

        let value = match inner.entries.get(key) {
            Some(entry) => match &entry.state {
                EntryState::Ready { value } => Some(value.clone()),
                EntryState::Computing { .. } => None,
            },
            None => None,
        };

        if value.is_some() {
            if let Some(entry) = inner.entries.get_mut(key) {
                entry.mark_accessed();
            }
            if self.config.enable_metrics {
                inner.stats.hits += 1;
            }
            if self.config.max_entries.is_some() {
                inner.touch(&key.to_string());
            }
        } else if self.config.enable_metrics {
            inner.stats.misses += 1;
        }

        value
    }

    /// Atomically remove every key indexed under `tag` from the primary
    /// store and from all other tag buckets it belonged to, bumping each
    /// in-flight key's generation so its pending publish is discarded.
    ///
    /// Returns the number of entries removed. A tag with no entries is a
    /// silent no-op.
    pub async fn invalidate_by_tag(&self, tag: &Tag) -> usize {
        let mut inner = self.inner.write().await;

        let keys = match inner.tag_index.remove(tag) {
            Some(keys) => keys,
            None => {
                debug!(tag = %tag, "no entries under tag");
                return 0;
            }
        };

        let mut removed = 0;
        for key in keys {
            match inner.remove_entry(&key) {
                Some(entry) => {
                    removed += 1;
                    if !entry.is_ready() {
                        *inner.generations.entry(key).or_insert(0) += 1;
                    }
                }
                None => {
                    error!(
                        key = %key,
                        tag = %tag,
                        "{}",
                        CacheError::Compute(
                            "reverse index referenced a key missing from the store"
                                .to_string()
                        )
                    );
                }
            }
        }

        if self.config.enable_metrics {
            inner.stats.invalidations += removed as u64;
        }
        inner.stats.entries = inner.entries.len();

        info!(tag = %tag, removed, "invalidated tag");
        removed
    }

    /// Clear the entire store and index (process shutdown / test reset
    /// only). Computations still in flight are fenced by the epoch bump.
    pub async fn invalidate_all(&self) {
        let mut inner = self.inner.write().await;

        let count = inner.entries.len();
        inner.entries.clear();
        inner.tag_index.clear();
        inner.generations.clear();
        inner.lru_queue.clear();
        inner.epoch += 1;
        if self.config.enable_metrics {
            inner.stats.invalidations += count as u64;
        }
        inner.stats.entries = 0;

        info!(count, "cleared cache store");
    }

    /// Get cache statistics
    pub async fn stats(&self) -> CacheStats {
        let inner = self.inner.read().await;
        inner.stats.clone()
    }

    /// Get number of entries in cache
    pub async fn len(&self) -> usize {
        let inner = self.inner.read().await;
        inner.entries.len()
    }

    /// Check if cache is empty
    pub async fn is_empty(&self) -> bool {
        let inner = self.inner.read().await;
        inner.entries.is_empty()
    }

    /// Wait for another caller's computation and return its outcome
    async fn join(
        &self,
        key: &CacheKey,
        mut rx: watch::Receiver<Option<ComputeOutcome>>,
    ) -> Result<CacheValue> {
        loop {
            {
                let current = rx.borrow_and_update();
                if let Some(outcome) = current.as_ref() {
                    return outcome.clone();
                }
            }

            if rx.changed().await.is_err() {
                // The computing caller was cancelled before publishing.
                // Clear the abandoned entry so the next call retries.
                let mut inner = self.inner.write().await;
                let abandoned = match inner.entries.get(key) {
                    Some(CacheEntry {
                        state: EntryState::Computing { outcome },
                        ..
                    }) => outcome.same_channel(&rx),
                    _ => false,
                };
                if abandoned {
                    inner.remove_entry(key);
                    inner.stats.entries = inner.entries.len();
                }
                return Err(CacheError::Read(
                    "read operation was cancelled before completing".to_string(),
                ));
            }
        }
    }
}

impl StoreInner {
    /// Remove an entry from the store, every tag bucket it belonged to,
    /// and the LRU queue. Returns the removed entry.
    fn remove_entry(&mut self, key: &str) -> Option<CacheEntry> {
        let entry = self.entries.remove(key)?;

        for tag in &entry.tags {
            if let Some(bucket) = self.tag_index.get_mut(tag) {
                bucket.remove(key);
                if bucket.is_empty() {
                    self.tag_index.remove(tag);
                }
            }
        }
        self.lru_queue.retain(|k| k != key);

        Some(entry)
    }

    /// Move a key to the most recently used position
    fn touch(&mut self, key: &CacheKey) {
        self.lru_queue.retain(|k| k != key);
        self.lru_queue.push_back(key.clone());
    }

    /// Evict least recently used READY entries until the capacity bound
    /// holds. Entries with a computation in flight are never evicted.
    fn evict_if_needed(&mut self, max_entries: Option<usize>, metrics: bool) {
        let Some(max) = max_entries else {
            return;
        };

        let mut scanned = 0;
        let limit = self.lru_queue.len();
        while self.entries.len() > max && scanned < limit {
            let Some(key) = self.lru_queue.pop_front() else {
                break;
            };
            scanned += 1;

            match self.entries.get(&key).map(CacheEntry::is_ready) {
                Some(true) => {
                    debug!(key = %key, "evicting least recently used entry");
                    self.remove_entry(&key);
                    if metrics {
                        self.stats.evictions += 1;
                    }
                }
                Some(false) => {
                    // In flight; keep in the queue
                    self.lru_queue.push_back(key);
                }
                None => {}
            }
        }
    }

    /// Check that a computation's snapshot still matches the store, by
    /// identity of its publish channel plus generation and epoch counters
    fn is_fresh(&self, key: &str, tx: &watch::Sender<Option<ComputeOutcome>>) -> bool {
        match self.entries.get(key) {
            Some(entry) => match &entry.state {
                EntryState::Computing { outcome } => {
                    tx.subscribe().same_channel(outcome)
                        && entry.generation == self.generations.get(key).copied().unwrap_or(0)
                        && entry.epoch == self.epoch
                }
                EntryState::Ready { .. } => false,
            },
            None => false,
        }
    }
}
