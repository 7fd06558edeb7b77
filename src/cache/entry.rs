//! Cache entry lifecycle
//!
//! An entry is created in `Computing` state on first access to an absent
//! key, transitions to `Ready` when the computation publishes, and is
//! destroyed when one of its tags is invalidated, when the store is
//! cleared, or when the capacity policy reclaims it. The EMPTY state of
//! the lifecycle is represented by absence from the store.

use crate::cache::tags::Tag;
use crate::cache::types::{CacheKey, CacheValue};
use crate::error::CacheError;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use tokio::sync::watch;

/// Outcome of one in-flight computation, fanned out verbatim to every
/// caller waiting on the same key. `None` on the channel means the
/// computation has not resolved yet.
pub(crate) type ComputeOutcome = std::result::Result<CacheValue, CacheError>;

/// State of a cache entry
pub(crate) enum EntryState {
    /// A computation for this key is in flight; waiters subscribe to the
    /// channel and receive the shared outcome.
    Computing {
        outcome: watch::Receiver<Option<ComputeOutcome>>,
    },

    /// The computation published successfully
    Ready { value: CacheValue },
}

/// A cache entry with its declared tag set and fencing snapshot
pub(crate) struct CacheEntry {
    /// The cache key
    pub key: CacheKey,

    /// Tags this entry is registered under in the reverse index
    pub tags: HashSet<Tag>,

    /// Per-key generation snapshot taken when the computation started;
    /// a publish is discarded if the key's generation has moved on
    pub generation: u64,

    /// Store-wide epoch snapshot; bumped by `invalidate_all`
    pub epoch: u64,

    /// Entry state (COMPUTING or READY)
    pub state: EntryState,

    /// Entry metadata
    pub metadata: CacheMetadata,
}

impl CacheEntry {
    /// Create a new entry in COMPUTING state
    pub fn computing(
        key: CacheKey,
        tags: HashSet<Tag>,
        generation: u64,
        epoch: u64,
        outcome: watch::Receiver<Option<ComputeOutcome>>,
    ) -> Self {
        let now = Utc::now();

        Self {
            key,
            tags,
            generation,
            epoch,
            state: EntryState::Computing { outcome },
            metadata: CacheMetadata {
                created_at: now,
                accessed_at: now,
                access_count: 0,
            },
        }
    }

    /// Check if the entry has published its value
    pub fn is_ready(&self) -> bool {
        matches!(self.state, EntryState::Ready { .. })
    }

    /// Check if entry is registered under a specific tag
    pub fn has_tag(&self, tag: &Tag) -> bool {
        self.tags.contains(tag)
    }

    /// Mark the entry as accessed (updates access time and count)
    pub fn mark_accessed(&mut self) {
        self.metadata.accessed_at = Utc::now();
        self.metadata.access_count += 1;
    }
}

/// Metadata associated with a cache entry
#[derive(Debug, Clone)]
pub(crate) struct CacheMetadata {
    /// When the entry was created
    pub created_at: DateTime<Utc>,

    /// Last access time (for LRU tracking)
    pub accessed_at: DateTime<Utc>,

    /// Number of times this entry has been accessed
    pub access_count: u64,
}
