//! # Least Recently Used (LRU) Page Cache
//!
//! Keeps resident pages in recency order and evicts the page that has gone
//! longest without being requested.
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────────────┐
//!   │                          LruCache<K, V>                              │
//!   │                                                                      │
//!   │   ┌──────────────────────────────────────────────────────────────┐   │
//!   │   │  FxHashMap<K, SlotId> (key index)                            │   │
//!   │   │                                                              │   │
//!   │   │  ┌─────────┬──────────────────────────────────────────┐      │   │
//!   │   │  │   Key   │  SlotId                                  │      │   │
//!   │   │  ├─────────┼──────────────────────────────────────────┤      │   │
//!   │   │  │  page_1 │  ─────────────────────────────────────┐  │      │   │
//!   │   │  │  page_2 │  ───────────────────────────────┐     │  │      │   │
//!   │   │  │  page_3 │  ─────────────────────────┐     │     │  │      │   │
//!   │   │  └─────────┴───────────────────────────┼─────┼─────┼──┘      │   │
//!   │   └────────────────────────────────────────┼─────┼─────┼─────────┘   │
//!   │                                            │     │     │             │
//!   │   ┌────────────────────────────────────────┼─────┼─────┼─────────┐   │
//!   │   │  IntrusiveList<Entry<K, V>> (recency)  ▼     ▼     ▼         │   │
//!   │   │                                                              │   │
//!   │   │  head ──► ┌──────┐ ◄──► ┌──────┐ ◄──► ┌──────┐ ◄── tail      │   │
//!   │   │   (MRU)   │id_3  │      │id_2  │      │id_1  │    (LRU)      │   │
//!   │   │           └──────┘      └──────┘      └──────┘               │   │
//!   │   └──────────────────────────────────────────────────────────────┘   │
//!   └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Access Flow
//!
//! ```text
//!   HIT  access(B):   head ─► [A] [B] [C] ◄─ tail
//!                     move B to head (O(1), SlotId stays valid)
//!                     head ─► [B] [A] [C] ◄─ tail
//!
//!   MISS access(D), full (capacity = 3):
//!                     1. load D
//!                     2. pop tail [C], drop C from index
//!                     3. push [D] at head, index D
//!                     head ─► [D] [B] [A] ◄─ tail
//! ```
//!
//! Entries live in the list's slot arena, so promotion and eviction never
//! invalidate the handles held by the index.
//!
//! ## Zero capacity
//!
//! A cache that can hold nothing cannot produce a meaningful hit count, so
//! `try_new(0)` returns [`ConfigError`] and `new(0)` panics.

use std::fmt;
use std::hash::Hash;

use rustc_hash::FxHashMap;
use tracing::trace;

use crate::ds::intrusive_list::IntrusiveList;
use crate::ds::slot_arena::SlotId;
use crate::error::{ConfigError, InvariantError};
#[cfg(feature = "metrics")]
use crate::metrics::metrics_impl::LruMetrics;
#[cfg(feature = "metrics")]
use crate::metrics::snapshot::LruMetricsSnapshot;
#[cfg(feature = "metrics")]
use crate::metrics::traits::{CoreMetricsRecorder, LruMetricsRecorder, MetricsSnapshotProvider};
use crate::traits::{PageCache, PageLoader};

#[derive(Debug)]
struct Entry<K, V> {
    key: K,
    value: V,
}

/// Recency-ordered page cache.
///
/// # Example
///
/// ```
/// use pagesim::policy::lru::LruCache;
///
/// let mut cache = LruCache::new(2);
/// let load = |k: &u32| *k * 10;
///
/// assert!(!cache.access(1, load));
/// assert!(!cache.access(2, load));
/// assert!(cache.access(1, load));   // 1 becomes most recent
/// assert!(!cache.access(3, load));  // evicts 2
/// assert!(!cache.contains(&2));
/// assert_eq!(cache.peek(&1), Some(&10));
/// ```
pub struct LruCache<K, V> {
    list: IntrusiveList<Entry<K, V>>,
    index: FxHashMap<K, SlotId>,
    capacity: usize,
    #[cfg(feature = "metrics")]
    metrics: LruMetrics,
}

impl<K, V> LruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates a cache holding at most `capacity` pages.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero. See [`try_new`](Self::try_new).
    pub fn new(capacity: usize) -> Self {
        match Self::try_new(capacity) {
            Ok(cache) => cache,
            Err(e) => panic!("{}", e),
        }
    }

    /// Creates a cache, rejecting a zero capacity.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `capacity` is zero.
    pub fn try_new(capacity: usize) -> Result<Self, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::new("lru cache capacity must be greater than zero"));
        }
        Ok(Self {
            list: IntrusiveList::with_capacity(capacity),
            index: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            capacity,
            #[cfg(feature = "metrics")]
            metrics: LruMetrics::default(),
        })
    }

    /// Serves one request. Returns `true` on a hit.
    ///
    /// A hit moves the page to the most-recently-used position and does not
    /// call `loader`. A miss calls `loader` once, evicts the least recently
    /// used page if the cache is full, and inserts the new page as most recent.
    pub fn access<F>(&mut self, key: K, loader: F) -> bool
    where
        F: FnOnce(&K) -> V,
    {
        let Ok(hit) = self.try_access(key, |k| Ok::<V, std::convert::Infallible>(loader(k)));
        hit
    }

    /// Like [`access`](Self::access) with a fallible loader.
    ///
    /// The loader runs before anything is evicted, so a failed load leaves the
    /// cache exactly as it was and hands the loader's error back.
    pub fn try_access<F, E>(&mut self, key: K, loader: F) -> Result<bool, E>
    where
        F: FnOnce(&K) -> Result<V, E>,
    {
        #[cfg(feature = "metrics")]
        self.metrics.record_access();

        if let Some(&id) = self.index.get(&key) {
            #[cfg(feature = "metrics")]
            {
                self.metrics.record_hit();
                if self.list.front_id() != Some(id) {
                    self.metrics.record_promotion();
                }
            }
            self.list.move_to_front(id);
            return Ok(true);
        }

        #[cfg(feature = "metrics")]
        self.metrics.record_miss();

        let value = match loader(&key) {
            Ok(value) => value,
            Err(err) => {
                #[cfg(feature = "metrics")]
                self.metrics.record_load_failure();
                return Err(err);
            }
        };
        #[cfg(feature = "metrics")]
        self.metrics.record_load();

        if self.list.len() >= self.capacity {
            self.pop_lru();
        }

        let id = self.list.push_front(Entry {
            key: key.clone(),
            value,
        });
        self.index.insert(key, id);

        debug_assert_eq!(self.index.len(), self.list.len());
        debug_assert!(self.list.len() <= self.capacity);
        Ok(false)
    }

    /// Removes and returns the least recently used page.
    pub fn pop_lru(&mut self) -> Option<(K, V)> {
        let entry = self.list.pop_back()?;
        self.index.remove(&entry.key);
        #[cfg(feature = "metrics")]
        self.metrics.record_eviction();
        trace!(resident = self.list.len(), "lru eviction");
        Some((entry.key, entry.value))
    }

    /// Least recently used page, without removing it.
    pub fn peek_lru(&self) -> Option<(&K, &V)> {
        self.list.back().map(|entry| (&entry.key, &entry.value))
    }

    /// Value of a resident page without touching its recency.
    pub fn peek(&self, key: &K) -> Option<&V> {
        let id = *self.index.get(key)?;
        self.list.get(id).map(|entry| &entry.value)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Position in recency order, `0` being most recent. O(n).
    pub fn recency_rank(&self, key: &K) -> Option<usize> {
        let id = *self.index.get(key)?;
        self.list.iter_entries().position(|(entry_id, _)| entry_id == id)
    }

    /// Resident keys from most to least recently used.
    pub fn keys_by_recency(&self) -> impl Iterator<Item = &K> {
        self.list.iter().map(|entry| &entry.key)
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drops every resident page. Capacity is unchanged.
    pub fn clear(&mut self) {
        #[cfg(feature = "metrics")]
        self.metrics.record_clear();
        self.list.clear();
        self.index.clear();
    }

    /// Verifies that the key index and the recency list describe the same
    /// set of pages.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        #[cfg(debug_assertions)]
        self.list.debug_validate_invariants();

        if self.index.len() != self.list.len() {
            return Err(InvariantError::new(format!(
                "index has {} keys but recency list has {} entries",
                self.index.len(),
                self.list.len()
            )));
        }
        if self.list.len() > self.capacity {
            return Err(InvariantError::new(format!(
                "{} resident pages exceed capacity {}",
                self.list.len(),
                self.capacity
            )));
        }
        for (position, (id, entry)) in self.list.iter_entries().enumerate() {
            match self.index.get(&entry.key) {
                Some(&indexed) if indexed == id => {}
                Some(&indexed) => {
                    return Err(InvariantError::new(format!(
                        "entry at recency position {position} is {id:?} but index points to {indexed:?}"
                    )));
                }
                None => {
                    return Err(InvariantError::new(format!(
                        "entry at recency position {position} is missing from the index"
                    )));
                }
            }
        }
        Ok(())
    }
}

impl<K, V> PageCache<K, V> for LruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    type Error = std::convert::Infallible;

    fn access<L>(&mut self, key: K, loader: &mut L) -> Result<bool, Self::Error>
    where
        L: PageLoader<K, V>,
    {
        Ok(LruCache::access(self, key, |k| loader.load(k)))
    }

    fn len(&self) -> usize {
        self.list.len()
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }
}

#[cfg(feature = "metrics")]
impl<K, V> LruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    pub fn metrics_snapshot(&self) -> LruMetricsSnapshot {
        LruMetricsSnapshot {
            accesses: self.metrics.accesses,
            hits: self.metrics.hits,
            misses: self.metrics.misses,
            loads: self.metrics.loads,
            load_failures: self.metrics.load_failures,
            evictions: self.metrics.evictions,
            promotions: self.metrics.promotions,
            clears: self.metrics.clears,
            cache_len: self.list.len(),
            capacity: self.capacity,
        }
    }
}

#[cfg(feature = "metrics")]
impl<K, V> MetricsSnapshotProvider<LruMetricsSnapshot> for LruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn snapshot(&self) -> LruMetricsSnapshot {
        self.metrics_snapshot()
    }
}

impl<K, V> fmt::Debug for LruCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruCache")
            .field("len", &self.list.len())
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}
