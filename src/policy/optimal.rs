//! # Offline-Optimal (Belady) Page Cache
//!
//! The oracle is built with the entire request sequence up front. On a miss
//! with a full cache it evicts the resident page whose next request lies
//! farthest in the future; a page that is never requested again is the ideal
//! victim. For a fixed sequence and capacity no demand-paging policy gets more
//! hits, which makes this cache the yardstick the LRU numbers are read
//! against.
//!
//! ## Architecture
//!
//! ```text
//!   ┌───────────────────────────────────────────────────────────────────────┐
//!   │                         OptimalCache<K, V>                            │
//!   │                                                                       │
//!   │   future: [k0, k1, k2, ... , kn-1]      cursor ─► next request index  │
//!   │                                                                       │
//!   │   ┌───────────────────────────┐    ┌───────────────────────────────┐  │
//!   │   │ FxHashMap<K, SlotId>      │──► │ IntrusiveList<Resident<K, V>> │  │
//!   │   │ (key index)               │    │ insertion order, front=oldest │  │
//!   │   └───────────────────────────┘    │ Resident { key, value,        │  │
//!   │                                    │            last_request }     │  │
//!   │                                    └───────────────────────────────┘  │
//!   │                                                                       │
//!   │   Oracle::Scan                 or   Oracle::Indexed(NextUseTable)     │
//!   │   rescan future[c+1..] per key      next_use[last_request], O(1)      │
//!   └───────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Victim Selection
//!
//! At cursor `c` the next-use distance of a resident key `k` is the smallest
//! `i > c` with `future[i] == k`, or [`NextUse::Never`]. Residents are scanned
//! oldest-insertion first and the victim is the one with the **strictly
//! largest** distance, so among equals the first one scanned wins. Hits do
//! not reorder residents.
//!
//! ```text
//!   future = [1, 2, 3, 1, 2, 4], capacity = 2
//!
//!   c=0  1  miss            residents [1]
//!   c=1  2  miss            residents [1, 2]
//!   c=2  3  miss  next(1)=3, next(2)=4 → evict 2
//!                           residents [1, 3]
//!   c=3  1  hit
//!   c=4  2  miss  next(1)=∞, next(3)=∞ → tie, evict 1 (scanned first)
//!                           residents [3, 2]
//!   c=5  4  miss  next(3)=∞, next(2)=∞ → evict 3
//!
//!   hits = 1
//! ```
//!
//! ## Lookahead Strategies
//!
//! | Strategy            | Per-miss cost               | Setup  |
//! |---------------------|-----------------------------|--------|
//! | [`Lookahead::Scan`]    | O(capacity × remaining)  | none   |
//! | [`Lookahead::Indexed`] | O(capacity)              | O(n)   |
//!
//! Both pick the same victim for every miss.
//!
//! ## Horizon
//!
//! The oracle only knows the declared sequence. Accessing past its end, or
//! requesting a key other than the one declared at the cursor, is refused with
//! [`HorizonError`] and changes nothing.

use std::convert::Infallible;
use std::fmt;
use std::hash::Hash;

use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::ds::intrusive_list::IntrusiveList;
use crate::ds::next_use::{NextUse, NextUseTable, scan_next_use};
use crate::ds::slot_arena::SlotId;
use crate::error::{AccessError, ConfigError, HorizonError, InvariantError};
#[cfg(feature = "metrics")]
use crate::metrics::metrics_impl::OracleMetrics;
#[cfg(feature = "metrics")]
use crate::metrics::snapshot::OracleMetricsSnapshot;
#[cfg(feature = "metrics")]
use crate::metrics::traits::{
    CoreMetricsRecorder, MetricsSnapshotProvider, OracleMetricsRecorder,
};
use crate::traits::{PageCache, PageLoader};

/// How the oracle finds each resident key's next request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum Lookahead {
    /// Rescan the remaining sequence for every resident key on each eviction.
    Scan,
    /// Precompute a next-occurrence table once at construction.
    #[default]
    Indexed,
}

#[derive(Debug)]
enum Oracle {
    Scan,
    Indexed(NextUseTable),
}

#[derive(Debug)]
struct Resident<K, V> {
    key: K,
    value: V,
    /// Position of the most recent request for `key`.
    last_request: usize,
}

/// Belady page cache over a known request sequence.
///
/// # Example
///
/// ```
/// use pagesim::policy::optimal::OptimalCache;
///
/// let future = vec![1, 2, 3, 1, 2, 4];
/// let mut cache = OptimalCache::new(2, future.clone());
///
/// let mut hits = 0;
/// for key in future {
///     if cache.access(key, |k| *k).unwrap() {
///         hits += 1;
///     }
/// }
/// assert_eq!(hits, 1);
/// assert!(cache.access(9, |k| *k).is_err()); // past the horizon
/// ```
pub struct OptimalCache<K, V> {
    residents: IntrusiveList<Resident<K, V>>,
    index: FxHashMap<K, SlotId>,
    future: Vec<K>,
    oracle: Oracle,
    cursor: usize,
    capacity: usize,
    #[cfg(feature = "metrics")]
    metrics: OracleMetrics,
}

impl<K, V> OptimalCache<K, V>
where
    K: Eq + Hash + Clone + fmt::Debug,
{
    /// Creates an oracle over `future` using the indexed lookahead.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero. See [`try_new`](Self::try_new).
    pub fn new(capacity: usize, future: Vec<K>) -> Self {
        Self::with_lookahead(capacity, future, Lookahead::default())
    }

    /// # Errors
    ///
    /// Returns [`ConfigError`] if `capacity` is zero.
    pub fn try_new(capacity: usize, future: Vec<K>) -> Result<Self, ConfigError> {
        Self::try_with_lookahead(capacity, future, Lookahead::default())
    }

    /// # Panics
    ///
    /// Panics if `capacity` is zero. See [`try_with_lookahead`](Self::try_with_lookahead).
    pub fn with_lookahead(capacity: usize, future: Vec<K>, lookahead: Lookahead) -> Self {
        match Self::try_with_lookahead(capacity, future, lookahead) {
            Ok(cache) => cache,
            Err(e) => panic!("{}", e),
        }
    }

    /// Creates an oracle with an explicit lookahead strategy.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `capacity` is zero.
    pub fn try_with_lookahead(
        capacity: usize,
        future: Vec<K>,
        lookahead: Lookahead,
    ) -> Result<Self, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::new(
                "optimal cache capacity must be greater than zero",
            ));
        }
        let oracle = match lookahead {
            Lookahead::Scan => Oracle::Scan,
            Lookahead::Indexed => Oracle::Indexed(NextUseTable::build(&future)),
        };
        debug!(capacity, horizon = future.len(), ?lookahead, "optimal cache ready");
        Ok(Self {
            residents: IntrusiveList::with_capacity(capacity),
            index: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            future,
            oracle,
            cursor: 0,
            capacity,
            #[cfg(feature = "metrics")]
            metrics: OracleMetrics::default(),
        })
    }

    /// Serves the request at the cursor. Returns `Ok(true)` on a hit.
    ///
    /// A hit leaves residency untouched. A miss calls `loader` once, evicts
    /// the resident page with the farthest next request if the cache is full,
    /// and inserts the new page. Either way the cursor advances by one.
    ///
    /// # Errors
    ///
    /// [`HorizonError`] if the sequence is exhausted or `key` is not the
    /// declared request at the cursor. Nothing changes in that case.
    pub fn access<F>(&mut self, key: K, loader: F) -> Result<bool, HorizonError>
    where
        F: FnOnce(&K) -> V,
    {
        match self.try_access(key, |k| Ok::<V, Infallible>(loader(k))) {
            Ok(hit) => Ok(hit),
            Err(AccessError::Horizon(err)) => Err(err),
            Err(AccessError::Load(never)) => match never {},
        }
    }

    /// Like [`access`](Self::access) with a fallible loader.
    ///
    /// A failed load leaves residency and the cursor untouched, so the same
    /// request can be retried.
    pub fn try_access<F, E>(&mut self, key: K, loader: F) -> Result<bool, AccessError<E>>
    where
        F: FnOnce(&K) -> Result<V, E>,
    {
        #[cfg(feature = "metrics")]
        self.metrics.record_access();

        let position = self.cursor;
        if let Err(err) = self.check_request(position, &key) {
            #[cfg(feature = "metrics")]
            self.metrics.record_horizon_rejection();
            return Err(err.into());
        }

        if let Some(&id) = self.index.get(&key) {
            if let Some(resident) = self.residents.get_mut(id) {
                resident.last_request = position;
            }
            self.cursor += 1;
            #[cfg(feature = "metrics")]
            self.metrics.record_hit();
            return Ok(true);
        }

        #[cfg(feature = "metrics")]
        self.metrics.record_miss();

        let value = match loader(&key) {
            Ok(value) => value,
            Err(err) => {
                #[cfg(feature = "metrics")]
                self.metrics.record_load_failure();
                return Err(AccessError::Load(err));
            }
        };
        #[cfg(feature = "metrics")]
        self.metrics.record_load();

        if self.residents.len() >= self.capacity {
            self.evict_farthest(position);
        }

        let id = self.residents.push_back(Resident {
            key: key.clone(),
            value,
            last_request: position,
        });
        self.index.insert(key, id);
        self.cursor += 1;

        debug_assert_eq!(self.index.len(), self.residents.len());
        debug_assert!(self.residents.len() <= self.capacity);
        Ok(false)
    }

    fn check_request(&self, position: usize, key: &K) -> Result<(), HorizonError> {
        match self.future.get(position) {
            None => Err(HorizonError::Exhausted {
                horizon: self.future.len(),
            }),
            Some(expected) if expected != key => {
                Err(HorizonError::diverged(position, expected, key))
            }
            Some(_) => Ok(()),
        }
    }

    /// Next-use distance of a resident, seen from the request at `position`.
    #[inline]
    fn distance(&self, position: usize, resident: &Resident<K, V>) -> NextUse {
        match &self.oracle {
            Oracle::Scan => scan_next_use(&self.future, position, &resident.key),
            Oracle::Indexed(table) => match table.after(resident.last_request) {
                // a resident requested at `position` itself is measured from there
                NextUse::At(next) if next <= position => table.after(next),
                distance => distance,
            },
        }
    }

    /// Picks the victim for a miss at `position`, plus the number of residents
    /// examined.
    fn select_victim(&self, position: usize) -> (Option<(SlotId, NextUse)>, u64) {
        let mut victim: Option<(SlotId, NextUse)> = None;
        let mut steps = 0u64;
        for (id, resident) in self.residents.iter_entries() {
            steps += 1;
            let distance = self.distance(position, resident);
            if victim.is_none_or(|(_, farthest)| distance > farthest) {
                victim = Some((id, distance));
            }
            // nothing is farther than never; later residents cannot win the tie
            if distance.is_never() {
                break;
            }
        }
        (victim, steps)
    }

    fn evict_farthest(&mut self, position: usize) {
        let (victim, _steps) = self.select_victim(position);
        #[cfg(feature = "metrics")]
        for _ in 0.._steps {
            self.metrics.record_victim_scan_step();
        }

        let Some((id, distance)) = victim else {
            return;
        };
        let removed = self.residents.remove(id);
        debug_assert!(removed.is_some(), "victim handle {id:?} not in residency list");
        if let Some(resident) = removed {
            self.index.remove(&resident.key);
            #[cfg(feature = "metrics")]
            {
                self.metrics.record_eviction();
                if distance.is_never() {
                    self.metrics.record_never_reused_victim();
                }
            }
            trace!(position, victim = ?resident.key, ?distance, "optimal eviction");
        }
    }

    /// Key that would be evicted if the request at the cursor missed now, with
    /// its next-use distance. `None` when nothing is resident.
    pub fn victim(&self) -> Option<(&K, NextUse)> {
        let (victim, _) = self.select_victim(self.cursor);
        let (id, distance) = victim?;
        self.residents.get(id).map(|resident| (&resident.key, distance))
    }

    /// First position at or after the cursor where `key` is requested.
    pub fn next_use(&self, key: &K) -> NextUse {
        if let (Oracle::Indexed(table), Some(&id)) = (&self.oracle, self.index.get(key)) {
            if let Some(resident) = self.residents.get(id) {
                return table.after(resident.last_request);
            }
        }
        self.future
            .get(self.cursor..)
            .and_then(|rest| rest.iter().position(|k| k == key))
            .map_or(NextUse::Never, |offset| NextUse::At(self.cursor + offset))
    }

    pub fn peek(&self, key: &K) -> Option<&V> {
        let id = *self.index.get(key)?;
        self.residents.get(id).map(|resident| &resident.value)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Resident keys in scan order (oldest insertion first).
    pub fn resident_keys(&self) -> impl Iterator<Item = &K> {
        self.residents.iter().map(|resident| &resident.key)
    }

    /// Index of the next request to be served.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Length of the declared request sequence.
    pub fn horizon(&self) -> usize {
        self.future.len()
    }

    pub fn remaining(&self) -> usize {
        self.future.len() - self.cursor
    }

    /// Drops every resident page and rewinds the cursor, so the same sequence
    /// can be replayed from the start.
    pub fn clear(&mut self) {
        #[cfg(feature = "metrics")]
        self.metrics.record_clear();
        self.residents.clear();
        self.index.clear();
        self.cursor = 0;
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.future.len()
    }

    pub fn lookahead(&self) -> Lookahead {
        match self.oracle {
            Oracle::Scan => Lookahead::Scan,
            Oracle::Indexed(_) => Lookahead::Indexed,
        }
    }

    pub fn len(&self) -> usize {
        self.residents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.residents.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Verifies index/residency agreement, the capacity bound, and that every
    /// resident's recorded last request matches the sequence.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        #[cfg(debug_assertions)]
        self.residents.debug_validate_invariants();

        if self.index.len() != self.residents.len() {
            return Err(InvariantError::new(format!(
                "index has {} keys but residency list has {} entries",
                self.index.len(),
                self.residents.len()
            )));
        }
        if self.residents.len() > self.capacity {
            return Err(InvariantError::new(format!(
                "{} resident pages exceed capacity {}",
                self.residents.len(),
                self.capacity
            )));
        }
        if self.cursor > self.future.len() {
            return Err(InvariantError::new(format!(
                "cursor {} is past horizon {}",
                self.cursor,
                self.future.len()
            )));
        }
        for (id, resident) in self.residents.iter_entries() {
            if self.index.get(&resident.key) != Some(&id) {
                return Err(InvariantError::new(format!(
                    "resident {:?} at {id:?} is not indexed under that handle",
                    resident.key
                )));
            }
            let last = resident.last_request;
            if last >= self.cursor || self.future.get(last) != Some(&resident.key) {
                return Err(InvariantError::new(format!(
                    "resident {:?} records last request {last}, which the sequence contradicts",
                    resident.key
                )));
            }
            if self.future[last + 1..self.cursor].contains(&resident.key) {
                return Err(InvariantError::new(format!(
                    "resident {:?} was requested after its recorded last request {last}",
                    resident.key
                )));
            }
        }
        Ok(())
    }
}

impl<K, V> PageCache<K, V> for OptimalCache<K, V>
where
    K: Eq + Hash + Clone + fmt::Debug,
{
    type Error = HorizonError;

    fn access<L>(&mut self, key: K, loader: &mut L) -> Result<bool, Self::Error>
    where
        L: PageLoader<K, V>,
    {
        OptimalCache::access(self, key, |k| loader.load(k))
    }

    fn len(&self) -> usize {
        self.residents.len()
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }
}

#[cfg(feature = "metrics")]
impl<K, V> OptimalCache<K, V>
where
    K: Eq + Hash + Clone + fmt::Debug,
{
    pub fn metrics_snapshot(&self) -> OracleMetricsSnapshot {
        OracleMetricsSnapshot {
            accesses: self.metrics.accesses,
            hits: self.metrics.hits,
            misses: self.metrics.misses,
            loads: self.metrics.loads,
            load_failures: self.metrics.load_failures,
            evictions: self.metrics.evictions,
            victim_scan_steps: self.metrics.victim_scan_steps,
            never_reused_victims: self.metrics.never_reused_victims,
            horizon_rejections: self.metrics.horizon_rejections,
            clears: self.metrics.clears,
            cache_len: self.residents.len(),
            capacity: self.capacity,
            cursor: self.cursor,
            horizon: self.future.len(),
        }
    }
}

#[cfg(feature = "metrics")]
impl<K, V> MetricsSnapshotProvider<OracleMetricsSnapshot> for OptimalCache<K, V>
where
    K: Eq + Hash + Clone + fmt::Debug,
{
    fn snapshot(&self) -> OracleMetricsSnapshot {
        self.metrics_snapshot()
    }
}

impl<K, V> fmt::Debug for OptimalCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lookahead = match self.oracle {
            Oracle::Scan => Lookahead::Scan,
            Oracle::Indexed(_) => Lookahead::Indexed,
        };
        f.debug_struct("OptimalCache")
            .field("len", &self.residents.len())
            .field("capacity", &self.capacity)
            .field("cursor", &self.cursor)
            .field("horizon", &self.future.len())
            .field("lookahead", &lookahead)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOTH: [Lookahead; 2] = [Lookahead::Scan, Lookahead::Indexed];

    fn hits(capacity: usize, requests: &[u32], lookahead: Lookahead) -> usize {
        let mut cache = OptimalCache::with_lookahead(capacity, requests.to_vec(), lookahead);
        requests
            .iter()
            .filter(|&&k| cache.access(k, |k| *k).unwrap())
            .count()
    }

    mod correctness {
        use super::*;

        mod basic_behavior {
            use super::*;

            #[test]
            fn test_new_cache_state() {
                let cache: OptimalCache<u32, u32> = OptimalCache::new(3, vec![1, 2, 3]);
                assert_eq!(cache.capacity(), 3);
                assert!(cache.is_empty());
                assert_eq!(cache.cursor(), 0);
                assert_eq!(cache.horizon(), 3);
                assert_eq!(cache.remaining(), 3);
                assert_eq!(cache.lookahead(), Lookahead::Indexed);
                assert!(cache.victim().is_none());
            }

            #[test]
            fn test_cursor_advances_on_hit_and_miss() {
                for lookahead in BOTH {
                    let mut cache = OptimalCache::with_lookahead(2, vec![5, 5, 6], lookahead);
                    assert_eq!(cache.access(5, |k| *k), Ok(false));
                    assert_eq!(cache.cursor(), 1);
                    assert_eq!(cache.access(5, |_| unreachable!("loader on hit")), Ok(true));
                    assert_eq!(cache.cursor(), 2);
                    assert_eq!(cache.access(6, |k| *k), Ok(false));
                    assert_eq!(cache.cursor(), 3);
                    assert!(cache.is_exhausted());
                }
            }

            #[test]
            fn test_hit_does_not_reorder_residents() {
                let mut cache = OptimalCache::new(3, vec![1, 2, 3, 1, 2]);
                for key in [1, 2, 3, 1] {
                    cache.access(key, |k| *k).unwrap();
                }
                let order: Vec<_> = cache.resident_keys().copied().collect();
                assert_eq!(order, vec![1, 2, 3]);
            }

            #[test]
            fn test_peek_returns_loaded_value() {
                let mut cache = OptimalCache::new(1, vec!["a", "b"]);
                cache.access("a", |k| k.to_uppercase()).unwrap();
                assert_eq!(cache.peek(&"a").map(String::as_str), Some("A"));
                assert_eq!(cache.peek(&"b"), None);
            }
        }

        mod victim_selection {
            use super::*;

            #[test]
            fn test_evicts_farthest_next_use() {
                for lookahead in BOTH {
                    let mut cache =
                        OptimalCache::with_lookahead(2, vec![1, 2, 3, 1, 2, 4], lookahead);
                    cache.access(1, |k| *k).unwrap();
                    cache.access(2, |k| *k).unwrap();

                    // at cursor 2: next(1) = 3, next(2) = 4
                    assert_eq!(cache.victim(), Some((&2, NextUse::At(4))));
                    assert_eq!(cache.next_use(&1), NextUse::At(3));
                    cache.access(3, |k| *k).unwrap();
                    assert!(cache.contains(&1));
                    assert!(!cache.contains(&2));
                    cache.check_invariants().unwrap();
                }
            }

            #[test]
            fn test_worked_example_hit_count() {
                for lookahead in BOTH {
                    assert_eq!(hits(2, &[1, 2, 3, 1, 2, 4], lookahead), 1);
                }
            }

            #[test]
            fn test_never_reused_preferred_regardless_of_scan_order() {
                for lookahead in BOTH {
                    // 1 is scanned first and has a finite next use; 2 never returns
                    let mut cache =
                        OptimalCache::with_lookahead(2, vec![1, 2, 3, 1], lookahead);
                    cache.access(1, |k| *k).unwrap();
                    cache.access(2, |k| *k).unwrap();
                    assert_eq!(cache.victim(), Some((&2, NextUse::Never)));
                    cache.access(3, |k| *k).unwrap();
                    assert!(cache.contains(&1));
                    assert!(!cache.contains(&2));
                    assert_eq!(cache.access(1, |k| *k), Ok(true));
                }
            }

            #[test]
            fn test_tie_goes_to_first_scanned() {
                for lookahead in BOTH {
                    // neither 7 nor 8 returns; 7 was inserted first
                    let mut cache =
                        OptimalCache::with_lookahead(2, vec![7, 8, 9, 9], lookahead);
                    cache.access(7, |k| *k).unwrap();
                    cache.access(8, |k| *k).unwrap();
                    assert_eq!(cache.victim(), Some((&7, NextUse::Never)));
                    cache.access(9, |k| *k).unwrap();
                    let order: Vec<_> = cache.resident_keys().copied().collect();
                    assert_eq!(order, vec![8, 9]);
                }
            }

            #[test]
            fn test_beats_lru_on_cyclic_scan() {
                let seq = [1, 2, 3, 1, 2, 3, 1, 2, 3];
                for lookahead in BOTH {
                    // LRU gets 0 here
                    assert_eq!(hits(2, &seq, lookahead), 3);
                }
            }

            #[test]
            fn test_victim_agrees_when_resident_is_requested_at_cursor() {
                // after the first access, 1 is resident and also the request at the cursor
                let victims: Vec<_> = BOTH
                    .iter()
                    .map(|&lookahead| {
                        let mut cache = OptimalCache::with_lookahead(1, vec![1, 1, 2], lookahead);
                        cache.access(1, |k| *k).unwrap();
                        cache.victim().map(|(key, distance)| (*key, distance))
                    })
                    .collect();
                assert_eq!(victims[0], Some((1, NextUse::Never)));
                assert_eq!(victims[0], victims[1]);
            }

            #[test]
            fn test_victim_distance_skips_request_at_cursor() {
                for lookahead in BOTH {
                    let mut cache =
                        OptimalCache::with_lookahead(2, vec![1, 2, 1, 3, 1], lookahead);
                    cache.access(1, |k| *k).unwrap();
                    cache.access(2, |k| *k).unwrap();
                    // cursor 2 requests 1; its next use after that is 4
                    assert_eq!(cache.victim(), Some((&2, NextUse::Never)));
                    assert_eq!(cache.next_use(&1), NextUse::At(2));
                }
            }

            #[test]
            fn test_fits_entirely_only_compulsory_misses() {
                let seq = [4, 1, 4, 2, 1, 2, 4];
                for lookahead in BOTH {
                    assert_eq!(hits(3, &seq, lookahead), 4);
                }
            }
        }

        mod horizon {
            use super::*;

            #[test]
            fn test_access_past_end_rejected() {
                let mut cache = OptimalCache::new(2, vec![1]);
                cache.access(1, |k| *k).unwrap();
                assert_eq!(
                    cache.access(1, |k| *k),
                    Err(HorizonError::Exhausted { horizon: 1 })
                );
                assert_eq!(cache.cursor(), 1);
                assert_eq!(cache.len(), 1);
            }

            #[test]
            fn test_empty_future_rejects_first_access() {
                let mut cache: OptimalCache<u32, u32> = OptimalCache::new(2, Vec::new());
                assert!(matches!(
                    cache.access(1, |k| *k),
                    Err(HorizonError::Exhausted { horizon: 0 })
                ));
            }

            #[test]
            fn test_diverging_request_rejected_without_side_effects() {
                let mut cache = OptimalCache::new(1, vec![1, 2]);
                cache.access(1, |k| *k).unwrap();
                let mut loaded = false;
                let err = cache
                    .access(3, |k| {
                        loaded = true;
                        *k
                    })
                    .unwrap_err();
                assert!(matches!(err, HorizonError::Diverged { position: 1, .. }));
                assert!(!loaded);
                assert_eq!(cache.cursor(), 1);
                assert!(cache.contains(&1));
                cache.check_invariants().unwrap();

                assert_eq!(cache.access(2, |k| *k), Ok(false));
            }

            #[test]
            fn test_failed_load_can_be_retried() {
                let mut cache = OptimalCache::new(1, vec![1, 2]);
                cache.access(1, |k| *k).unwrap();

                let err = cache.try_access(2, |_| Err("unreachable disk")).unwrap_err();
                assert_eq!(err, AccessError::Load("unreachable disk"));
                assert_eq!(cache.cursor(), 1);
                assert!(cache.contains(&1));

                assert_eq!(cache.try_access(2, |k| Ok::<_, &str>(*k)), Ok(false));
                assert!(!cache.contains(&1));
            }
        }

        mod edge_cases {
            use super::*;

            #[test]
            fn test_zero_capacity_rejected() {
                let err = OptimalCache::<u32, u32>::try_new(0, vec![1]).unwrap_err();
                assert!(err.message().contains("capacity"));
            }

            #[test]
            #[should_panic(expected = "capacity")]
            fn test_zero_capacity_new_panics() {
                let _ = OptimalCache::<u32, u32>::new(0, vec![1]);
            }

            #[test]
            fn test_next_request_for_absent_key() {
                let mut cache = OptimalCache::new(1, vec![1, 2, 2, 1]);
                assert_eq!(cache.next_use(&2), NextUse::At(1));
                cache.access(1, |k| *k).unwrap();
                assert_eq!(cache.next_use(&1), NextUse::At(3));
                assert_eq!(cache.next_use(&9), NextUse::Never);
            }

            #[test]
            fn test_clear_rewinds_for_replay() {
                let seq = vec![1, 2, 3, 1, 2, 4];
                let mut cache = OptimalCache::new(2, seq.clone());
                let first: Vec<_> = seq.iter().map(|&k| cache.access(k, |k| *k)).collect();
                assert!(cache.is_exhausted());

                cache.clear();
                assert!(cache.is_empty());
                assert_eq!(cache.cursor(), 0);
                assert_eq!(cache.remaining(), 6);
                cache.check_invariants().unwrap();

                let second: Vec<_> = seq.iter().map(|&k| cache.access(k, |k| *k)).collect();
                assert_eq!(first, second);
            }

            #[test]
            fn test_debug_output_is_summary() {
                let cache: OptimalCache<u32, u32> =
                    OptimalCache::with_lookahead(2, vec![1], Lookahead::Scan);
                let dbg = format!("{cache:?}");
                assert!(dbg.contains("OptimalCache"));
                assert!(dbg.contains("Scan"));
            }
        }
    }

    mod consistency {
        use super::*;

        fn filled() -> OptimalCache<u32, u32> {
            let mut cache = OptimalCache::new(2, vec![1, 2, 1, 2]);
            cache.access(1, |k| *k).unwrap();
            cache.access(2, |k| *k).unwrap();
            cache.check_invariants().unwrap();
            cache
        }

        #[test]
        fn test_missing_index_entry_detected() {
            let mut cache = filled();
            cache.index.remove(&1);
            let err = cache.check_invariants().unwrap_err();
            assert!(err.message().contains("index has 1 keys"));
        }

        #[test]
        fn test_stale_handle_detected() {
            let mut cache = filled();
            cache.index.insert(1, SlotId(99));
            let err = cache.check_invariants().unwrap_err();
            assert!(err.message().contains("not indexed under that handle"));
        }

        #[test]
        fn test_wrong_last_request_detected() {
            let mut cache = filled();
            let id = cache.index[&1];
            if let Some(resident) = cache.residents.get_mut(id) {
                // position 1 holds key 2
                resident.last_request = 1;
            }
            let err = cache.check_invariants().unwrap_err();
            assert!(err.message().contains("contradicts"));
        }

        #[test]
        fn test_outdated_last_request_detected() {
            let mut cache = filled();
            cache.access(1, |k| *k).unwrap();
            let id = cache.index[&1];
            if let Some(resident) = cache.residents.get_mut(id) {
                // 1 was requested again at position 2
                resident.last_request = 0;
            }
            let err = cache.check_invariants().unwrap_err();
            assert!(err.message().contains("after its recorded last request"));
        }
    }

    #[cfg(feature = "metrics")]
    mod metrics {
        use super::*;

        #[test]
        fn test_snapshot_tracks_victims_and_rejections() {
            let seq = vec![1, 2, 3, 1, 2, 4];
            let mut cache = OptimalCache::new(2, seq.clone());
            for key in seq {
                cache.access(key, |k| *k).unwrap();
            }
            let _ = cache.access(1, |k| *k);

            let snap = cache.snapshot();
            assert_eq!(snap.hits, 1);
            assert_eq!(snap.misses, 5);
            assert_eq!(snap.loads, 5);
            assert_eq!(snap.evictions, 3);
            assert_eq!(snap.never_reused_victims, 2);
            assert_eq!(snap.horizon_rejections, 1);
            assert_eq!(snap.cursor, 6);
            assert!(snap.victim_scan_steps >= 3);
        }

        #[test]
        fn test_clear_is_counted() {
            let mut cache = OptimalCache::new(1, vec![5, 5]);
            cache.access(5, |k| *k).unwrap();
            cache.clear();
            let snap = cache.snapshot();
            assert_eq!(snap.clears, 1);
            assert_eq!(snap.cursor, 0);
            assert_eq!(snap.cache_len, 0);
        }
    }
}

#[cfg(test)]
mod property_tests {
    use proptest::prelude::*;

    use super::*;

    fn trace(capacity: usize, requests: &[u8], lookahead: Lookahead) -> Vec<bool> {
        let mut cache = OptimalCache::with_lookahead(capacity, requests.to_vec(), lookahead);
        requests
            .iter()
            .map(|&k| cache.access(k, |k| *k).unwrap())
            .collect()
    }

    /// Maximum hits over every possible eviction choice.
    fn exhaustive_best(capacity: usize, requests: &[u8], resident: &mut Vec<u8>) -> usize {
        let Some((&key, rest)) = requests.split_first() else {
            return 0;
        };
        if resident.contains(&key) {
            return 1 + exhaustive_best(capacity, rest, resident);
        }
        if resident.len() < capacity {
            resident.push(key);
            let best = exhaustive_best(capacity, rest, resident);
            resident.pop();
            return best;
        }
        let mut best = 0;
        for slot in 0..resident.len() {
            let evicted = std::mem::replace(&mut resident[slot], key);
            best = best.max(exhaustive_best(capacity, rest, resident));
            resident[slot] = evicted;
        }
        best
    }

    proptest! {
        /// Scan and indexed lookahead produce the same hit/miss trace and
        /// the same residents after every request.
        #[cfg_attr(miri, ignore)]
        #[test]
        fn prop_scan_and_indexed_agree(
            capacity in 1usize..8,
            requests in prop::collection::vec(0u8..16, 0..200)
        ) {
            let mut scan = OptimalCache::with_lookahead(capacity, requests.clone(), Lookahead::Scan);
            let mut indexed = OptimalCache::with_lookahead(capacity, requests.clone(), Lookahead::Indexed);
            for &key in &requests {
                prop_assert_eq!(scan.victim(), indexed.victim());
                let a = scan.access(key, |k| *k).unwrap();
                let b = indexed.access(key, |k| *k).unwrap();
                prop_assert_eq!(a, b);
                let left: Vec<_> = scan.resident_keys().collect();
                let right: Vec<_> = indexed.resident_keys().collect();
                prop_assert_eq!(left, right);
            }
        }

        /// Residency bound and index consistency after every access.
        #[cfg_attr(miri, ignore)]
        #[test]
        fn prop_residency_bounded(
            capacity in 1usize..12,
            requests in prop::collection::vec(0u8..24, 0..150)
        ) {
            let mut cache = OptimalCache::new(capacity, requests.clone());
            for &key in &requests {
                cache.access(key, |k| *k).unwrap();
                prop_assert!(cache.len() <= cache.capacity());
                prop_assert!(cache.check_invariants().is_ok());
            }
            prop_assert!(cache.is_exhausted());
        }

        /// No eviction schedule gets more hits.
        #[cfg_attr(miri, ignore)]
        #[test]
        fn prop_matches_exhaustive_optimum(
            capacity in 1usize..4,
            requests in prop::collection::vec(0u8..5, 0..11)
        ) {
            let hits = trace(capacity, &requests, Lookahead::Indexed)
                .into_iter()
                .filter(|&hit| hit)
                .count();
            prop_assert_eq!(hits, exhaustive_best(capacity, &requests, &mut Vec::new()));
        }
    }
}
