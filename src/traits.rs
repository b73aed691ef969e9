//! # Page Cache Contract
//!
//! Both engines answer the same question for every request: *was this page
//! already resident?* A miss materializes the page through a caller-supplied
//! loader and may evict another page to make room.
//!
//! ```text
//!   ┌────────────────────────────────────────────────────────────┐
//!   │                    PageCache<K, V>                         │
//!   │                                                            │
//!   │  access(&mut, K, &mut L: PageLoader) → Result<bool, Error> │
//!   │  len(&) → usize                                            │
//!   │  capacity(&) → usize                                       │
//!   │  contains(&, &K) → bool                                    │
//!   │  is_empty(&) → bool                                        │
//!   └───────────────┬───────────────────────────┬────────────────┘
//!                   │                           │
//!                   ▼                           ▼
//!     ┌──────────────────────────┐ ┌──────────────────────────────┐
//!     │ LruCache                 │ │ OptimalCache                 │
//!     │ Error = Infallible       │ │ Error = HorizonError         │
//!     │ evicts least recent      │ │ evicts farthest next use     │
//!     └──────────────────────────┘ └──────────────────────────────┘
//! ```
//!
//! ## Loader
//!
//! [`PageLoader`] is the seam for the page-fetch collaborator. Any
//! `FnMut(&K) -> V` is a loader; [`IdentityLoader`] is the trivial one that
//! hands back a clone of the key. The loader runs exactly once per miss and
//! never on a hit.

/// Materializes the value for a key on a cache miss.
pub trait PageLoader<K, V> {
    fn load(&mut self, key: &K) -> V;
}

impl<K, V, F> PageLoader<K, V> for F
where
    F: FnMut(&K) -> V,
{
    #[inline]
    fn load(&mut self, key: &K) -> V {
        self(key)
    }
}

/// Loader whose page is the key itself.
#[derive(Debug, Default, Clone, Copy)]
pub struct IdentityLoader;

impl<K: Clone> PageLoader<K, K> for IdentityLoader {
    #[inline]
    fn load(&mut self, key: &K) -> K {
        key.clone()
    }
}

/// Loader wrapper that counts how many times the inner loader ran.
#[derive(Debug, Default, Clone)]
pub struct CountingLoader<L> {
    inner: L,
    calls: u64,
}

impl<L> CountingLoader<L> {
    pub fn new(inner: L) -> Self {
        Self { inner, calls: 0 }
    }

    pub fn calls(&self) -> u64 {
        self.calls
    }
}

impl<K, V, L: PageLoader<K, V>> PageLoader<K, V> for CountingLoader<L> {
    fn load(&mut self, key: &K) -> V {
        self.calls += 1;
        self.inner.load(key)
    }
}

/// Shared access contract of the eviction engines.
///
/// # Example
///
/// ```
/// use pagesim::policy::lru::LruCache;
/// use pagesim::traits::{IdentityLoader, PageCache};
///
/// fn count_hits<C: PageCache<u64, u64>>(cache: &mut C, requests: &[u64]) -> Result<usize, C::Error> {
///     let mut hits = 0;
///     for &key in requests {
///         if cache.access(key, &mut IdentityLoader)? {
///             hits += 1;
///         }
///     }
///     Ok(hits)
/// }
///
/// let mut cache = LruCache::new(2);
/// assert_eq!(count_hits(&mut cache, &[1, 2, 1, 2, 1, 2]), Ok(4));
/// ```
pub trait PageCache<K, V> {
    /// Why an access can be refused. [`Infallible`](std::convert::Infallible) for engines that never refuse.
    type Error;

    /// Serves one request; `Ok(true)` on a hit, `Ok(false)` on a miss.
    fn access<L>(&mut self, key: K, loader: &mut L) -> Result<bool, Self::Error>
    where
        L: PageLoader<K, V>;

    /// Number of resident pages.
    fn len(&self) -> usize;

    /// Maximum number of resident pages.
    fn capacity(&self) -> usize;

    fn contains(&self, key: &K) -> bool;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
