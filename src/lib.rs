//! pagesim: LRU and offline-optimal (Belady) page caches, plus the driver that
//! replays one request sequence through both and compares their hit counts.
//!
//! The engines share the [`traits::PageCache`] contract. Residency is an
//! arena-backed [`ds::IntrusiveList`] indexed by key, so every structural
//! operation is O(1) and handles stay stable across evictions.

pub mod ds;
pub mod error;
pub mod policy;
pub mod simulate;
pub mod traits;
pub mod workload;

#[cfg(feature = "metrics")]
pub mod metrics;

pub mod prelude;
