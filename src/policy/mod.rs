//! Eviction engines.
//!
//! - [`lru::LruCache`]: online, evicts the least recently used page.
//! - [`optimal::OptimalCache`]: offline, evicts the page reused farthest in
//!   the future (Belady). Its hit count is the upper bound for any
//!   demand-paging policy on the same sequence.

pub mod lru;
pub mod optimal;
