//! Per-engine counters, compiled in with the `metrics` feature.
//!
//! Recording is split from reading the same way the engines split policy from
//! storage: engines write through the recorder traits in [`traits`], tests and
//! the simulator read [`snapshot`] values through
//! [`MetricsSnapshotProvider`](traits::MetricsSnapshotProvider).

pub mod metrics_impl;
pub mod snapshot;
pub mod traits;
