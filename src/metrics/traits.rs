//! # Metrics Trait Hierarchy
//!
//! ```text
//!                 ┌─────────────────────────────┐
//!                 │     CoreMetricsRecorder     │
//!                 │  access/hit/miss/load/evict │
//!                 └──────────────┬──────────────┘
//!                                │
//!              ┌─────────────────┴─────────────────┐
//!              ▼                                   ▼
//!       ┌─────────────┐                  ┌──────────────────┐
//!       │     Lru     │                  │      Oracle      │
//!       │  Recorder   │                  │     Recorder     │
//!       │ (promotion) │                  │ (victim scans,   │
//!       └─────────────┘                  │  horizon errors) │
//!                                        └──────────────────┘
//! ```
//!
//! Recorders only write counters; snapshot providers only read them.

/// Counters every eviction engine maintains.
pub trait CoreMetricsRecorder {
    fn record_access(&mut self);
    fn record_hit(&mut self);
    fn record_miss(&mut self);
    fn record_load(&mut self);
    fn record_load_failure(&mut self);
    fn record_eviction(&mut self);
    fn record_clear(&mut self);
}

/// Recency-specific signals.
pub trait LruMetricsRecorder: CoreMetricsRecorder {
    /// A hit moved a non-head entry to the MRU position.
    fn record_promotion(&mut self);
}

/// Lookahead-specific signals.
pub trait OracleMetricsRecorder: CoreMetricsRecorder {
    /// One resident entry examined while choosing a victim.
    fn record_victim_scan_step(&mut self);
    /// The chosen victim is never requested again.
    fn record_never_reused_victim(&mut self);
    fn record_horizon_rejection(&mut self);
}

/// Point-in-time copy of an engine's counters.
pub trait MetricsSnapshotProvider<S> {
    fn snapshot(&self) -> S;
}
