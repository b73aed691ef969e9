use crate::metrics::traits::{CoreMetricsRecorder, LruMetricsRecorder, OracleMetricsRecorder};

#[derive(Debug, Default, Clone)]
pub struct LruMetrics {
    pub accesses: u64,
    pub hits: u64,
    pub misses: u64,
    pub loads: u64,
    pub load_failures: u64,
    pub evictions: u64,
    pub promotions: u64,
    pub clears: u64,
}

#[derive(Debug, Default, Clone)]
pub struct OracleMetrics {
    pub accesses: u64,
    pub hits: u64,
    pub misses: u64,
    pub loads: u64,
    pub load_failures: u64,
    pub evictions: u64,
    pub victim_scan_steps: u64,
    pub never_reused_victims: u64,
    pub horizon_rejections: u64,
    pub clears: u64,
}

impl CoreMetricsRecorder for LruMetrics {
    #[inline]
    fn record_access(&mut self) {
        self.accesses += 1;
    }

    #[inline]
    fn record_hit(&mut self) {
        self.hits += 1;
    }

    #[inline]
    fn record_miss(&mut self) {
        self.misses += 1;
    }

    #[inline]
    fn record_load(&mut self) {
        self.loads += 1;
    }

    #[inline]
    fn record_load_failure(&mut self) {
        self.load_failures += 1;
    }

    #[inline]
    fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    #[inline]
    fn record_clear(&mut self) {
        self.clears += 1;
    }
}

impl LruMetricsRecorder for LruMetrics {
    #[inline]
    fn record_promotion(&mut self) {
        self.promotions += 1;
    }
}

impl CoreMetricsRecorder for OracleMetrics {
    #[inline]
    fn record_access(&mut self) {
        self.accesses += 1;
    }

    #[inline]
    fn record_hit(&mut self) {
        self.hits += 1;
    }

    #[inline]
    fn record_miss(&mut self) {
        self.misses += 1;
    }

    #[inline]
    fn record_load(&mut self) {
        self.loads += 1;
    }

    #[inline]
    fn record_load_failure(&mut self) {
        self.load_failures += 1;
    }

    #[inline]
    fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    #[inline]
    fn record_clear(&mut self) {
        self.clears += 1;
    }
}

impl OracleMetricsRecorder for OracleMetrics {
    #[inline]
    fn record_victim_scan_step(&mut self) {
        self.victim_scan_steps += 1;
    }

    #[inline]
    fn record_never_reused_victim(&mut self) {
        self.never_reused_victims += 1;
    }

    #[inline]
    fn record_horizon_rejection(&mut self) {
        self.horizon_rejections += 1;
    }
}
