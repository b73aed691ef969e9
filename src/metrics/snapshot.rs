#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LruMetricsSnapshot {
    pub accesses: u64,
    pub hits: u64,
    pub misses: u64,
    pub loads: u64,
    pub load_failures: u64,
    pub evictions: u64,
    pub promotions: u64,
    pub clears: u64,

    // gauges captured at snapshot time
    pub cache_len: usize,
    pub capacity: usize,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct OracleMetricsSnapshot {
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

    pub cache_len: usize,
    pub capacity: usize,
    pub cursor: usize,
    pub horizon: usize,
}

impl LruMetricsSnapshot {
    pub fn hit_ratio(&self) -> f64 {
        ratio(self.hits, self.accesses)
    }
}

impl OracleMetricsSnapshot {
    pub fn hit_ratio(&self) -> f64 {
        ratio(self.hits, self.accesses)
    }
}

fn ratio(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}
