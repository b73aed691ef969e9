//! # Policy Comparison Driver
//!
//! Replays one [`Workload`] through an [`LruCache`] and an [`OptimalCache`]
//! of the same capacity and reports per-engine hit counts and time spent.
//!
//! ```text
//!   Workload { capacity, requests }
//!            │
//!            ├──────────────────────────────┐
//!            ▼                              ▼
//!   LruCache::new(capacity)       OptimalCache::with_lookahead(
//!                                     capacity, requests, lookahead)
//!            │                              │
//!            │   access(key, identity)      │
//!            ▼                              ▼
//!     EngineReport "LRU"             EngineReport "ORA"
//!            └──────────────┬───────────────┘
//!                           ▼
//!                   SimulationReport
//! ```
//!
//! [`SimulationMode::Lockstep`] interleaves the engines request by request.
//! [`SimulationMode::Parallel`] runs each engine on its own scoped thread; the
//! only shared state is the borrowed request slice. Hit counts are identical
//! in both modes.

use std::fmt;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::error::{ConfigError, HorizonError};
use crate::policy::lru::LruCache;
use crate::policy::optimal::{Lookahead, OptimalCache};
use crate::traits::{CountingLoader, IdentityLoader, PageCache};
use crate::workload::Workload;

/// Engine names as they appear in reports.
pub const LRU_NAME: &str = "LRU";
pub const OPTIMAL_NAME: &str = "ORA";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SimulationMode {
    /// Both engines see request `i` before either sees request `i + 1`.
    #[default]
    Lockstep,
    /// One scoped thread per engine.
    Parallel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SimulationOptions {
    pub lookahead: Lookahead,
    pub mode: SimulationMode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimulationError {
    Config(ConfigError),
    Horizon(HorizonError),
    /// An engine thread panicked in [`SimulationMode::Parallel`].
    EnginePanicked(&'static str),
}

impl fmt::Display for SimulationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimulationError::Config(err) => write!(f, "invalid workload: {err}"),
            SimulationError::Horizon(err) => write!(f, "oracle refused a request: {err}"),
            SimulationError::EnginePanicked(name) => write!(f, "{name} engine panicked"),
        }
    }
}

impl std::error::Error for SimulationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SimulationError::Config(err) => Some(err),
            SimulationError::Horizon(err) => Some(err),
            SimulationError::EnginePanicked(_) => None,
        }
    }
}

impl From<ConfigError> for SimulationError {
    fn from(err: ConfigError) -> Self {
        SimulationError::Config(err)
    }
}

impl From<HorizonError> for SimulationError {
    fn from(err: HorizonError) -> Self {
        SimulationError::Horizon(err)
    }
}

/// Outcome of one engine over the whole sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineReport {
    pub name: &'static str,
    pub hits: u64,
    pub misses: u64,
    /// Loader invocations; equals `misses`.
    pub loads: u64,
    /// Time spent inside `access` calls.
    pub elapsed: Duration,
}

impl EngineReport {
    fn empty(name: &'static str) -> Self {
        Self {
            name,
            hits: 0,
            misses: 0,
            loads: 0,
            elapsed: Duration::ZERO,
        }
    }

    pub fn total(&self) -> u64 {
        self.hits + self.misses
    }

    pub fn hit_ratio(&self) -> f64 {
        match self.total() {
            0 => 0.0,
            total => self.hits as f64 / total as f64,
        }
    }

    fn record(&mut self, hit: bool) {
        if hit {
            self.hits += 1;
        } else {
            self.misses += 1;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationReport {
    /// Number of requests replayed.
    pub total: usize,
    pub lru: EngineReport,
    pub optimal: EngineReport,
}

impl SimulationReport {
    /// The two summary lines, `LRU hits: h/n` then `ORA hits: h/n`.
    pub fn render(&self) -> String {
        self.to_string()
    }

    /// Per-engine elapsed time, one line each.
    pub fn render_timing(&self) -> String {
        [self.lru, self.optimal]
            .iter()
            .map(|engine| format!("{} time: {:?}", engine.name, engine.elapsed))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl fmt::Display for SimulationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} hits: {}/{}", self.lru.name, self.lru.hits, self.total)?;
        write!(
            f,
            "{} hits: {}/{}",
            self.optimal.name, self.optimal.hits, self.total
        )
    }
}

/// Runs both engines over `workload`.
///
/// # Errors
///
/// [`SimulationError::Config`] for a zero capacity. The remaining variants
/// indicate a defect, since the oracle is always given the exact sequence it
/// is driven with.
///
/// # Example
///
/// ```
/// use pagesim::simulate::{SimulationOptions, simulate};
/// use pagesim::workload::Workload;
///
/// let workload = Workload::new(2, vec![1, 2, 3, 1, 2, 3, 1, 2, 3]);
/// let report = simulate(&workload, &SimulationOptions::default()).unwrap();
/// assert_eq!(report.lru.hits, 0);
/// assert_eq!(report.optimal.hits, 3);
/// assert_eq!(report.render(), "LRU hits: 0/9\nORA hits: 3/9");
/// ```
pub fn simulate(
    workload: &Workload,
    options: &SimulationOptions,
) -> Result<SimulationReport, SimulationError> {
    let requests = workload.requests.as_slice();
    let lru = LruCache::try_new(workload.capacity)?;
    let optimal =
        OptimalCache::try_with_lookahead(workload.capacity, requests.to_vec(), options.lookahead)?;

    info!(
        capacity = workload.capacity,
        requests = requests.len(),
        lookahead = ?options.lookahead,
        mode = ?options.mode,
        "simulation started"
    );

    let (lru, optimal) = match options.mode {
        SimulationMode::Lockstep => lockstep(lru, optimal, requests)?,
        SimulationMode::Parallel => parallel(lru, optimal, requests)?,
    };

    debug_assert_eq!(lru.loads, lru.misses);
    debug_assert_eq!(optimal.loads, optimal.misses);
    info!(
        lru_hits = lru.hits,
        optimal_hits = optimal.hits,
        total = requests.len(),
        "simulation finished"
    );
    Ok(SimulationReport {
        total: requests.len(),
        lru,
        optimal,
    })
}

fn lockstep(
    mut lru: LruCache<i64, i64>,
    mut optimal: OptimalCache<i64, i64>,
    requests: &[i64],
) -> Result<(EngineReport, EngineReport), SimulationError> {
    let mut lru_report = EngineReport::empty(LRU_NAME);
    let mut optimal_report = EngineReport::empty(OPTIMAL_NAME);
    let mut lru_loader = CountingLoader::new(IdentityLoader);
    let mut optimal_loader = CountingLoader::new(IdentityLoader);

    for &key in requests {
        let started = Instant::now();
        let Ok(hit) = PageCache::access(&mut lru, key, &mut lru_loader);
        lru_report.elapsed += started.elapsed();
        lru_report.record(hit);

        let started = Instant::now();
        let hit = PageCache::access(&mut optimal, key, &mut optimal_loader)?;
        optimal_report.elapsed += started.elapsed();
        optimal_report.record(hit);
    }

    lru_report.loads = lru_loader.calls();
    optimal_report.loads = optimal_loader.calls();
    Ok((lru_report, optimal_report))
}

fn parallel(
    lru: LruCache<i64, i64>,
    optimal: OptimalCache<i64, i64>,
    requests: &[i64],
) -> Result<(EngineReport, EngineReport), SimulationError> {
    std::thread::scope(|scope| {
        let lru = scope.spawn(move || run_engine(LRU_NAME, lru, requests));
        let optimal = scope.spawn(move || run_engine(OPTIMAL_NAME, optimal, requests));

        let Ok(lru) = lru
            .join()
            .map_err(|_| SimulationError::EnginePanicked(LRU_NAME))?;
        let optimal = optimal
            .join()
            .map_err(|_| SimulationError::EnginePanicked(OPTIMAL_NAME))??;
        Ok((lru, optimal))
    })
}

/// Drives one engine over the whole sequence.
fn run_engine<C>(name: &'static str, mut cache: C, requests: &[i64]) -> Result<EngineReport, C::Error>
where
    C: PageCache<i64, i64>,
{
    let mut report = EngineReport::empty(name);
    let mut loader = CountingLoader::new(IdentityLoader);
    let started = Instant::now();
    for &key in requests {
        let hit = cache.access(key, &mut loader)?;
        report.record(hit);
    }
    report.elapsed = started.elapsed();
    report.loads = loader.calls();
    debug!(engine = name, hits = report.hits, elapsed = ?report.elapsed, "engine finished");
    Ok(report)
}
