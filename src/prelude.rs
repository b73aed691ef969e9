pub use crate::ds::{NextUse, NextUseTable};
pub use crate::error::{AccessError, ConfigError, HorizonError, InvariantError};
#[cfg(feature = "metrics")]
pub use crate::metrics::snapshot::{LruMetricsSnapshot, OracleMetricsSnapshot};
#[cfg(feature = "metrics")]
pub use crate::metrics::traits::MetricsSnapshotProvider;
pub use crate::policy::lru::LruCache;
pub use crate::policy::optimal::{Lookahead, OptimalCache};
pub use crate::simulate::{
    EngineReport, SimulationError, SimulationMode, SimulationOptions, SimulationReport, simulate,
};
pub use crate::traits::{CountingLoader, IdentityLoader, PageCache, PageLoader};
pub use crate::workload::{Workload, WorkloadError};
