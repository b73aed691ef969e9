//! Error types for the pagesim library.
//!
//! ## Key Components
//!
//! - [`ConfigError`]: invalid construction parameters (e.g. zero capacity).
//! - [`HorizonError`]: an [`OptimalCache`](crate::policy::optimal::OptimalCache)
//!   access that falls outside, or disagrees with, its declared future.
//! - [`AccessError`]: horizon violation or loader failure from a fallible
//!   `try_access`.
//! - [`InvariantError`]: returned by `check_invariants` when the key index and
//!   residency list disagree. Always a defect.
//!
//! ## Example Usage
//!
//! ```
//! use pagesim::error::ConfigError;
//! use pagesim::policy::lru::LruCache;
//!
//! let cache: Result<LruCache<u64, u64>, ConfigError> = LruCache::try_new(0);
//! assert!(cache.is_err());
//! ```

use std::fmt;

// ---------------------------------------------------------------------------
// InvariantError
// ---------------------------------------------------------------------------

/// Error returned when internal cache invariants are violated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantError(String);

impl InvariantError {
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for InvariantError {}

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Error returned when cache configuration parameters are invalid.
///
/// # Example
///
/// ```
/// use pagesim::policy::optimal::OptimalCache;
///
/// let err = OptimalCache::<u64, u64>::try_new(0, vec![1, 2]).unwrap_err();
/// assert!(err.to_string().contains("capacity"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(String);

impl ConfigError {
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// HorizonError
// ---------------------------------------------------------------------------

/// An oracle access the cache cannot serve with full lookahead.
///
/// Rejected accesses leave the cache untouched: nothing is loaded, nothing is
/// evicted and the cursor does not move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HorizonError {
    /// More accesses than the declared sequence length.
    Exhausted { horizon: usize },
    /// The requested key is not the one declared at this position.
    Diverged {
        position: usize,
        expected: String,
        requested: String,
    },
}

impl HorizonError {
    pub(crate) fn diverged<K: fmt::Debug>(position: usize, expected: &K, requested: &K) -> Self {
        HorizonError::Diverged {
            position,
            expected: format!("{expected:?}"),
            requested: format!("{requested:?}"),
        }
    }
}

impl fmt::Display for HorizonError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HorizonError::Exhausted { horizon } => write!(
                f,
                "access past the end of the declared request sequence ({horizon} requests)"
            ),
            HorizonError::Diverged {
                position,
                expected,
                requested,
            } => write!(
                f,
                "request {position} is {requested} but the declared sequence has {expected}"
            ),
        }
    }
}

impl std::error::Error for HorizonError {}

// ---------------------------------------------------------------------------
// AccessError
// ---------------------------------------------------------------------------

/// Failure of a fallible oracle access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessError<E> {
    Horizon(HorizonError),
    /// The loader failed; the miss was not filled.
    Load(E),
}

impl<E> From<HorizonError> for AccessError<E> {
    fn from(err: HorizonError) -> Self {
        AccessError::Horizon(err)
    }
}

impl<E: fmt::Display> fmt::Display for AccessError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessError::Horizon(err) => fmt::Display::fmt(err, f),
            AccessError::Load(err) => write!(f, "page load failed: {err}"),
        }
    }
}

impl<E> std::error::Error for AccessError<E>
where
    E: std::error::Error + 'static,
{
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AccessError::Horizon(err) => Some(err),
            AccessError::Load(err) => Some(err),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
