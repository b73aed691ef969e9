//! Request-stream input.
//!
//! A workload is plain text holding whitespace-separated integers: the cache
//! capacity, the number of requests, then that many page keys. Capacity and
//! count are unsigned; keys may be negative.
//!
//! ```text
//!   2 6
//!   1 2 3 1 2 4
//! ```
//!
//! Anything after the declared keys is ignored.

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

/// Which header field a [`WorkloadError`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Capacity,
    Count,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Capacity => f.write_str("capacity"),
            Field::Count => f.write_str("request count"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkloadError {
    /// Input ended before the header was complete.
    MissingField(Field),
    /// A token is not an integer of the expected kind. `position` counts tokens from 0.
    Malformed {
        position: usize,
        token: String,
        source: ParseIntError,
    },
    /// Fewer keys than the header declared.
    TooFewRequests { declared: usize, found: usize },
}

impl fmt::Display for WorkloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkloadError::MissingField(field) => write!(f, "missing {field}"),
            WorkloadError::Malformed {
                position, token, ..
            } => write!(f, "token {position} ({token:?}) is not a valid integer"),
            WorkloadError::TooFewRequests { declared, found } => {
                write!(f, "declared {declared} requests but found {found}")
            }
        }
    }
}

impl std::error::Error for WorkloadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            WorkloadError::Malformed { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Capacity plus the request sequence to replay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workload {
    pub capacity: usize,
    pub requests: Vec<i64>,
}

impl Workload {
    pub fn new(capacity: usize, requests: Vec<i64>) -> Self {
        Self { capacity, requests }
    }

    /// Parses the `capacity count key...` text format.
    ///
    /// # Example
    ///
    /// ```
    /// use pagesim::workload::Workload;
    ///
    /// let workload = Workload::parse("2 6\n1 2 3 1 2 4\n").unwrap();
    /// assert_eq!(workload.capacity, 2);
    /// assert_eq!(workload.requests, vec![1, 2, 3, 1, 2, 4]);
    /// ```
    pub fn parse(input: &str) -> Result<Self, WorkloadError> {
        let mut tokens = input.split_whitespace().enumerate();

        let capacity: usize = header(&mut tokens, Field::Capacity)?;
        let declared: usize = header(&mut tokens, Field::Count)?;

        // the declared count is untrusted; grow as keys actually arrive
        let mut requests = Vec::with_capacity(declared.min(1 << 16));
        for (position, token) in tokens.by_ref().take(declared) {
            requests.push(number(position, token)?);
        }
        if requests.len() < declared {
            return Err(WorkloadError::TooFewRequests {
                declared,
                found: requests.len(),
            });
        }
        Ok(Self { capacity, requests })
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }
}

impl FromStr for Workload {
    type Err = WorkloadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn header<'a, T>(
    tokens: &mut impl Iterator<Item = (usize, &'a str)>,
    field: Field,
) -> Result<T, WorkloadError>
where
    T: FromStr<Err = ParseIntError>,
{
    let (position, token) = tokens.next().ok_or(WorkloadError::MissingField(field))?;
    number(position, token)
}

fn number<T>(position: usize, token: &str) -> Result<T, WorkloadError>
where
    T: FromStr<Err = ParseIntError>,
{
    token.parse().map_err(|source| WorkloadError::Malformed {
        position,
        token: token.to_owned(),
        source,
    })
}
