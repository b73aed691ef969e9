//! Next-occurrence index over a fixed request sequence.
//!
//! For every position `i` of the sequence, [`NextUseTable`] records the
//! smallest `j > i` with `seq[j] == seq[i]`, or [`NextUse::Never`]. The table
//! is built with one backwards pass and a last-seen map, so construction is
//! O(n) and every lookup is O(1).
//!
//! ```text
//!   position:  0  1  2  3  4  5
//!   sequence:  1  2  3  1  2  4
//!   next_use:  3  4  ∞  ∞  ∞  ∞
//! ```
//!
//! A resident key's distance at cursor `c` equals `next_use[p]`, where `p` is
//! the position of its most recent request (`p <= c`): no occurrence of the key
//! lies strictly between `p` and `c`, so the first one after `p` is also the
//! first one after `c`.

use std::hash::Hash;

use rustc_hash::FxHashMap;

/// Position of a key's next request, or `Never` if it is not requested again.
///
/// Ordered so that `Never` is greater than every `At(_)`, and `At` compares by
/// position: a larger value means the reuse is farther in the future.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NextUse {
    At(usize),
    Never,
}

impl NextUse {
    pub fn is_never(self) -> bool {
        matches!(self, NextUse::Never)
    }

    /// Position of the next request, if any.
    pub fn position(self) -> Option<usize> {
        match self {
            NextUse::At(pos) => Some(pos),
            NextUse::Never => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NextUseTable {
    next: Vec<NextUse>,
}

impl NextUseTable {
    /// Builds the table for `sequence`.
    pub fn build<K>(sequence: &[K]) -> Self
    where
        K: Eq + Hash,
    {
        let mut next = vec![NextUse::Never; sequence.len()];
        let mut last_seen: FxHashMap<&K, usize> = FxHashMap::default();
        for (pos, key) in sequence.iter().enumerate().rev() {
            if let Some(later) = last_seen.insert(key, pos) {
                next[pos] = NextUse::At(later);
            }
        }
        Self { next }
    }

    /// Next request of `sequence[pos]` after `pos`. Out-of-range is `Never`.
    #[inline]
    pub fn after(&self, pos: usize) -> NextUse {
        self.next.get(pos).copied().unwrap_or(NextUse::Never)
    }

    pub fn len(&self) -> usize {
        self.next.len()
    }

    pub fn is_empty(&self) -> bool {
        self.next.is_empty()
    }
}

/// Linear scan for the first request of `key` strictly after `cursor`.
pub fn scan_next_use<K: PartialEq>(sequence: &[K], cursor: usize, key: &K) -> NextUse {
    sequence
        .iter()
        .enumerate()
        .skip(cursor.saturating_add(1))
        .find(|(_, k)| *k == key)
        .map_or(NextUse::Never, |(pos, _)| NextUse::At(pos))
}
