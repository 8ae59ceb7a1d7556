//! Rotation-invariant edit distance between loops.
//!
//! A loop has no natural starting point, so the distance between two loops is
//! the smallest unit-cost Levenshtein distance over every pair of rotations.
//! Rotating both sides makes the result symmetric without relying on the
//! canonical start.

use std::collections::HashMap;

use tracing::trace;

use crate::error::AnalysisError;
use crate::loops::set::LoopSet;
use crate::model::LoopId;

/// Minimum Levenshtein distance between any rotation of `a` and any rotation
/// of `b`.
///
/// `cyclic_distance(a, a) == 0`, and the result is unchanged by rotating
/// either argument or swapping them.
#[must_use]
pub fn cyclic_distance<T: PartialEq>(a: &[T], b: &[T]) -> usize {
    let (m, n) = (a.len(), b.len());
    if m == 0 || n == 0 {
        return m.max(n);
    }

    let floor = m.abs_diff(n);
    let mut best = m.max(n);

    for a_start in 0..m {
        for b_start in 0..n {
            if let Some(d) = bounded_levenshtein(a, a_start, b, b_start, best) {
                best = d;
                if best == floor {
                    return best;
                }
            }
        }
    }
    best
}

/// Levenshtein distance between `a` rotated by `a_start` and `b` rotated by
/// `b_start`, or `None` once it is certain not to beat `bound`.
fn bounded_levenshtein<T: PartialEq>(
    a: &[T],
    a_start: usize,
    b: &[T],
    b_start: usize,
    bound: usize,
) -> Option<usize> {
    let (m, n) = (a.len(), b.len());
    let mut prev: Vec<usize> = (0..=n).collect();
    let mut curr = vec![0; n + 1];

    for i in 1..=m {
        let ai = &a[(a_start + i - 1) % m];
        curr[0] = i;
        let mut row_min = curr[0];
        for j in 1..=n {
            let cost = usize::from(*ai != b[(b_start + j - 1) % n]);
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
            row_min = row_min.min(curr[j]);
        }
        // Row minima never decrease, so this pair cannot win.
        if row_min >= bound {
            return None;
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    let d = prev[n];
    (d < bound).then_some(d)
}

/// Memoized loop distances for a single [`LoopSet`].
///
/// The cache is bound to the set it was created from by the set's
/// fingerprint, and refuses lookups against any other set.
#[derive(Debug, Clone)]
pub struct DistanceCache {
    fingerprint: String,
    loop_count: usize,
    entries: HashMap<(LoopId, LoopId), usize>,
    hits: u64,
    misses: u64,
}

impl DistanceCache {
    #[must_use]
    pub fn for_loop_set(loops: &LoopSet) -> Self {
        Self {
            fingerprint: loops.fingerprint().to_string(),
            loop_count: loops.len(),
            entries: HashMap::new(),
            hits: 0,
            misses: 0,
        }
    }

    /// Distance between loops `a` and `b` of `loops`.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::DistanceComputation`] if `loops` is not the
    /// set this cache was created for, or if either id is out of range.
    pub fn distance(&mut self, loops: &LoopSet, a: LoopId, b: LoopId) -> Result<usize, AnalysisError> {
        if loops.fingerprint() != self.fingerprint {
            return Err(AnalysisError::DistanceComputation {
                left: a,
                right: b,
                reason: format!(
                    "cache belongs to loop set {} but was queried with {}",
                    self.fingerprint,
                    loops.fingerprint()
                ),
            });
        }
        if a.index() >= self.loop_count || b.index() >= self.loop_count {
            return Err(AnalysisError::DistanceComputation {
                left: a,
                right: b,
                reason: format!("loop set only has {} loops", self.loop_count),
            });
        }

        let key = if a <= b { (a, b) } else { (b, a) };
        if let Some(&d) = self.entries.get(&key) {
            self.hits += 1;
            return Ok(d);
        }

        let d = match (loops.get(a), loops.get(b)) {
            (Some(left), Some(right)) => cyclic_distance(left.members(), right.members()),
            _ => {
                return Err(AnalysisError::DistanceComputation {
                    left: a,
                    right: b,
                    reason: "loop missing from set".to_string(),
                });
            }
        };
        trace!(left = %a, right = %b, distance = d, "computed loop distance");
        self.misses += 1;
        self.entries.insert(key, d);
        Ok(d)
    }

    /// Number of memoized pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub const fn hits(&self) -> u64 {
        self.hits
    }

    #[must_use]
    pub const fn misses(&self) -> u64 {
        self.misses
    }
}
